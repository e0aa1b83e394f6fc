//! Pipeline-facing notification helpers.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use vclip_models::Clip;

use crate::format::{clips_summary, escape_html, step_message, truncate_chars, PipelineStep};
use crate::messenger::{Delivery, Messenger};

/// Error details are cut to this many chars before sending.
pub const ERROR_DETAIL_CHARS: usize = 500;

/// Formats pipeline milestones and hands them to a [`Messenger`].
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    pub fn messenger(&self) -> Arc<dyn Messenger> {
        Arc::clone(&self.messenger)
    }

    pub async fn step(&self, step: PipelineStep, video_name: &str, details: &str) -> Delivery {
        debug!(step = %step, video = video_name, "Notify step");
        self.messenger
            .send_text(&step_message(step, video_name, details))
            .await
    }

    /// Report a fatal error with its message truncated.
    pub async fn error(&self, video_name: &str, message: &str) -> Delivery {
        let details = escape_html(truncate_chars(message, ERROR_DETAIL_CHARS));
        self.step(PipelineStep::Error, video_name, &details).await
    }

    pub async fn clips_identified(&self, clips: &[Clip], video_name: &str) -> Delivery {
        self.messenger
            .send_text(&clips_summary(clips, video_name))
            .await
    }

    pub async fn file(&self, path: &Path, caption: &str) -> Delivery {
        self.messenger.send_file(path, Some(caption)).await
    }

    pub async fn media(&self, path: &Path, caption: &str) -> Delivery {
        self.messenger.send_media(path, Some(caption)).await
    }
}
