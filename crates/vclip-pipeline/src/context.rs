//! Collaborators shared by every stage.

use std::sync::Arc;

use vclip_media::{CutOptions, Encoder, FfmpegRunner};
use vclip_notify::{Messenger, Notifier, TelegramClient};
use vclip_speech::{AssemblyAiClient, SpeechToText};
use vclip_storage::{DriveClient, RemoteStorage};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Configuration plus the four external collaborators.
///
/// Tests build one with [`PipelineContext::new`] and in-memory fakes.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub encoder: Arc<dyn Encoder>,
    pub speech: Arc<dyn SpeechToText>,
    /// Absent when Drive credentials are not configured.
    pub storage: Option<Arc<dyn RemoteStorage>>,
    pub notifier: Notifier,
}

impl PipelineContext {
    pub fn new(
        config: PipelineConfig,
        encoder: Arc<dyn Encoder>,
        speech: Arc<dyn SpeechToText>,
        storage: Option<Arc<dyn RemoteStorage>>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            encoder,
            speech,
            storage,
            notifier: Notifier::new(messenger),
        }
    }

    /// Build the production collaborators from `config`.
    pub fn from_config(config: PipelineConfig) -> PipelineResult<Self> {
        let mut runner = FfmpegRunner::new();
        if let Some(secs) = config.ffmpeg_timeout_secs {
            runner = runner.with_timeout(secs);
        }

        let speech = AssemblyAiClient::new(config.speech.clone())
            .map_err(|e| PipelineError::config(e.to_string()))?;

        let storage: Option<Arc<dyn RemoteStorage>> = if config.drive.is_configured() {
            Some(Arc::new(DriveClient::new(config.drive.clone())?))
        } else {
            None
        };

        let messenger = TelegramClient::new(config.telegram.clone())?;

        Ok(Self::new(
            config,
            Arc::new(runner),
            Arc::new(speech),
            storage,
            Arc::new(messenger),
        ))
    }

    pub fn storage(&self) -> PipelineResult<&Arc<dyn RemoteStorage>> {
        self.storage
            .as_ref()
            .ok_or_else(|| PipelineError::config("GOOGLE_APPLICATION_CREDENTIALS not set"))
    }

    pub fn cut_options(&self) -> CutOptions {
        let options = CutOptions::default();
        if self.config.vertical {
            options
        } else {
            options.without_vertical()
        }
    }
}
