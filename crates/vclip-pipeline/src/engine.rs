//! Parallel clip-cutting engine.
//!
//! Clips run through a bounded pool of `workers` concurrent encodes. Each
//! worker cuts its clip and, when previews are requested, builds the
//! messaging-sized copies. The collector sees results in completion order,
//! numbers successful clips `1..=n` in that order for captions and queues
//! their previews on the relay. A failed clip is recorded and never stops
//! the batch. The returned report is sorted by clip id.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use vclip_media::{cut_clip, make_preview_copy, ClipOutputs, CutOptions, Encoder};
use vclip_models::Clip;
use vclip_notify::{clip_caption, RelayItem, RelaySender, VERTICAL_CAPTION_SUFFIX};

/// Outcome of one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipResult {
    pub clip_id: u32,
    pub outcome: Result<ClipOutputs, String>,
}

/// Per-clip outcomes of a batch, ordered by clip id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub results: Vec<ClipResult>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failed_ids(&self) -> Vec<u32> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_err())
            .map(|r| r.clip_id)
            .collect()
    }
}

/// Where preview copies go and who forwards them.
#[derive(Debug, Clone)]
pub struct PreviewSink {
    pub dir: PathBuf,
    pub relay: RelaySender,
}

pub struct CutEngine {
    encoder: Arc<dyn Encoder>,
    workers: usize,
    options: CutOptions,
}

impl CutEngine {
    pub fn new(encoder: Arc<dyn Encoder>, workers: usize, options: CutOptions) -> Self {
        Self {
            encoder,
            workers: workers.max(1),
            options,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Cut every clip of `clips` from `source` into `output_dir`.
    pub async fn run(
        &self,
        source: &Path,
        clips: &[Clip],
        output_dir: &Path,
        previews: Option<&PreviewSink>,
    ) -> BatchReport {
        let total = clips.len();
        let encoder = self.encoder.as_ref();
        let options = &self.options;
        let preview_dir = previews.map(|p| p.dir.as_path());

        let mut pending = stream::iter(clips.iter().map(move |clip| async move {
            let outcome = cut_clip(encoder, source, clip, output_dir, options).await;
            let copies = match (&outcome, preview_dir) {
                (Ok(outputs), Some(dir)) => preview_copies(encoder, outputs, dir).await,
                _ => Vec::new(),
            };
            (clip, outcome, copies)
        }))
        .buffer_unordered(self.workers);

        let mut completed = 0;
        let mut results = Vec::with_capacity(total);

        while let Some((clip, outcome, copies)) = pending.next().await {
            match outcome {
                Ok(outputs) => {
                    completed += 1;
                    info!(
                        clip_id = clip.id,
                        done = completed,
                        total,
                        passes_run = outputs.passes_run,
                        "Clip finished"
                    );
                    if let Some(sink) = previews {
                        enqueue_previews(sink, copies, &clip_caption(completed, total, clip)).await;
                    }
                    results.push(ClipResult {
                        clip_id: clip.id,
                        outcome: Ok(outputs),
                    });
                }
                Err(e) => {
                    warn!(clip_id = clip.id, error = %e.summary(), "Clip failed");
                    results.push(ClipResult {
                        clip_id: clip.id,
                        outcome: Err(e.summary()),
                    });
                }
            }
        }

        results.sort_by_key(|r| r.clip_id);
        BatchReport { results }
    }
}

/// Messaging copies for a finished clip: primary first, then vertical.
async fn preview_copies(encoder: &dyn Encoder, outputs: &ClipOutputs, dir: &Path) -> Vec<PathBuf> {
    let mut copies = vec![make_preview_copy(encoder, &outputs.primary, dir).await];
    if let Some(vertical) = &outputs.vertical {
        copies.push(make_preview_copy(encoder, vertical, dir).await);
    }
    copies
}

async fn enqueue_previews(sink: &PreviewSink, copies: Vec<PathBuf>, caption: &str) {
    for (i, copy) in copies.into_iter().enumerate() {
        let caption = if i == 0 {
            caption.to_string()
        } else {
            format!("{caption}{VERTICAL_CAPTION_SUFFIX}")
        };
        if !sink.relay.enqueue(RelayItem::media(copy, caption)).await {
            warn!("Notification relay closed, preview dropped");
        }
    }
}
