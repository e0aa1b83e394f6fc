//! The five pipeline stages plus the draft cut.
//!
//! Every stage takes the current checkpoint by value and returns the new
//! one. A stage whose artifacts already exist on disk returns the
//! checkpoint unchanged without calling any collaborator.

pub mod cut;
pub mod draft;
pub mod gate;
pub mod ingest;
pub mod publish;
pub mod transcribe;

use vclip_models::{Checkpoint, Stage, VideoRecord};

use crate::error::{PipelineError, PipelineResult};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub(crate) fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Fail with `StageNotReady` unless the checkpoint has reached `required`.
pub(crate) fn require_stage(
    checkpoint: &Checkpoint,
    stage: &'static str,
    required: Stage,
) -> PipelineResult<()> {
    if checkpoint.stage() < required {
        return Err(PipelineError::not_ready(stage, required, checkpoint.stage()));
    }
    Ok(())
}

pub(crate) fn require_video<'a>(
    checkpoint: &'a Checkpoint,
    stage: &'static str,
) -> PipelineResult<&'a VideoRecord> {
    checkpoint
        .video()
        .ok_or_else(|| PipelineError::not_ready(stage, Stage::Ingested, checkpoint.stage()))
}
