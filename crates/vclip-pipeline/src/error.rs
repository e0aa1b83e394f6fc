//! Pipeline error types.

use thiserror::Error;

use vclip_models::{ModelError, Stage};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Invalid clip plan: {0}")]
    ClipPlanInvalid(String),

    #[error("Cannot run {stage}: requires stage {required}, checkpoint is at {actual}")]
    StageNotReady {
        stage: &'static str,
        required: Stage,
        actual: Stage,
    },

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Speech error: {0}")]
    Speech(#[from] vclip_speech::SpeechError),

    #[error("Storage error: {0}")]
    Storage(#[from] vclip_storage::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] vclip_media::MediaError),

    #[error("Messaging error: {0}")]
    Notify(#[from] vclip_notify::NotifyError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::Checkpoint(msg.into())
    }

    pub fn clip_plan_invalid(msg: impl Into<String>) -> Self {
        Self::ClipPlanInvalid(msg.into())
    }

    pub fn not_ready(stage: &'static str, required: Stage, actual: Stage) -> Self {
        Self::StageNotReady {
            stage,
            required,
            actual,
        }
    }

    /// Raised before any stage work.
    pub fn is_config(&self) -> bool {
        matches!(self, PipelineError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_message() {
        let err = PipelineError::not_ready("publish", Stage::Cut, Stage::Transcribed);
        assert_eq!(
            err.to_string(),
            "Cannot run publish: requires stage cut, checkpoint is at transcribed"
        );
        assert!(!err.is_config());
        assert!(PipelineError::config("missing key").is_config());
    }
}
