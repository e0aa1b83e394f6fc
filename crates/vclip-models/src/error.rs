//! Model validation errors.

use thiserror::Error;

use crate::checkpoint::Stage;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid checkpoint record: {0}")]
    InvalidCheckpoint(String),

    #[error("Stage {actual} cannot advance: requires at least {required}")]
    StageOrder { required: Stage, actual: Stage },

    #[error("Invalid clip plan: {0}")]
    InvalidClipPlan(String),

    #[error("Invalid clip {id}: {reason}")]
    InvalidClip { id: u32, reason: String },

    #[error("Could not extract a file id from '{0}'")]
    InvalidLocator(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn invalid_checkpoint(message: impl Into<String>) -> Self {
        Self::InvalidCheckpoint(message.into())
    }

    pub fn invalid_clip(id: u32, reason: impl Into<String>) -> Self {
        Self::InvalidClip {
            id,
            reason: reason.into(),
        }
    }
}
