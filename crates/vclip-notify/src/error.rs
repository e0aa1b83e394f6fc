//! Messaging error types.
//!
//! These never escape a [`crate::Messenger`]; the Telegram client folds them
//! into a [`crate::Delivery`] after logging.

use thiserror::Error;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Messaging not configured")]
    NotConfigured,

    #[error("File too large to send: {size_mb:.1} MB")]
    FileTooLarge { size_mb: f64 },

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }
}
