//! Messaging collaborator interface.

use std::path::Path;

use async_trait::async_trait;

/// Outcome of a single send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Messaging is not configured.
    Skipped,
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Delivery::Failed(_))
    }
}

/// Best-effort messaging sink. Implementations report failures as
/// [`Delivery::Failed`] instead of returning errors.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, text: &str) -> Delivery;

    /// Send a file as a generic document.
    async fn send_file(&self, path: &Path, caption: Option<&str>) -> Delivery;

    /// Send a playable video. Oversized media falls back to [`send_file`](Self::send_file).
    async fn send_media(&self, path: &Path, caption: Option<&str>) -> Delivery;

    /// Connectivity check.
    async fn health_check(&self) -> Delivery {
        Delivery::Skipped
    }
}
