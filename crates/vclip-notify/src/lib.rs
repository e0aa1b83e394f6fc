//! Messaging side channel.
//!
//! - [`Messenger`]: the messaging collaborator; sends never raise
//! - [`TelegramClient`]: Bot API implementation
//! - [`NotificationRelay`]: single-consumer FIFO that forwards clip
//!   previews without blocking the producers
//! - [`Notifier`]: pipeline step and summary messages

pub mod error;
pub mod format;
pub mod messenger;
pub mod notifier;
pub mod relay;
pub mod telegram;

pub use error::{NotifyError, NotifyResult};
pub use format::{
    clip_caption, clips_summary, draft_caption, draft_details, escape_html, step_message,
    time_range, truncate_chars, PipelineStep, VERTICAL_CAPTION_SUFFIX,
};
pub use messenger::{Delivery, Messenger};
pub use notifier::{Notifier, ERROR_DETAIL_CHARS};
pub use relay::{NotificationRelay, RelayItem, RelayKind, RelayReport, RelaySender};
pub use telegram::{TelegramClient, TelegramConfig};
