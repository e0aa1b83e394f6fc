//! Google Drive storage client.
//!
//! This crate provides:
//! - The [`RemoteStorage`] trait used by the pipeline
//! - A Drive v3 REST client ([`DriveClient`]) with service-account auth
//! - Token caching with refresh margin

pub mod drive;
pub mod error;
pub mod storage;
pub mod token;

pub use drive::{folder_share_url, DriveClient, DriveConfig};
pub use error::{StorageError, StorageResult};
pub use storage::{mime_type_for, FileMetadata, RemoteStorage};
pub use token::{AccessTokenSource, StaticToken, TokenCache, DRIVE_SCOPE};
