//! The remote storage seam.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vclip_models::extract_file_id;

use crate::error::{StorageError, StorageResult};

/// Metadata of a remote file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    /// Size in bytes; absent for native documents.
    pub size: Option<u64>,
    /// First parent container.
    pub parent_id: Option<String>,
}

/// Remote file store holding source videos and published clips.
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Turn a share URL or bare id into a file id.
    fn resolve(&self, url_or_id: &str) -> StorageResult<String> {
        extract_file_id(url_or_id).map_err(|e| StorageError::InvalidLocator(e.to_string()))
    }

    async fn metadata(&self, file_id: &str) -> StorageResult<FileMetadata>;

    /// Download the file content to `dest`, returning the byte count.
    async fn download(&self, file_id: &str, dest: &Path) -> StorageResult<u64>;

    /// Find a folder by name under `parent_id`, creating it when missing.
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> StorageResult<String>;

    /// Upload a local file, returning the new file id.
    async fn upload(&self, path: &Path, parent_id: Option<&str>) -> StorageResult<String>;

    /// Make `file_id` readable by anyone with the link.
    async fn set_public_readable(&self, file_id: &str) -> StorageResult<()>;

    /// Cheap authenticated call; returns the account identity.
    async fn health_check(&self) -> StorageResult<String>;
}

/// MIME type for an uploaded file, by extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "srt" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for(Path::new("a/clip.MP4")), "video/mp4");
        assert_eq!(mime_type_for(Path::new("plan_clips.json")), "application/json");
        assert_eq!(mime_type_for(Path::new("talk.srt")), "text/plain");
        assert_eq!(mime_type_for(Path::new("noext")), "application/octet-stream");
    }
}
