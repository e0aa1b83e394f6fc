//! Google Drive v3 REST client.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use gcp_auth::CustomServiceAccount;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::storage::{mime_type_for, FileMetadata, RemoteStorage};
use crate::token::{AccessTokenSource, TokenCache};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Shareable browser URL of a Drive folder.
pub fn folder_share_url(folder_id: &str) -> String {
    format!("https://drive.google.com/drive/folders/{folder_id}?usp=sharing")
}

/// Drive client configuration.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Service account JSON file.
    pub credentials_path: Option<PathBuf>,
    /// Base for metadata calls.
    pub api_base: String,
    /// Base for upload sessions.
    pub upload_base: String,
    /// Timeout for metadata calls.
    pub timeout: Duration,
    /// Timeout for a whole download or upload.
    pub transfer_timeout: Duration,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            api_base: "https://www.googleapis.com".to_string(),
            upload_base: "https://www.googleapis.com".to_string(),
            timeout: Duration::from_secs(60),
            transfer_timeout: Duration::from_secs(3600),
        }
    }
}

impl DriveConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            credentials_path: std::env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            api_base: std::env::var("DRIVE_API_BASE").unwrap_or(defaults.api_base),
            upload_base: std::env::var("DRIVE_UPLOAD_BASE").unwrap_or(defaults.upload_base),
            timeout: std::env::var("DRIVE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            transfer_timeout: std::env::var("DRIVE_TRANSFER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.transfer_timeout),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials_path.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct About {
    user: AboutUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutUser {
    #[serde(default)]
    email_address: String,
}

/// Google Drive REST client.
#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    config: DriveConfig,
    tokens: Arc<dyn AccessTokenSource>,
}

impl DriveClient {
    /// Create a client authenticated with the configured service account.
    pub fn new(config: DriveConfig) -> StorageResult<Self> {
        let path = config.credentials_path.as_ref().ok_or_else(|| {
            StorageError::config_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )
        })?;
        let account = CustomServiceAccount::from_file(path).map_err(|e| {
            StorageError::auth_error(format!("Failed to load service account: {e}"))
        })?;
        let tokens = Arc::new(TokenCache::new(Arc::new(account)));
        Self::with_token_source(config, tokens)
    }

    /// Create a client with an explicit token source.
    pub fn with_token_source(
        config: DriveConfig,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> StorageResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("vclip-storage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StorageError::Network)?;

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/drive/v3/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Send an authenticated request, retrying once with a fresh token on 401.
    async fn send_authorized<F>(&self, build: F) -> StorageResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.tokens.access_token().await?;
        let response = build(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Drive rejected token, refreshing");
        self.tokens.invalidate().await;
        let token = self.tokens.access_token().await?;
        Ok(build(&token).send().await?)
    }

    async fn check(response: Response, context: &str) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::from_http_status(
            status.as_u16(),
            format!("{context}: {body}"),
        ))
    }

    async fn find_folder(&self, name: &str, parent_id: Option<&str>) -> StorageResult<Option<String>> {
        let mut query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query(name),
            FOLDER_MIME
        );
        if let Some(parent) = parent_id {
            query.push_str(&format!(" and '{}' in parents", escape_query(parent)));
        }

        let url = self.api_url("files");
        let response = self
            .send_authorized(|token| {
                self.http
                    .get(&url)
                    .bearer_auth(token)
                    .timeout(self.config.timeout)
                    .query(&[
                        ("q", query.as_str()),
                        ("fields", "files(id,name)"),
                        ("supportsAllDrives", "true"),
                        ("includeItemsFromAllDrives", "true"),
                    ])
            })
            .await?;
        let list: FileList = Self::check(response, "folder lookup").await?.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }
}

/// Escape a value for a Drive `q` string literal.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl RemoteStorage for DriveClient {
    async fn metadata(&self, file_id: &str) -> StorageResult<FileMetadata> {
        let url = self.api_url(&format!("files/{file_id}"));
        let response = self
            .send_authorized(|token| {
                self.http
                    .get(&url)
                    .bearer_auth(token)
                    .timeout(self.config.timeout)
                    .query(&[
                        ("fields", "id,name,size,parents"),
                        ("supportsAllDrives", "true"),
                    ])
            })
            .await?;
        let file: DriveFile = Self::check(response, file_id).await?.json().await?;

        Ok(FileMetadata {
            size: file.size.as_deref().and_then(|s| s.parse().ok()),
            parent_id: file.parents.into_iter().next(),
            id: file.id,
            name: file.name,
        })
    }

    async fn download(&self, file_id: &str, dest: &Path) -> StorageResult<u64> {
        let url = self.api_url(&format!("files/{file_id}"));
        let response = self
            .send_authorized(|token| {
                self.http
                    .get(&url)
                    .bearer_auth(token)
                    .timeout(self.config.transfer_timeout)
                    .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            })
            .await?;
        let response = Self::check(response, file_id).await?;

        let partial = dest.with_extension("part");
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(StorageError::download_failed(format!("{file_id}: {e}")));
                }
            };
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial, dest).await?;
        info!(file_id, bytes = written, dest = %dest.display(), "Downloaded file");
        Ok(written)
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> StorageResult<String> {
        if let Some(existing) = self.find_folder(name, parent_id).await? {
            debug!(folder_id = %existing, name, "Reusing existing folder");
            return Ok(existing);
        }

        let mut body = json!({ "name": name, "mimeType": FOLDER_MIME });
        if let Some(parent) = parent_id {
            body["parents"] = json!([parent]);
        }

        let url = self.api_url("files");
        let response = self
            .send_authorized(|token| {
                self.http
                    .post(&url)
                    .bearer_auth(token)
                    .timeout(self.config.timeout)
                    .query(&[("fields", "id"), ("supportsAllDrives", "true")])
                    .json(&body)
            })
            .await?;
        let created: CreatedFile = Self::check(response, "create folder").await?.json().await?;

        info!(folder_id = %created.id, name, "Created folder");
        Ok(created.id)
    }

    async fn upload(&self, path: &Path, parent_id: Option<&str>) -> StorageResult<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| StorageError::upload_failed(format!("not a file: {}", path.display())))?;
        let mime = mime_type_for(path);
        let size = tokio::fs::metadata(path).await?.len();

        let mut body = json!({ "name": name });
        if let Some(parent) = parent_id {
            body["parents"] = json!([parent]);
        }

        // Start a resumable session, then send the content in one request.
        let url = format!(
            "{}/upload/drive/v3/files",
            self.config.upload_base.trim_end_matches('/')
        );
        let response = self
            .send_authorized(|token| {
                self.http
                    .post(&url)
                    .bearer_auth(token)
                    .timeout(self.config.timeout)
                    .query(&[
                        ("uploadType", "resumable"),
                        ("fields", "id"),
                        ("supportsAllDrives", "true"),
                    ])
                    .header("X-Upload-Content-Type", mime)
                    .header("X-Upload-Content-Length", size.to_string())
                    .json(&body)
            })
            .await?;
        let response = Self::check(response, &name).await?;
        let session = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| StorageError::upload_failed(format!("{name}: no upload session")))?;

        let file = tokio::fs::File::open(path).await?;
        let response = self
            .http
            .put(&session)
            .timeout(self.config.transfer_timeout)
            .header(CONTENT_TYPE, mime)
            .header(CONTENT_LENGTH, size)
            .body(file)
            .send()
            .await?;
        let created: CreatedFile = Self::check(response, &name).await?.json().await?;

        info!(file_id = %created.id, name = %name, bytes = size, "Uploaded file");
        Ok(created.id)
    }

    async fn set_public_readable(&self, file_id: &str) -> StorageResult<()> {
        let url = self.api_url(&format!("files/{file_id}/permissions"));
        let body = json!({ "type": "anyone", "role": "reader" });
        let response = self
            .send_authorized(|token| {
                self.http
                    .post(&url)
                    .bearer_auth(token)
                    .timeout(self.config.timeout)
                    .query(&[("supportsAllDrives", "true")])
                    .json(&body)
            })
            .await?;
        Self::check(response, "set permission").await?;
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<String> {
        let url = self.api_url("about");
        let response = self
            .send_authorized(|token| {
                self.http
                    .get(&url)
                    .bearer_auth(token)
                    .timeout(self.config.timeout)
                    .query(&[("fields", "user")])
            })
            .await?;
        let about: About = Self::check(response, "about").await?.json().await?;
        Ok(about.user.email_address)
    }
}
