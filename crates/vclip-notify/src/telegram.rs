//! Telegram Bot API client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{NotifyError, NotifyResult};
use crate::format::truncate_chars;
use crate::messenger::{Delivery, Messenger};

/// Longest text message sent before truncation.
pub const MAX_MESSAGE_CHARS: usize = 4000;
/// Longest caption accepted for documents and videos.
pub const MAX_CAPTION_CHARS: usize = 1024;
/// Bot API upload limit.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

const TRUNCATION_MARKER: &str = "\n...(truncated)";

/// Telegram configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    /// Bot API base URL
    pub api_base: String,
    pub message_timeout: Duration,
    pub document_timeout: Duration,
    pub video_timeout: Duration,
    pub max_upload_bytes: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            message_timeout: Duration::from_secs(15),
            document_timeout: Duration::from_secs(120),
            video_timeout: Duration::from_secs(300),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl TelegramConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bot_token: non_empty_env("VIDEO_CLIPPER_BOT_TOKEN"),
            chat_id: non_empty_env("VIDEO_CLIPPER_CHAT_ID"),
            api_base: std::env::var("TELEGRAM_API_BASE").unwrap_or(defaults.api_base),
            ..defaults
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API messenger. Every send is skipped when token or chat id is missing.
pub struct TelegramClient {
    http: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("vclip-notify/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if !config.is_configured() {
            info!("Telegram not configured, notifications will be skipped");
        }

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.config.bot_token, &self.config.chat_id) {
            (Some(token), Some(chat)) => Some((token.as_str(), chat.as_str())),
            _ => None,
        }
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            token,
            method
        )
    }

    async fn call(request: RequestBuilder) -> NotifyResult<()> {
        let response = request.send().await?;
        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|_| NotifyError::api(format!("HTTP {status}")))?;

        if body.ok {
            Ok(())
        } else {
            Err(NotifyError::api(
                body.description.unwrap_or_else(|| format!("HTTP {status}")),
            ))
        }
    }

    async fn post_text(&self, token: &str, chat_id: &str, text: &str) -> NotifyResult<()> {
        let text = if text.chars().count() > MAX_MESSAGE_CHARS {
            format!("{}{}", truncate_chars(text, MAX_MESSAGE_CHARS), TRUNCATION_MARKER)
        } else {
            text.to_string()
        };

        let request = self
            .http
            .post(self.method_url(token, "sendMessage"))
            .timeout(self.config.message_timeout)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }));
        Self::call(request).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn post_upload(
        &self,
        token: &str,
        chat_id: &str,
        method: &str,
        field: &'static str,
        path: &Path,
        caption: Option<&str>,
        timeout: Duration,
    ) -> NotifyResult<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part(field, Part::bytes(bytes).file_name(file_name));
        if let Some(caption) = caption {
            form = form
                .text("caption", truncate_chars(caption, MAX_CAPTION_CHARS).to_string())
                .text("parse_mode", "HTML");
        }
        if field == "video" {
            form = form.text("supports_streaming", "true");
        }

        let request = self
            .http
            .post(self.method_url(token, method))
            .timeout(timeout)
            .multipart(form);
        Self::call(request).await
    }

    /// Size in bytes when the file exceeds the upload limit.
    async fn oversized(&self, path: &Path) -> NotifyResult<Option<u64>> {
        let size = tokio::fs::metadata(path).await?.len();
        Ok((size > self.config.max_upload_bytes).then_some(size))
    }

    fn outcome(operation: &str, path: Option<&Path>, result: NotifyResult<()>) -> Delivery {
        match result {
            Ok(()) => {
                debug!(operation, path = ?path, "Telegram send ok");
                Delivery::Sent
            }
            Err(e) => {
                warn!(operation, path = ?path, error = %e, "Telegram send failed");
                Delivery::Failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, text: &str) -> Delivery {
        let Some((token, chat_id)) = self.credentials() else {
            return Delivery::Skipped;
        };
        Self::outcome("sendMessage", None, self.post_text(token, chat_id, text).await)
    }

    async fn send_file(&self, path: &Path, caption: Option<&str>) -> Delivery {
        let Some((token, chat_id)) = self.credentials() else {
            return Delivery::Skipped;
        };

        match self.oversized(path).await {
            Ok(Some(size)) => {
                let size_mb = size as f64 / (1024.0 * 1024.0);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let notice =
                    format!("File too large to send via Telegram ({size_mb:.1} MB): {name}");
                let _ = self.post_text(token, chat_id, &notice).await;
                return Self::outcome(
                    "sendDocument",
                    Some(path),
                    Err(NotifyError::FileTooLarge { size_mb }),
                );
            }
            Ok(None) => {}
            Err(e) => return Self::outcome("sendDocument", Some(path), Err(e)),
        }

        let result = self
            .post_upload(
                token,
                chat_id,
                "sendDocument",
                "document",
                path,
                caption,
                self.config.document_timeout,
            )
            .await;
        Self::outcome("sendDocument", Some(path), result)
    }

    async fn send_media(&self, path: &Path, caption: Option<&str>) -> Delivery {
        let Some((token, chat_id)) = self.credentials() else {
            return Delivery::Skipped;
        };

        match self.oversized(path).await {
            Ok(Some(size)) => {
                debug!(path = %path.display(), bytes = size, "Video over upload limit, sending as document");
                return self.send_file(path, caption).await;
            }
            Ok(None) => {}
            Err(e) => return Self::outcome("sendVideo", Some(path), Err(e)),
        }

        let result = self
            .post_upload(
                token,
                chat_id,
                "sendVideo",
                "video",
                path,
                caption,
                self.config.video_timeout,
            )
            .await;
        Self::outcome("sendVideo", Some(path), result)
    }

    async fn health_check(&self) -> Delivery {
        let Some((token, _)) = self.credentials() else {
            return Delivery::Skipped;
        };
        let request = self
            .http
            .get(self.method_url(token, "getMe"))
            .timeout(self.config.message_timeout);
        Self::outcome("getMe", None, Self::call(request).await)
    }
}
