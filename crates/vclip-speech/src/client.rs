//! AssemblyAI HTTP client.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use vclip_models::{Transcript, TranscriptStatus};

use crate::error::{SpeechError, SpeechResult};
use crate::types::{
    SpeechToText, TranscribeOptions, TranscriptHandle, TranscriptRequest, UploadResponse,
};

/// Configuration for the AssemblyAI client.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    /// Base URL of the API
    pub base_url: String,
    /// Timeout for each JSON call
    pub timeout: Duration,
    /// Timeout for the audio upload
    pub upload_timeout: Duration,
    /// Delay between status polls
    pub poll_interval: Duration,
    /// Give up waiting for a transcript after this long
    pub max_wait: Duration,
    /// Max retries for transient failures
    pub max_retries: u32,
    /// Speech models requested for each transcript
    pub speech_models: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.assemblyai.com".to_string(),
            timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(3),
            max_wait: Duration::from_secs(3 * 3600),
            max_retries: 2,
            speech_models: TranscribeOptions::default().speech_models,
        }
    }
}

impl SpeechConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("ASSEMBLYAI_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            base_url: std::env::var("ASSEMBLYAI_BASE_URL").unwrap_or(defaults.base_url),
            poll_interval: std::env::var("ASSEMBLYAI_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            speech_models: std::env::var("ASSEMBLYAI_SPEECH_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.split(',').map(|m| m.trim().to_string()).collect())
                .unwrap_or(defaults.speech_models),
            ..defaults
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Transcription options implied by this config.
    pub fn options(&self) -> TranscribeOptions {
        TranscribeOptions {
            speaker_labels: true,
            speech_models: self.speech_models.clone(),
        }
    }
}

/// Client for the AssemblyAI v2 API.
pub struct AssemblyAiClient {
    http: Client,
    config: SpeechConfig,
    api_key: String,
}

impl AssemblyAiClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: SpeechConfig) -> SpeechResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| SpeechError::NotConfigured("ASSEMBLYAI_API_KEY not set".into()))?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("vclip-speech/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SpeechError::Network)?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: Response) -> SpeechResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SpeechError::from_status(status.as_u16(), body))
    }

    async fn upload_audio(&self, audio: &Path) -> SpeechResult<String> {
        let url = self.url("upload");
        let size = tokio::fs::metadata(audio).await?.len();
        debug!(path = %audio.display(), bytes = size, "Uploading audio");

        let response = self
            .with_retry(|| async {
                let file = tokio::fs::File::open(audio).await?;
                let response = self
                    .http
                    .post(&url)
                    .header("authorization", &self.api_key)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .header(reqwest::header::CONTENT_LENGTH, size)
                    .timeout(self.config.upload_timeout)
                    .body(file)
                    .send()
                    .await?;
                Self::check(response).await
            })
            .await?;

        let upload: UploadResponse = response.json().await?;
        Ok(upload.upload_url)
    }

    async fn submit(&self, audio_url: &str, options: &TranscribeOptions) -> SpeechResult<String> {
        let url = self.url("transcript");
        let request = TranscriptRequest {
            audio_url,
            speaker_labels: options.speaker_labels,
            speech_models: &options.speech_models,
        };

        // Each POST creates a new transcript job, so it is sent exactly once.
        let response = self
            .http
            .post(&url)
            .header("authorization", &self.api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let handle: TranscriptHandle = response.json().await?;
        Ok(handle.id)
    }

    async fn fetch(&self, id: &str) -> SpeechResult<Transcript> {
        let url = self.url(&format!("transcript/{id}"));
        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .get(&url)
                    .header("authorization", &self.api_key)
                    .timeout(self.config.timeout)
                    .send()
                    .await?;
                Self::check(response).await
            })
            .await?;

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| SpeechError::InvalidResponse(format!("transcript {id}: {e}")))
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> SpeechResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = SpeechResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Speech request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl SpeechToText for AssemblyAiClient {
    async fn transcribe(&self, audio: &Path, options: &TranscribeOptions) -> SpeechResult<Transcript> {
        let audio_url = self.upload_audio(audio).await?;
        let id = self.submit(&audio_url, options).await?;
        info!(transcript_id = %id, "Transcript submitted");

        let started = Instant::now();
        loop {
            let transcript = self.fetch(&id).await?;
            if transcript.status.is_terminal() {
                if transcript.status == TranscriptStatus::Error {
                    warn!(
                        transcript_id = %id,
                        error = transcript.error.as_deref().unwrap_or("unknown"),
                        "Transcript failed"
                    );
                } else {
                    info!(
                        transcript_id = %id,
                        words = transcript.words.len(),
                        utterances = transcript.utterances.len(),
                        elapsed_secs = started.elapsed().as_secs(),
                        "Transcript completed"
                    );
                }
                return Ok(transcript);
            }

            if started.elapsed() >= self.config.max_wait {
                return Err(SpeechError::Timeout(self.config.max_wait.as_secs()));
            }
            debug!(transcript_id = %id, status = ?transcript.status, "Waiting for transcript");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn health_check(&self) -> SpeechResult<()> {
        let response = self
            .http
            .get(self.url("transcript"))
            .header("authorization", &self.api_key)
            .timeout(self.config.timeout)
            .query(&[("limit", "1")])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
