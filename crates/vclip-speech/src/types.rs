//! Speech-to-text seam and AssemblyAI wire types.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vclip_models::Transcript;

use crate::error::SpeechResult;

/// Options for one transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeOptions {
    /// Label utterances by speaker.
    pub speaker_labels: bool,
    /// Service model names, in preference order.
    pub speech_models: Vec<String>,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            speaker_labels: true,
            speech_models: vec!["universal-3-pro".to_string()],
        }
    }
}

/// Speech-to-text engine.
///
/// Returns the transcript as reported by the service, including a terminal
/// `error` status; deciding that an error status is fatal is the caller's job.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &Path, options: &TranscribeOptions) -> SpeechResult<Transcript>;

    /// Cheap authenticated call to verify credentials.
    async fn health_check(&self) -> SpeechResult<()>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub upload_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranscriptRequest<'a> {
    pub audio_url: &'a str,
    pub speaker_labels: bool,
    #[serde(skip_serializing_if = "no_models")]
    pub speech_models: &'a [String],
}

fn no_models(models: &&[String]) -> bool {
    models.is_empty()
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptHandle {
    pub id: String,
}
