//! Speech-to-text transcript types.
//!
//! Timestamps are in milliseconds, as returned by the speech service.

use serde::{Deserialize, Deserializer, Serialize};

/// Processing status reported by the speech service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl TranscriptStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TranscriptStatus::Completed | TranscriptStatus::Error)
    }
}

/// A speaker turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    #[serde(rename = "start")]
    pub start_ms: u64,
    #[serde(rename = "end")]
    pub end_ms: u64,
    #[serde(default)]
    pub speaker: Option<String>,
    pub text: String,
}

impl Utterance {
    pub fn start_secs(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    pub fn end_secs(&self) -> f64 {
        self.end_ms as f64 / 1000.0
    }

    /// Speaker label, `?` when diarization did not assign one.
    pub fn speaker_label(&self) -> &str {
        self.speaker.as_deref().unwrap_or("?")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    #[serde(rename = "start", default)]
    pub start_ms: u64,
    #[serde(rename = "end")]
    pub end_ms: u64,
    #[serde(default)]
    pub text: String,
}

/// Transcript returned by the speech service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub status: TranscriptStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub utterances: Vec<Utterance>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub words: Vec<Word>,
    #[serde(default)]
    pub error: Option<String>,
}

// The service sends `null` lists until a transcript completes.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Transcript {
    /// Duration in seconds, taken from the end of the last word.
    pub fn duration_secs(&self) -> f64 {
        self.words
            .last()
            .map(|w| w.end_ms as f64 / 1000.0)
            .unwrap_or(0.0)
    }

    /// Number of distinct labelled speakers.
    pub fn speaker_count(&self) -> usize {
        let mut speakers: Vec<&str> = self
            .utterances
            .iter()
            .filter_map(|u| u.speaker.as_deref())
            .collect();
        speakers.sort_unstable();
        speakers.dedup();
        speakers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_payload() {
        let json = r#"{
            "id": "t-1",
            "status": "completed",
            "utterances": [
                {"start": 0, "end": 1500, "speaker": "A", "text": "Hello", "confidence": 0.9},
                {"start": 1600, "end": 4000, "speaker": "B", "text": "Hi there"}
            ],
            "words": [{"start": 0, "end": 500, "text": "Hello"}, {"start": 3500, "end": 4000, "text": "there"}]
        }"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.status, TranscriptStatus::Completed);
        assert_eq!(transcript.utterances.len(), 2);
        assert_eq!(transcript.duration_secs(), 4.0);
        assert_eq!(transcript.speaker_count(), 2);
    }

    #[test]
    fn test_missing_speaker_label() {
        let u = Utterance {
            start_ms: 0,
            end_ms: 10,
            speaker: None,
            text: "x".into(),
        };
        assert_eq!(u.speaker_label(), "?");
    }

    #[test]
    fn test_null_lists_become_empty() {
        let json = r#"{"status": "error", "error": "bad audio", "utterances": null}"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.status, TranscriptStatus::Error);
        assert!(transcript.utterances.is_empty());
        assert_eq!(transcript.duration_secs(), 0.0);
    }
}
