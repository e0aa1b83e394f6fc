//! Speech client error types.

use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech service not configured: {0}")]
    NotConfigured(String),

    #[error("Speech service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transcription did not finish within {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpeechError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SpeechError::ServiceUnavailable(_) => true,
            SpeechError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || status >= 500 {
            SpeechError::ServiceUnavailable(format!("HTTP {status}: {body}"))
        } else {
            SpeechError::RequestFailed(format!("HTTP {status}: {body}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(SpeechError::from_status(503, String::new()).is_retryable());
        assert!(SpeechError::from_status(429, String::new()).is_retryable());
        assert!(!SpeechError::from_status(401, String::new()).is_retryable());
        assert!(!SpeechError::Timeout(10).is_retryable());
    }
}
