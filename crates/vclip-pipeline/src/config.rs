//! Pipeline configuration.
//!
//! Read once from the environment at startup and passed into the driver.
//! Nothing below the driver reads environment variables.

use std::path::PathBuf;

use vclip_notify::TelegramConfig;
use vclip_speech::SpeechConfig;
use vclip_storage::DriveConfig;

use crate::driver::{Intent, Source};
use crate::error::{PipelineError, PipelineResult};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent of the per-video work directories
    pub work_root: PathBuf,
    /// Parallel encoder processes during the cut stage
    pub workers: usize,
    /// Produce the 9:16 vertical variant of every clip
    pub vertical: bool,
    /// Per-process encoder timeout
    pub ffmpeg_timeout_secs: Option<u64>,
    pub speech: SpeechConfig,
    pub drive: DriveConfig,
    pub telegram: TelegramConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_root: PathBuf::from(".tmp"),
            workers: 4,
            vertical: true,
            ffmpeg_timeout_secs: None,
            speech: SpeechConfig::default(),
            drive: DriveConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_root: std::env::var("VCLIP_WORK_ROOT")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".tmp")),
            workers: std::env::var("VCLIP_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(4),
            vertical: true,
            ffmpeg_timeout_secs: std::env::var("FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
            speech: SpeechConfig::from_env(),
            drive: DriveConfig::from_env(),
            telegram: TelegramConfig::from_env(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn without_vertical(mut self) -> Self {
        self.vertical = false;
        self
    }

    /// Report missing credentials for a run before any stage work.
    ///
    /// The speech key is always needed. Drive credentials are needed for
    /// remote sources and for intents that always publish; a default run
    /// on a local file only needs them once it reaches the publish stage.
    pub fn validate(&self, intent: Intent, source: &Source) -> PipelineResult<()> {
        let mut missing = Vec::new();

        if !self.speech.is_configured() {
            missing.push("ASSEMBLYAI_API_KEY");
        }
        let needs_drive = matches!(source, Source::Remote(_))
            || matches!(intent, Intent::CutAndPublish | Intent::PublishOnly);
        if needs_drive && !self.drive.is_configured() {
            missing.push("GOOGLE_APPLICATION_CREDENTIALS");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}
