//! Structured run logging.
//!
//! [`init_tracing`] configures the subscriber for the binary; [`RunLogger`]
//! attaches a run id and the video name to every stage event.

use std::fmt::Display;
use std::time::Instant;

use chrono::{DateTime, Utc};

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset: debug for the workspace crates,
/// info for everything else.
pub const DEFAULT_LOG_FILTER: &str = "info,vclip=debug,vclip_pipeline=debug,vclip_models=debug,\
vclip_media=debug,vclip_storage=debug,vclip_speech=debug,vclip_notify=debug";

/// Install the global subscriber. JSON output when `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger for one driver run.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    video: String,
    started_at: DateTime<Utc>,
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLogger {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            video: "Unknown".to_string(),
            started_at: Utc::now(),
        }
    }

    /// Attach the video name once ingest has resolved it.
    pub fn set_video(&mut self, video: impl Into<String>) {
        self.video = video.into();
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn video(&self) -> &str {
        &self.video
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock seconds since the run started.
    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// Print the stage banner and return the stage start time.
    pub fn stage_start(&self, stage: &str) -> Instant {
        info!(
            run_id = %self.run_id,
            video = %self.video,
            stage,
            "=== Stage: {} ===", stage
        );
        Instant::now()
    }

    pub fn stage_progress(&self, stage: &str, message: &str) {
        info!(run_id = %self.run_id, video = %self.video, stage, "{}", message);
    }

    pub fn stage_skipped(&self, stage: &str, reason: &str) {
        info!(
            run_id = %self.run_id,
            video = %self.video,
            stage,
            reason,
            "Stage skipped"
        );
    }

    pub fn stage_warning(&self, stage: &str, message: &str) {
        warn!(run_id = %self.run_id, video = %self.video, stage, "{}", message);
    }

    pub fn stage_completed(&self, stage: &str, started: Instant) {
        info!(
            run_id = %self.run_id,
            video = %self.video,
            stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stage completed"
        );
    }

    pub fn stage_failed(&self, stage: &str, err: &dyn Display) {
        error!(
            run_id = %self.run_id,
            video = %self.video,
            stage,
            error = %err,
            "Stage failed"
        );
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", run_id = %self.run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_names_workspace_crates() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let rendered = filter.to_string();
        for target in [
            "vclip_pipeline=debug",
            "vclip_media=debug",
            "vclip_speech=debug",
            "vclip_storage=debug",
            "vclip_notify=debug",
        ] {
            assert!(rendered.contains(target), "{target} missing from {rendered}");
        }
    }

    #[test]
    fn test_run_logger() {
        let mut logger = RunLogger::new();
        assert_eq!(logger.video(), "Unknown");
        assert_eq!(logger.run_id().len(), 36);

        logger.set_video("talk.mp4");
        assert_eq!(logger.video(), "talk.mp4");
        assert_ne!(RunLogger::new().run_id(), logger.run_id());
    }
}
