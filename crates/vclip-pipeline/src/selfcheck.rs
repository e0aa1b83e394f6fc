//! Connectivity check for `--dry-run`.
//!
//! Exercises every external collaborator without touching pipeline state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vclip_media::{check_ffmpeg, check_ffprobe};
use vclip_notify::{Delivery, Messenger, TelegramClient};
use vclip_speech::{AssemblyAiClient, SpeechToText};
use vclip_storage::{DriveClient, RemoteStorage};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Ok(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    /// A failed required check fails the whole report.
    pub required: bool,
}

impl CheckResult {
    fn new(name: &'static str, required: bool, status: CheckStatus) -> Self {
        Self {
            name,
            status,
            required,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.required && matches!(self.status, CheckStatus::Failed(_))
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, detail) = match &self.status {
            CheckStatus::Ok(d) => ("ok", d),
            CheckStatus::Skipped(d) => ("skipped", d),
            CheckStatus::Failed(d) if self.required => ("FAILED", d),
            CheckStatus::Failed(d) => ("failed (optional)", d),
        };
        write!(f, "{:<10} {tag}: {detail}", self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelfCheckReport {
    pub checks: Vec<CheckResult>,
}

impl SelfCheckReport {
    pub fn passed(&self) -> bool {
        !self.checks.iter().any(CheckResult::is_failure)
    }
}

impl fmt::Display for SelfCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            writeln!(f, "{check}")?;
        }
        let summary = if self.passed() {
            "all required checks passed"
        } else {
            "connectivity check failed"
        };
        f.write_str(summary)
    }
}

/// Build the production clients from `config` and check all of them.
pub async fn run(config: &PipelineConfig) -> PipelineResult<SelfCheckReport> {
    let mut report = SelfCheckReport::default();
    report.checks.push(check_work_root(&config.work_root).await);
    report.checks.push(tool_check("ffmpeg", check_ffmpeg()));
    report.checks.push(tool_check("ffprobe", check_ffprobe()));

    let storage: Option<Arc<dyn RemoteStorage>> = if config.drive.is_configured() {
        Some(Arc::new(DriveClient::new(config.drive.clone())?))
    } else {
        None
    };
    let speech: Option<Arc<dyn SpeechToText>> = match AssemblyAiClient::new(config.speech.clone())
    {
        Ok(client) => Some(Arc::new(client)),
        Err(_) => None,
    };
    let messenger = TelegramClient::new(config.telegram.clone())?;

    report.checks.extend(
        collaborator_checks(storage.as_deref(), speech.as_deref(), &messenger).await,
    );
    Ok(report)
}

/// Checks against the remote collaborators. Missing ones are reported as
/// skipped (storage, messaging) or failed (speech).
pub async fn collaborator_checks(
    storage: Option<&dyn RemoteStorage>,
    speech: Option<&dyn SpeechToText>,
    messenger: &dyn Messenger,
) -> Vec<CheckResult> {
    let drive = match storage {
        None => CheckStatus::Skipped("GOOGLE_APPLICATION_CREDENTIALS not set".into()),
        Some(storage) => match storage.health_check().await {
            Ok(account) => CheckStatus::Ok(format!("authenticated as {account}")),
            Err(e) => CheckStatus::Failed(e.to_string()),
        },
    };

    let assemblyai = match speech {
        None => CheckStatus::Failed("ASSEMBLYAI_API_KEY not set".into()),
        Some(speech) => match speech.health_check().await {
            Ok(()) => CheckStatus::Ok("API key accepted".into()),
            Err(e) => CheckStatus::Failed(e.to_string()),
        },
    };

    let telegram = match messenger.health_check().await {
        Delivery::Sent => CheckStatus::Ok("bot reachable".into()),
        Delivery::Skipped => CheckStatus::Skipped("bot token or chat id not set".into()),
        Delivery::Failed(reason) => CheckStatus::Failed(reason),
    };

    vec![
        CheckResult::new("drive", storage.is_some(), drive),
        CheckResult::new("assemblyai", true, assemblyai),
        CheckResult::new("telegram", false, telegram),
    ]
}

async fn check_work_root(root: &Path) -> CheckResult {
    let status = match tokio::fs::create_dir_all(root).await {
        Ok(()) => CheckStatus::Ok(root.display().to_string()),
        Err(e) => CheckStatus::Failed(format!("{}: {e}", root.display())),
    };
    CheckResult::new("work_root", true, status)
}

fn tool_check<E: fmt::Display>(name: &'static str, found: Result<PathBuf, E>) -> CheckResult {
    let status = match found {
        Ok(path) => CheckStatus::Ok(path.display().to_string()),
        Err(e) => CheckStatus::Failed(e.to_string()),
    };
    CheckResult::new(name, true, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_failures_do_not_fail_report() {
        let report = SelfCheckReport {
            checks: vec![
                CheckResult::new("assemblyai", true, CheckStatus::Ok("ok".into())),
                CheckResult::new("telegram", false, CheckStatus::Failed("401".into())),
                CheckResult::new("drive", false, CheckStatus::Skipped("unset".into())),
            ],
        };
        assert!(report.passed());
        assert!(report.to_string().contains("failed (optional)"));

        let mut failing = report.clone();
        failing
            .checks
            .push(CheckResult::new("ffmpeg", true, CheckStatus::Failed("not found".into())));
        assert!(!failing.passed());
        assert!(failing.to_string().ends_with("connectivity check failed"));
    }

    #[tokio::test]
    async fn test_work_root_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("work").join("root");
        let check = check_work_root(&root).await;
        assert!(matches!(check.status, CheckStatus::Ok(_)));
        assert!(root.is_dir());
    }
}
