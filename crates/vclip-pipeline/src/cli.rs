use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::config::PipelineConfig;
use crate::driver::{Intent, Source};

#[derive(Debug, Parser)]
#[command(name = "vclip")]
#[command(author, version, about = "Resumable video clipping pipeline")]
#[command(group(
    ArgGroup::new("intent")
        .args(["transcribe_only", "draft", "cut_only", "cut_and_upload", "upload_only"])
        .multiple(false)
))]
pub struct Cli {
    /// Drive share URL or file id of the source video
    #[arg(conflicts_with = "local", required_unless_present_any = ["local", "dry_run"])]
    pub url: Option<String>,

    /// Use a local video file instead of Drive
    #[arg(long, value_name = "PATH")]
    pub local: Option<PathBuf>,

    /// Stop after the transcript is written
    #[arg(long)]
    pub transcribe_only: bool,

    /// Cut only the top-ranked clip for review
    #[arg(long)]
    pub draft: bool,

    /// Cut every clip without uploading
    #[arg(long)]
    pub cut_only: bool,

    /// Cut every clip and upload to Drive
    #[arg(long)]
    pub cut_and_upload: bool,

    /// Upload clips that were already cut
    #[arg(long)]
    pub upload_only: bool,

    /// Skip the vertical 9:16 variant
    #[arg(long)]
    pub no_vertical: bool,

    /// Parallel encoder processes
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Check connectivity to every external service and exit
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn intent(&self) -> Intent {
        if self.transcribe_only {
            Intent::TranscribeOnly
        } else if self.draft {
            Intent::DraftCut
        } else if self.cut_only {
            Intent::CutAll
        } else if self.cut_and_upload {
            Intent::CutAndPublish
        } else if self.upload_only {
            Intent::PublishOnly
        } else {
            Intent::Full
        }
    }

    /// The selected source, `None` only for `--dry-run` without one.
    pub fn source(&self) -> Option<Source> {
        match (&self.local, &self.url) {
            (Some(path), _) => Some(Source::Local(path.clone())),
            (None, Some(url)) => Some(Source::Remote(url.clone())),
            (None, None) => None,
        }
    }

    /// Apply command-line overrides on top of the environment config.
    pub fn apply(&self, config: PipelineConfig) -> PipelineConfig {
        let config = match self.workers {
            Some(workers) => config.with_workers(workers as usize),
            None => config,
        };
        if self.no_vertical {
            config.without_vertical()
        } else {
            config
        }
    }
}
