//! `vclip` command-line entry point.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use vclip_pipeline::{
    init_tracing, selfcheck, Cli, Pipeline, PipelineConfig, PipelineContext, RunStatus,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(PipelineConfig::from_env());

    if cli.dry_run {
        let report = selfcheck::run(&config)
            .await
            .context("failed to build clients for connectivity check")?;
        println!("{report}");
        return Ok(if report.passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let source = cli
        .source()
        .context("a Drive URL or --local PATH is required")?;
    let intent = cli.intent();
    config.validate(intent, &source)?;

    info!(
        intent = %intent,
        workers = config.workers,
        vertical = config.vertical,
        work_root = %config.work_root.display(),
        "Starting vclip"
    );

    let ctx = PipelineContext::from_config(config)?;
    let outcome = match Pipeline::new(ctx).run(&source, intent).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Pipeline failed");
            return Err(e.into());
        }
    };

    match outcome.status {
        RunStatus::Completed => println!(
            "Done: {} is at stage '{}' ({})",
            outcome
                .checkpoint
                .video()
                .map(|v| v.video_name.as_str())
                .unwrap_or("video"),
            outcome.checkpoint.stage(),
            outcome.work_dir.path().display()
        ),
        RunStatus::AwaitingClipPlan => println!(
            "Transcript ready. Add a *_clips.json plan to {} and rerun.",
            outcome.work_dir.path().display()
        ),
    }
    if let Some(draft) = &outcome.draft {
        println!("Draft: {}", draft.primary.display());
        if let Some(vertical) = &draft.vertical {
            println!("Draft (vertical): {}", vertical.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
