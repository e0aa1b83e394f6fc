//! Pipeline driver.
//!
//! Walks the checkpoint state machine for one video up to the stage the
//! operator asked for. Every stage is re-entrant: a second run finds its
//! artifacts on disk and moves on without calling collaborators.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use tracing::{info, Instrument};

use vclip_media::ClipOutputs;
use vclip_models::Checkpoint;

use crate::context::PipelineContext;
use crate::error::PipelineResult;
use crate::logging::RunLogger;
use crate::stages::{cut, draft, gate, ingest, publish, transcribe};
use crate::workdir::{WorkDir, CLIP_PLAN_SUFFIX};

/// How far the operator wants this run to go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Intent {
    /// Every stage, pausing at the clip gate when no plan exists.
    #[default]
    Full,
    /// Ingest and transcribe only.
    TranscribeOnly,
    /// Cut the top-ranked clip for review.
    DraftCut,
    /// Cut every clip, do not publish.
    CutAll,
    /// Cut every clip and publish.
    CutAndPublish,
    /// Publish clips that were already cut.
    PublishOnly,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Full => "full",
            Intent::TranscribeOnly => "transcribe_only",
            Intent::DraftCut => "draft_cut",
            Intent::CutAll => "cut_all",
            Intent::CutAndPublish => "cut_and_publish",
            Intent::PublishOnly => "publish_only",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the video comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Share URL or file id in remote storage.
    Remote(String),
    /// File on local disk.
    Local(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(locator) => write!(f, "{locator}"),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Reached the stage the intent asked for.
    Completed,
    /// Stopped at the clip gate; rerun once a plan is in the work dir.
    AwaitingClipPlan,
}

/// Result of one driver run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub work_dir: WorkDir,
    pub checkpoint: Checkpoint,
    /// Files produced by a draft cut.
    pub draft: Option<ClipOutputs>,
}

impl RunOutcome {
    fn completed(work_dir: WorkDir, checkpoint: Checkpoint) -> Self {
        Self {
            status: RunStatus::Completed,
            work_dir,
            checkpoint,
            draft: None,
        }
    }
}

/// Drives one video through the stages.
pub struct Pipeline {
    ctx: PipelineContext,
}

impl Pipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Run every stage `intent` calls for.
    ///
    /// A fatal error is pushed to the messenger (truncated, with the video
    /// name when known) and then returned unchanged.
    pub async fn run(&self, source: &Source, intent: Intent) -> PipelineResult<RunOutcome> {
        let mut logger = RunLogger::new();
        let span = logger.create_span();
        info!(
            run_id = %logger.run_id(),
            source = %source,
            intent = %intent,
            started_at = %logger.started_at().to_rfc3339(),
            "Pipeline run started"
        );

        let result = self
            .run_stages(source, intent, &mut logger)
            .instrument(span)
            .await;

        match &result {
            Ok(outcome) => info!(
                run_id = %logger.run_id(),
                video = %logger.video(),
                stage = %outcome.checkpoint.stage(),
                status = ?outcome.status,
                elapsed_secs = logger.elapsed_secs(),
                "Pipeline run finished"
            ),
            Err(e) => {
                self.ctx.notifier.error(logger.video(), &e.to_string()).await;
            }
        }
        result
    }

    async fn run_stages(
        &self,
        source: &Source,
        intent: Intent,
        logger: &mut RunLogger,
    ) -> PipelineResult<RunOutcome> {
        let ctx = &self.ctx;

        let started = logger.stage_start(ingest::STAGE);
        let ingested = match ingest::run(ctx, source, logger).await {
            Ok(ingested) => {
                logger.stage_completed(ingest::STAGE, started);
                ingested
            }
            Err(e) => {
                logger.stage_failed(ingest::STAGE, &e);
                return Err(e);
            }
        };
        let logger: &RunLogger = logger;
        let work_dir = ingested.work_dir;
        let mut checkpoint = ingested.checkpoint;

        if intent == Intent::PublishOnly {
            checkpoint = stage(
                logger,
                publish::STAGE,
                publish::run(ctx, &work_dir, checkpoint, logger),
            )
            .await?;
            return Ok(RunOutcome::completed(work_dir, checkpoint));
        }

        checkpoint = stage(
            logger,
            transcribe::STAGE,
            transcribe::run(ctx, &work_dir, checkpoint, logger),
        )
        .await?;
        if intent == Intent::TranscribeOnly {
            return Ok(RunOutcome::completed(work_dir, checkpoint));
        }

        let gated = stage(
            logger,
            gate::STAGE,
            gate::run(ctx, &work_dir, checkpoint, logger),
        )
        .await?;
        let (checkpoint, plan) = match gated {
            gate::GateOutcome::Ready { checkpoint, plan } => (checkpoint, plan),
            gate::GateOutcome::Waiting { checkpoint } => {
                info!(
                    "Waiting for a clip plan: add <name>{} to {} and rerun",
                    CLIP_PLAN_SUFFIX,
                    work_dir.path().display()
                );
                return Ok(RunOutcome {
                    status: RunStatus::AwaitingClipPlan,
                    work_dir,
                    checkpoint,
                    draft: None,
                });
            }
        };

        if intent == Intent::DraftCut {
            let draft = stage(
                logger,
                draft::STAGE,
                draft::run(ctx, &work_dir, &checkpoint, &plan, logger),
            )
            .await?;
            return Ok(RunOutcome {
                draft,
                ..RunOutcome::completed(work_dir, checkpoint)
            });
        }

        let mut checkpoint = stage(
            logger,
            cut::STAGE,
            cut::run(ctx, &work_dir, checkpoint, &plan, logger),
        )
        .await?;
        if intent == Intent::CutAll {
            return Ok(RunOutcome::completed(work_dir, checkpoint));
        }

        checkpoint = stage(
            logger,
            publish::STAGE,
            publish::run(ctx, &work_dir, checkpoint, logger),
        )
        .await?;
        Ok(RunOutcome::completed(work_dir, checkpoint))
    }
}

/// Wrap one stage with its banner and completion logging.
async fn stage<T>(
    logger: &RunLogger,
    name: &str,
    work: impl Future<Output = PipelineResult<T>>,
) -> PipelineResult<T> {
    let started = logger.stage_start(name);
    match work.await {
        Ok(value) => {
            logger.stage_completed(name, started);
            Ok(value)
        }
        Err(e) => {
            logger.stage_failed(name, &e);
            Err(e)
        }
    }
}
