//! Clip gate: wait for an externally supplied clip plan.

use std::path::Path;

use vclip_models::{Checkpoint, ClipPlan, Stage};

use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::stages::{require_stage, require_video};
use crate::workdir::WorkDir;

pub const STAGE: &str = "clip gate";

#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// A plan is on disk and recorded in the checkpoint.
    Ready {
        checkpoint: Checkpoint,
        plan: ClipPlan,
    },
    /// No plan yet; the operator has to supply one.
    Waiting { checkpoint: Checkpoint },
}

pub async fn run(
    ctx: &PipelineContext,
    work_dir: &WorkDir,
    checkpoint: Checkpoint,
    logger: &RunLogger,
) -> PipelineResult<GateOutcome> {
    require_stage(&checkpoint, STAGE, Stage::Transcribed)?;

    let recorded = checkpoint
        .clip_plan()
        .filter(|p| p.exists())
        .map(Path::to_path_buf);
    let path = match recorded {
        Some(path) => path,
        None => match work_dir.find_clip_plan().await? {
            Some(path) => path,
            None => return Ok(GateOutcome::Waiting { checkpoint }),
        },
    };

    let plan = load_clip_plan(&path).await?;

    if checkpoint.stage() >= Stage::ClipsReady && checkpoint.clip_plan() == Some(path.as_path()) {
        logger.stage_skipped(STAGE, "clip plan already recorded");
        return Ok(GateOutcome::Ready { checkpoint, plan });
    }

    let video_name = require_video(&checkpoint, STAGE)?.video_name.clone();
    logger.stage_progress(
        STAGE,
        &format!("Found {} clips in {}", plan.len(), path.display()),
    );

    let checkpoint = checkpoint.with_clip_plan(path)?;
    work_dir.checkpoints().save(&checkpoint).await?;
    ctx.notifier.clips_identified(&plan.clips, &video_name).await;

    Ok(GateOutcome::Ready { checkpoint, plan })
}

/// Read and validate a clip plan file.
pub async fn load_clip_plan(path: &Path) -> PipelineResult<ClipPlan> {
    let json = tokio::fs::read_to_string(path).await?;
    ClipPlan::from_json(&json)
        .map_err(|e| PipelineError::clip_plan_invalid(format!("{}: {e}", path.display())))
}
