//! Draft cut: the top-ranked clip only, sent for review.
//!
//! Leaves the checkpoint untouched; a later full cut reuses the files.

use vclip_media::{cut_clip, make_preview_copy, ClipOutputs};
use vclip_models::{Checkpoint, ClipPlan, Stage};
use vclip_notify::{draft_caption, draft_details, PipelineStep};

use crate::context::PipelineContext;
use crate::error::PipelineResult;
use crate::logging::RunLogger;
use crate::stages::{require_stage, require_video};
use crate::workdir::WorkDir;

pub const STAGE: &str = "draft cut";

/// Returns the produced files, or `None` when the plan is empty or the
/// cut failed (the failure is reported, not raised).
pub async fn run(
    ctx: &PipelineContext,
    work_dir: &WorkDir,
    checkpoint: &Checkpoint,
    plan: &ClipPlan,
    logger: &RunLogger,
) -> PipelineResult<Option<ClipOutputs>> {
    require_stage(checkpoint, STAGE, Stage::ClipsReady)?;
    let video = require_video(checkpoint, STAGE)?;

    let Some(top) = plan.top_ranked() else {
        logger.stage_warning(STAGE, "clip plan is empty");
        return Ok(None);
    };
    logger.stage_progress(
        STAGE,
        &format!("Cutting draft #{} \"{}\" (score {})", top.id, top.title, top.score()),
    );
    ctx.notifier
        .step(PipelineStep::DraftCut, &video.video_name, &draft_details(top))
        .await;

    let clips_dir = work_dir.clips_dir();
    tokio::fs::create_dir_all(&clips_dir).await?;

    let encoder = ctx.encoder.as_ref();
    match cut_clip(encoder, &video.video_path, top, &clips_dir, &ctx.cut_options()).await {
        Ok(outputs) => {
            let preview_dir = work_dir.preview_dir();
            let primary = make_preview_copy(encoder, &outputs.primary, &preview_dir).await;
            ctx.notifier
                .media(&primary, &draft_caption(top, false))
                .await;
            if let Some(vertical) = &outputs.vertical {
                let vertical = make_preview_copy(encoder, vertical, &preview_dir).await;
                ctx.notifier
                    .media(&vertical, &draft_caption(top, true))
                    .await;
            }
            logger.stage_progress(
                STAGE,
                &format!("Draft ready for review: {}", outputs.primary.display()),
            );
            Ok(Some(outputs))
        }
        Err(e) => {
            logger.stage_warning(STAGE, &format!("Draft cut failed: {}", e.summary()));
            ctx.notifier
                .step(
                    PipelineStep::Error,
                    &video.video_name,
                    &format!("Draft cut failed for clip #{}", top.id),
                )
                .await;
            Ok(None)
        }
    }
}
