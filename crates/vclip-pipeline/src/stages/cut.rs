//! Cut stage: run the engine over the whole plan.

use vclip_media::CutOptions;
use vclip_models::{Checkpoint, ClipPlan, CutRecord, Stage};
use vclip_notify::{escape_html, NotificationRelay, PipelineStep};

use crate::context::PipelineContext;
use crate::engine::{BatchReport, CutEngine, PreviewSink};
use crate::error::PipelineResult;
use crate::logging::RunLogger;
use crate::stages::{require_stage, require_video};
use crate::workdir::WorkDir;

pub const STAGE: &str = "cut";

/// Relay slots per clip: primary and vertical preview.
const RELAY_SLOTS_PER_CLIP: usize = 2;

pub async fn run(
    ctx: &PipelineContext,
    work_dir: &WorkDir,
    checkpoint: Checkpoint,
    plan: &ClipPlan,
    logger: &RunLogger,
) -> PipelineResult<Checkpoint> {
    require_stage(&checkpoint, STAGE, Stage::ClipsReady)?;
    let video = require_video(&checkpoint, STAGE)?.clone();
    let options = ctx.cut_options();

    if checkpoint.stage() >= Stage::Cut && outputs_complete(work_dir, plan, &options) {
        logger.stage_skipped(STAGE, "all clip outputs exist");
        return Ok(checkpoint);
    }

    let clips_dir = work_dir.clips_dir();
    tokio::fs::create_dir_all(&clips_dir).await?;

    let total = plan.len();
    if let Some(plan_path) = checkpoint.clip_plan() {
        ctx.notifier
            .file(
                plan_path,
                &format!("Clip definitions - {}", escape_html(&video.video_name)),
            )
            .await;
    }
    let mode = if options.vertical {
        "horizontal + vertical"
    } else {
        "horizontal only"
    };
    let engine = CutEngine::new(ctx.encoder.clone(), ctx.config.workers, options);
    ctx.notifier
        .step(
            PipelineStep::CuttingStart,
            &video.video_name,
            &format!(
                "Cutting {total} clips in parallel ({mode}, {} workers)...",
                engine.workers()
            ),
        )
        .await;

    let relay = NotificationRelay::spawn(ctx.notifier.messenger(), total * RELAY_SLOTS_PER_CLIP);
    let sink = PreviewSink {
        dir: work_dir.preview_dir(),
        relay: relay.sender(),
    };
    let report = engine
        .run(&video.video_path, &plan.clips, &clips_dir, Some(&sink))
        .await;
    drop(sink);
    let relay_report = relay.drain().await;

    log_report(logger, &report);
    if !relay_report.failed.is_empty() {
        logger.stage_warning(
            STAGE,
            &format!("{} previews could not be sent", relay_report.failed.len()),
        );
    }

    let failed_ids = report.failed_ids();
    let checkpoint = checkpoint.with_cut(CutRecord {
        cut_count: report.succeeded(),
        failed_ids: failed_ids.clone(),
    })?;
    work_dir.checkpoints().save(&checkpoint).await?;

    let mut details = format!("{}/{} clips cut successfully", report.succeeded(), total);
    if !failed_ids.is_empty() {
        details.push_str(&format!("\nFailed: {failed_ids:?}"));
    }
    ctx.notifier
        .step(PipelineStep::CuttingDone, &video.video_name, &details)
        .await;

    Ok(checkpoint)
}

/// Every clip that can be cut has all of its outputs on disk. Clips with an
/// invalid range never produce outputs and are not expected.
fn outputs_complete(work_dir: &WorkDir, plan: &ClipPlan, options: &CutOptions) -> bool {
    let clips_dir = work_dir.clips_dir();
    plan.clips
        .iter()
        .filter(|clip| clip.validate().is_ok())
        .all(|clip| {
            clips_dir.join(clip.primary_file_name()).exists()
                && (!options.vertical || clips_dir.join(clip.vertical_file_name()).exists())
        })
}

fn log_report(logger: &RunLogger, report: &BatchReport) {
    for result in &report.results {
        match &result.outcome {
            Ok(outputs) => logger.stage_progress(
                STAGE,
                &format!("#{} -> {}", result.clip_id, outputs.primary.display()),
            ),
            Err(reason) => {
                logger.stage_warning(STAGE, &format!("#{} failed: {reason}", result.clip_id))
            }
        }
    }
    logger.stage_progress(
        STAGE,
        &format!(
            "Cut {}/{} clips, failed ids {:?}",
            report.succeeded(),
            report.total(),
            report.failed_ids()
        ),
    );
}
