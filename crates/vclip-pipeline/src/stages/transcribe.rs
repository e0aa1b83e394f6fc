//! Transcribe: audio extraction, speech-to-text, subtitle and markdown files.

use vclip_media::extract_audio;
use vclip_models::{Checkpoint, TranscriptRef, TranscriptStatus};
use vclip_notify::{escape_html, PipelineStep};

use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::stages::require_video;
use crate::transcript::{render_markdown, render_srt, summary_details};
use crate::workdir::WorkDir;

pub const STAGE: &str = "transcribe";

pub async fn run(
    ctx: &PipelineContext,
    work_dir: &WorkDir,
    checkpoint: Checkpoint,
    logger: &RunLogger,
) -> PipelineResult<Checkpoint> {
    if checkpoint
        .transcript()
        .is_some_and(TranscriptRef::artifacts_exist)
    {
        logger.stage_skipped(STAGE, "transcript artifacts exist");
        return Ok(checkpoint);
    }

    let video = require_video(&checkpoint, STAGE)?.clone();
    let stem = video.stem().to_string();

    let audio = work_dir.join(format!("{stem}.mp3"));
    extract_audio(ctx.encoder.as_ref(), &video.video_path, &audio).await?;

    ctx.notifier
        .step(
            PipelineStep::TranscribeStart,
            &video.video_name,
            "Uploading audio to AssemblyAI...",
        )
        .await;

    let transcript = ctx
        .speech
        .transcribe(&audio, &ctx.config.speech.options())
        .await?;
    if transcript.status != TranscriptStatus::Completed {
        return Err(PipelineError::TranscriptionFailed(
            transcript
                .error
                .unwrap_or_else(|| format!("service returned status {:?}", transcript.status)),
        ));
    }
    logger.stage_progress(
        STAGE,
        &format!(
            "{} words, {} utterances",
            transcript.words.len(),
            transcript.utterances.len()
        ),
    );

    let srt_path = work_dir.join(format!("{stem}.srt"));
    let transcript_path = work_dir.join(format!("{stem}_transcript.md"));
    tokio::fs::write(&srt_path, render_srt(&transcript)).await?;
    tokio::fs::write(&transcript_path, render_markdown(&transcript, &stem)).await?;

    // Keep the transcript next to a remote source; failures only warn.
    if let (Some(parent), Some(storage)) = (video.source.parent_id(), ctx.storage.as_ref()) {
        for path in [&srt_path, &transcript_path] {
            if let Err(e) = storage.upload(path, Some(parent)).await {
                logger.stage_warning(
                    STAGE,
                    &format!("Transcript upload failed for {}: {e}", path.display()),
                );
            }
        }
    }

    let checkpoint = checkpoint.with_transcript(TranscriptRef {
        srt_path: srt_path.clone(),
        transcript_path: transcript_path.clone(),
        word_count: transcript.words.len(),
        utterance_count: transcript.utterances.len(),
    })?;
    work_dir.checkpoints().save(&checkpoint).await?;

    ctx.notifier
        .step(
            PipelineStep::TranscribeDone,
            &video.video_name,
            &format!(
                "{}\n\nAdd a <code>*_clips.json</code> plan to the work directory to continue.",
                summary_details(&transcript)
            ),
        )
        .await;
    let name = escape_html(&video.video_name);
    ctx.notifier.file(&srt_path, &format!("SRT - {name}")).await;
    ctx.notifier
        .file(&transcript_path, &format!("Transcript - {name}"))
        .await;

    Ok(checkpoint)
}
