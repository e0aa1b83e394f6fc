//! Ingest: materialize the source video inside its work directory.

use std::path::Path;

use tracing::debug;

use vclip_models::{Checkpoint, SourceRef, VideoRecord};
use vclip_notify::PipelineStep;

use crate::context::PipelineContext;
use crate::driver::Source;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::stages::megabytes;
use crate::workdir::WorkDir;

pub const STAGE: &str = "ingest";

/// Work directory and checkpoint after ingest.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub work_dir: WorkDir,
    pub checkpoint: Checkpoint,
}

pub async fn run(
    ctx: &PipelineContext,
    source: &Source,
    logger: &mut RunLogger,
) -> PipelineResult<Ingested> {
    match source {
        Source::Local(path) => ingest_local(ctx, path, logger).await,
        Source::Remote(locator) => ingest_remote(ctx, locator, logger).await,
    }
}

/// The checkpoint already points at a video that is still on disk.
fn already_materialized(checkpoint: &Checkpoint) -> bool {
    checkpoint.video().is_some_and(|v| v.video_path.exists())
}

async fn ingest_local(
    ctx: &PipelineContext,
    path: &Path,
    logger: &mut RunLogger,
) -> PipelineResult<Ingested> {
    let path = match tokio::fs::canonicalize(path).await {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::SourceNotFound(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    let meta = tokio::fs::metadata(&path).await?;
    if !meta.is_file() {
        return Err(PipelineError::SourceNotFound(path.display().to_string()));
    }

    let video_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PipelineError::SourceNotFound(path.display().to_string()))?;
    logger.set_video(&video_name);
    logger.stage_progress(
        STAGE,
        &format!("Local file {} ({:.1} MB)", video_name, megabytes(meta.len())),
    );

    let work_dir = WorkDir::for_video(&ctx.config.work_root, &video_name);
    work_dir.create().await?;
    let store = work_dir.checkpoints();
    let checkpoint = store.load().await?;

    if already_materialized(&checkpoint) {
        logger.stage_skipped(STAGE, "video already in work directory");
        return Ok(Ingested {
            work_dir,
            checkpoint,
        });
    }

    let dest = work_dir.join(&video_name);
    if !dest.exists() {
        // A dangling symlink from an earlier run blocks the new link.
        if tokio::fs::symlink_metadata(&dest).await.is_ok() {
            tokio::fs::remove_file(&dest).await?;
        }
        link_or_copy(&path, &dest).await?;
        debug!(from = %path.display(), to = %dest.display(), "Linked source video");
    }

    ctx.notifier
        .step(
            PipelineStep::DownloadDone,
            &video_name,
            &format!("Local file ({:.1} MB)", megabytes(meta.len())),
        )
        .await;

    let checkpoint = checkpoint.with_video(VideoRecord {
        source: SourceRef::Local { path },
        video_name,
        video_path: dest,
    });
    store.save(&checkpoint).await?;

    Ok(Ingested {
        work_dir,
        checkpoint,
    })
}

async fn ingest_remote(
    ctx: &PipelineContext,
    locator: &str,
    logger: &mut RunLogger,
) -> PipelineResult<Ingested> {
    let storage = ctx.storage()?;
    let file_id = storage.resolve(locator)?;
    let meta = storage.metadata(&file_id).await?;

    let video_name = safe_file_name(&meta.name);
    let size_mb = megabytes(meta.size.unwrap_or(0));
    logger.set_video(&video_name);
    logger.stage_progress(STAGE, &format!("Remote file {video_name} ({size_mb:.1} MB)"));

    let work_dir = WorkDir::for_video(&ctx.config.work_root, &video_name);
    work_dir.create().await?;
    let store = work_dir.checkpoints();
    let checkpoint = store.load().await?;

    if already_materialized(&checkpoint) {
        logger.stage_skipped(STAGE, "video already downloaded");
        return Ok(Ingested {
            work_dir,
            checkpoint,
        });
    }

    let dest = work_dir.join(&video_name);
    let present = tokio::fs::metadata(&dest)
        .await
        .map(|m| m.len() > 0)
        .unwrap_or(false);

    if present {
        logger.stage_skipped(STAGE, "video file present, recording it");
    } else {
        ctx.notifier
            .step(
                PipelineStep::DownloadStart,
                &video_name,
                &format!("Size: {size_mb:.1} MB"),
            )
            .await;
        let bytes = storage.download(&file_id, &dest).await?;
        ctx.notifier
            .step(
                PipelineStep::DownloadDone,
                &video_name,
                &format!("{:.1} MB downloaded", megabytes(bytes)),
            )
            .await;
    }

    let checkpoint = checkpoint.with_video(VideoRecord {
        source: SourceRef::Remote {
            file_id,
            parent_id: meta.parent_id,
        },
        video_name,
        video_path: dest,
    });
    store.save(&checkpoint).await?;

    Ok(Ingested {
        work_dir,
        checkpoint,
    })
}

/// Remote names may contain path separators.
fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if cleaned.trim().is_empty() {
        "video.mp4".to_string()
    } else {
        cleaned
    }
}

async fn link_or_copy(src: &Path, dest: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        match tokio::fs::symlink(src, dest).await {
            Ok(()) => return Ok(()),
            Err(e) => debug!(error = %e, "Symlink failed, copying instead"),
        }
    }
    tokio::fs::copy(src, dest).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("a/b.mp4"), "a_b.mp4");
        assert_eq!(safe_file_name("talk.mp4"), "talk.mp4");
        assert_eq!(safe_file_name("  "), "video.mp4");
    }
}
