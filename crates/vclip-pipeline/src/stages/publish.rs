//! Publish: upload finished cuts and the plan, then share the folder.

use std::path::{Path, PathBuf};

use vclip_models::{Checkpoint, PublishRecord, Stage, VideoRecord};
use vclip_notify::PipelineStep;
use vclip_storage::folder_share_url;

use crate::context::PipelineContext;
use crate::error::PipelineResult;
use crate::logging::RunLogger;
use crate::stages::{require_stage, require_video};
use crate::workdir::WorkDir;

pub const STAGE: &str = "publish";

/// Folder under the source's parent for remote videos.
pub const REMOTE_FOLDER_NAME: &str = "clips";

/// Destination folder name for `video` and the parent it lives under.
pub fn target_folder(video: &VideoRecord) -> (String, Option<&str>) {
    match video.source.parent_id() {
        Some(parent) => (REMOTE_FOLDER_NAME.to_string(), Some(parent)),
        None => (format!("{} – Clips", video.stem()), None),
    }
}

/// Upload every clip (and the plan) not yet in the destination folder.
///
/// A rerun after a later cut batch reuses the recorded folder and only
/// sends the new or previously failed files.
pub async fn run(
    ctx: &PipelineContext,
    work_dir: &WorkDir,
    checkpoint: Checkpoint,
    logger: &RunLogger,
) -> PipelineResult<Checkpoint> {
    require_stage(&checkpoint, STAGE, Stage::Cut)?;
    let previous = checkpoint.publish().cloned();

    let clip_files = work_dir.clip_files().await?;
    let plan = checkpoint
        .clip_plan()
        .filter(|p| p.exists())
        .map(Path::to_path_buf);
    let already_sent = |path: &Path| {
        previous
            .as_ref()
            .is_some_and(|p| p.is_uploaded(&file_name(path)))
    };
    let pending_clips: Vec<PathBuf> = clip_files
        .iter()
        .filter(|path| !already_sent(path.as_path()))
        .cloned()
        .collect();
    let pending_plan = plan.filter(|path| !already_sent(path.as_path()));

    if previous.is_some() && pending_clips.is_empty() && pending_plan.is_none() {
        logger.stage_skipped(STAGE, "already published");
        return Ok(checkpoint);
    }
    if clip_files.is_empty() {
        logger.stage_warning(STAGE, "no clip files to upload");
        return Ok(checkpoint);
    }

    let video = require_video(&checkpoint, STAGE)?.clone();
    let storage = ctx.storage()?;

    let (folder_id, folder_url) = match &previous {
        Some(record) => {
            logger.stage_progress(
                STAGE,
                &format!(
                    "Adding {} files to existing folder ({})",
                    pending_clips.len(),
                    record.folder_id
                ),
            );
            (record.folder_id.clone(), record.folder_url.clone())
        }
        None => {
            let (folder_name, parent) = target_folder(&video);
            let folder_id = storage.create_folder(&folder_name, parent).await?;
            logger.stage_progress(
                STAGE,
                &format!("Uploading to folder '{folder_name}' ({folder_id})"),
            );
            let folder_url = folder_share_url(&folder_id);
            (folder_id, folder_url)
        }
    };

    ctx.notifier
        .step(
            PipelineStep::UploadStart,
            &video.video_name,
            &format!("Uploading {} files to Google Drive...", pending_clips.len()),
        )
        .await;

    let mut uploaded_files = previous
        .as_ref()
        .map(|p| p.uploaded_files.clone())
        .unwrap_or_default();
    let mut uploaded = 0;
    let mut failed = Vec::new();
    for (i, path) in pending_clips.iter().enumerate() {
        let name = file_name(path);
        logger.stage_progress(STAGE, &format!("[{}/{}] {}", i + 1, pending_clips.len(), name));
        match storage.upload(path, Some(&folder_id)).await {
            Ok(_) => {
                uploaded += 1;
                uploaded_files.push(name);
            }
            Err(e) => {
                logger.stage_warning(STAGE, &format!("Upload failed for {name}: {e}"));
                failed.push(name);
            }
        }
    }

    if let Some(plan) = &pending_plan {
        match storage.upload(plan, Some(&folder_id)).await {
            Ok(_) => uploaded_files.push(file_name(plan)),
            Err(e) => {
                logger.stage_warning(STAGE, &format!("Plan upload failed: {e}"));
                failed.push(file_name(plan));
            }
        }
    }

    if previous.is_none() {
        storage.set_public_readable(&folder_id).await?;
    }

    let uploaded_count = clip_files
        .iter()
        .filter(|path| uploaded_files.contains(&file_name(path)))
        .count();
    let checkpoint = checkpoint.with_publish(PublishRecord {
        folder_id,
        folder_url: folder_url.clone(),
        uploaded_count,
        failed_uploads: failed.clone(),
        uploaded_files,
    })?;
    work_dir.checkpoints().save(&checkpoint).await?;

    let mut details = format!("{uploaded} files uploaded");
    if !failed.is_empty() {
        details.push_str(&format!("\nFailed: {}", failed.join(", ")));
    }
    details.push_str(&format!("\n\n<a href=\"{folder_url}\">Open Drive folder</a>"));
    ctx.notifier
        .step(PipelineStep::UploadDone, &video.video_name, &details)
        .await;

    Ok(checkpoint)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use vclip_models::SourceRef;

    use super::*;

    fn video(source: SourceRef) -> VideoRecord {
        VideoRecord {
            source,
            video_name: "demo.mp4".into(),
            video_path: PathBuf::from(".tmp/demo/demo.mp4"),
        }
    }

    #[test]
    fn test_folder_for_local_source() {
        let local = video(SourceRef::Local {
            path: PathBuf::from("/videos/demo.mp4"),
        });
        assert_eq!(target_folder(&local), ("demo – Clips".to_string(), None));
    }

    #[test]
    fn test_folder_for_remote_source() {
        let remote = video(SourceRef::Remote {
            file_id: "f1".into(),
            parent_id: Some("parent9".into()),
        });
        assert_eq!(
            target_folder(&remote),
            ("clips".to_string(), Some("parent9"))
        );

        let orphan = video(SourceRef::Remote {
            file_id: "f1".into(),
            parent_id: None,
        });
        assert_eq!(target_folder(&orphan).0, "demo – Clips");
    }
}
