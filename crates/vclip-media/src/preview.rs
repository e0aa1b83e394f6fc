//! Messaging-sized copies of cut clips.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use vclip_models::EncodingConfig;

use crate::clip::{encode_into, partial_path};
use crate::command::FfmpegCommand;
use crate::encoder::Encoder;
use crate::filters::downscale_filter;

/// Copies taller than this are downscaled.
pub const PREVIEW_MAX_HEIGHT: u32 = 720;

/// Height assumed when probing fails, so the copy is always downscaled.
pub const UNKNOWN_HEIGHT: u32 = 9999;

/// Build the messaging copy of `clip_path` under `preview_dir`.
///
/// Never fails: when the copy cannot be produced the full-resolution path
/// is returned instead. An existing copy is reused; copies are encoded to a
/// partial file first so an interrupted run never leaves a truncated one.
pub async fn make_preview_copy(
    encoder: &dyn Encoder,
    clip_path: &Path,
    preview_dir: &Path,
) -> PathBuf {
    let Some(file_name) = clip_path.file_name() else {
        return clip_path.to_path_buf();
    };
    let out_path = preview_dir.join(file_name);
    if out_path.exists() {
        debug!(path = %out_path.display(), "Preview copy exists");
        return out_path;
    }

    if let Err(e) = tokio::fs::create_dir_all(preview_dir).await {
        warn!(error = %e, "Could not create preview directory, sending original");
        return clip_path.to_path_buf();
    }

    let height = match encoder.probe_height(clip_path).await {
        Ok(h) => h,
        Err(e) => {
            debug!(error = %e, "Probe failed, assuming large source");
            UNKNOWN_HEIGHT
        }
    };

    let mut cmd = FfmpegCommand::new(clip_path, partial_path(&out_path));
    if height > PREVIEW_MAX_HEIGHT {
        cmd = cmd.video_filter(downscale_filter(PREVIEW_MAX_HEIGHT));
    }
    let cmd = cmd.output_args(EncodingConfig::for_preview().to_ffmpeg_args());

    match encode_into(encoder, cmd, &out_path).await {
        Ok(()) => out_path,
        Err(e) => {
            warn!(
                clip = %clip_path.display(),
                error = %e.summary(),
                "Preview copy failed, sending original"
            );
            clip_path.to_path_buf()
        }
    }
}
