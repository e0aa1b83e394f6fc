//! Per-clip cutting.
//!
//! Each clip is cut with a two-stage seek: a fast keyframe seek on the input
//! to a point [`PRE_SEEK_SECS`] before the clip, then a frame-accurate seek
//! over the short residual after decoding. This keeps encode time low on
//! long sources without losing timestamp precision.
//!
//! Outputs are written to a `.partial.mp4` sibling and renamed into place
//! only after the encoder succeeds, so an existing target is always a
//! complete file and can be skipped on re-runs.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use vclip_models::{Clip, EncodingConfig};

use crate::command::FfmpegCommand;
use crate::encoder::Encoder;
use crate::error::{MediaError, MediaResult};
use crate::filters::vertical_crop_filter;

/// How far before the clip start the coarse seek lands.
pub const PRE_SEEK_SECS: f64 = 2.0;

/// Suffix of in-progress encoder outputs.
pub const PARTIAL_SUFFIX: &str = ".partial.mp4";

/// Seek offsets for one clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekPlan {
    /// Input-side seek, clamped to zero.
    pub coarse: f64,
    /// Output-side seek from the coarse point to the clip start.
    pub fine: f64,
    pub duration: f64,
}

impl SeekPlan {
    pub fn for_clip(clip: &Clip) -> Self {
        let coarse = (clip.start_time - PRE_SEEK_SECS).max(0.0);
        Self {
            coarse,
            fine: clip.start_time - coarse,
            duration: clip.duration(),
        }
    }

    fn apply(&self, cmd: FfmpegCommand) -> FfmpegCommand {
        cmd.seek(self.coarse)
            .output_seek(self.fine)
            .duration(self.duration)
    }
}

/// Options shared by every clip in a batch.
#[derive(Debug, Clone)]
pub struct CutOptions {
    /// Also produce the 9:16 vertical variant.
    pub vertical: bool,
    pub primary_encoding: EncodingConfig,
    pub vertical_encoding: EncodingConfig,
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            vertical: true,
            primary_encoding: EncodingConfig::for_primary_cut(),
            vertical_encoding: EncodingConfig::for_vertical_cut(),
        }
    }
}

impl CutOptions {
    pub fn without_vertical(mut self) -> Self {
        self.vertical = false;
        self
    }
}

/// Files produced for one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutputs {
    pub primary: PathBuf,
    pub vertical: Option<PathBuf>,
    /// Number of encoder passes actually run (0 when everything existed).
    pub passes_run: usize,
}

/// Where the in-progress output for `target` is written. The extension is
/// kept so the encoder still picks the right container.
pub fn partial_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match target.extension() {
        Some(ext) => target.with_file_name(format!("{stem}.partial.{}", ext.to_string_lossy())),
        None => target.with_file_name(format!("{stem}.partial")),
    }
}

/// Primary-aspect encode of `clip` into `output`.
pub fn primary_command(
    source: &Path,
    clip: &Clip,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    SeekPlan::for_clip(clip)
        .apply(FfmpegCommand::new(source, output))
        .output_args(encoding.to_ffmpeg_args())
        .zero_timestamps()
}

/// Vertical 9:16 encode of `clip` into `output`.
pub fn vertical_command(
    source: &Path,
    clip: &Clip,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    SeekPlan::for_clip(clip)
        .apply(FfmpegCommand::new(source, output))
        .video_filter(vertical_crop_filter(clip.crop_x))
        .output_args(encoding.to_ffmpeg_args())
        .zero_timestamps()
}

/// Cut one clip from `source` into `output_dir`.
///
/// Targets that already exist are not re-encoded. An invalid time range
/// fails without invoking the encoder. A failed pass removes its partial
/// output and returns the error; the caller decides whether that is fatal.
pub async fn cut_clip(
    encoder: &dyn Encoder,
    source: &Path,
    clip: &Clip,
    output_dir: &Path,
    options: &CutOptions,
) -> MediaResult<ClipOutputs> {
    clip.validate()
        .map_err(|e| MediaError::InvalidRange(e.to_string()))?;

    let mut passes_run = 0;

    let primary = output_dir.join(clip.primary_file_name());
    if primary.exists() {
        debug!(clip_id = clip.id, path = %primary.display(), "Primary cut exists, skipping");
    } else {
        let cmd = primary_command(source, clip, &partial_path(&primary), &options.primary_encoding);
        encode_into(encoder, cmd, &primary).await?;
        passes_run += 1;
    }

    let vertical = if options.vertical {
        let vertical = output_dir.join(clip.vertical_file_name());
        if vertical.exists() {
            debug!(clip_id = clip.id, path = %vertical.display(), "Vertical cut exists, skipping");
        } else {
            let cmd = vertical_command(
                source,
                clip,
                &partial_path(&vertical),
                &options.vertical_encoding,
            );
            encode_into(encoder, cmd, &vertical).await?;
            passes_run += 1;
        }
        Some(vertical)
    } else {
        None
    };

    info!(
        clip_id = clip.id,
        start = clip.start_time,
        end = clip.end_time,
        passes_run,
        "Clip cut"
    );

    Ok(ClipOutputs {
        primary,
        vertical,
        passes_run,
    })
}

/// Run `cmd` (which writes a partial file) and move the result to `target`.
pub(crate) async fn encode_into(
    encoder: &dyn Encoder,
    cmd: FfmpegCommand,
    target: &Path,
) -> MediaResult<()> {
    let partial = cmd.output().to_path_buf();
    match encoder.encode(&cmd).await {
        Ok(()) => {
            tokio::fs::rename(&partial, target).await?;
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}
