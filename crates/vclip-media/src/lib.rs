//! FFmpeg CLI wrapper for clip cutting.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - The [`Encoder`] seam over the external encoder, with the
//!   process-backed [`FfmpegRunner`]
//! - Two-stage seeking clip cuts (primary and vertical variants)
//! - Messaging-sized preview copies and audio extraction

pub mod audio;
pub mod clip;
pub mod command;
pub mod encoder;
pub mod error;
pub mod filters;
pub mod preview;
pub mod probe;

pub use audio::extract_audio;
pub use clip::{cut_clip, ClipOutputs, CutOptions, SeekPlan};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use encoder::Encoder;
pub use error::{MediaError, MediaResult};
pub use preview::{make_preview_copy, PREVIEW_MAX_HEIGHT, UNKNOWN_HEIGHT};
pub use probe::{probe_video, VideoInfo};

#[cfg(test)]
mod test_support;
