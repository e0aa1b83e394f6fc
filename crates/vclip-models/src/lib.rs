//! Shared data models for the video clipping pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Pipeline stages and the per-video checkpoint record
//! - Clip plans supplied by the operator
//! - Speech-to-text transcripts
//! - Encoding configuration
//! - Time formatting, slugs and remote locator parsing

pub mod checkpoint;
pub mod clip;
pub mod encoding;
pub mod error;
pub mod timestamp;
pub mod transcript;
pub mod utils;

// Re-export common types
pub use checkpoint::{
    Checkpoint, CutRecord, PublishRecord, SourceRef, Stage, TranscriptRef, VideoRecord,
};
pub use clip::{Clip, ClipPlan};
pub use encoding::EncodingConfig;
pub use error::{ModelError, ModelResult};
pub use timestamp::{format_srt_time, format_time};
pub use transcript::{Transcript, TranscriptStatus, Utterance, Word};
pub use utils::{extract_file_id, slugify, video_stem};
