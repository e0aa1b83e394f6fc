//! Resumable video clipping pipeline.
//!
//! One run takes a video through ingest, transcription, the clip gate,
//! parallel cutting and publishing. Progress is checkpointed per video in
//! its work directory so an interrupted run resumes where it stopped.

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod context;
pub mod driver;
pub mod engine;
pub mod error;
pub mod logging;
pub mod selfcheck;
pub mod stages;
pub mod transcript;
pub mod workdir;

pub use checkpoint::{CheckpointStore, CHECKPOINT_FILE};
pub use cli::Cli;
pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use driver::{Intent, Pipeline, RunOutcome, RunStatus, Source};
pub use engine::{BatchReport, ClipResult, CutEngine, PreviewSink};
pub use error::{PipelineError, PipelineResult};
pub use logging::{init_tracing, RunLogger};
pub use selfcheck::{CheckResult, CheckStatus, SelfCheckReport};
pub use workdir::WorkDir;
