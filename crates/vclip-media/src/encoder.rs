//! The seam between clip logic and the external encoder process.

use std::path::Path;

use async_trait::async_trait;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_video;

/// External media encoder.
///
/// [`FfmpegRunner`] runs the real binaries; tests substitute fakes that
/// record commands and write placeholder outputs.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run one encode. `Ok` only when the process exited with status zero.
    async fn encode(&self, cmd: &FfmpegCommand) -> MediaResult<()>;

    /// Height in pixels of the first video stream.
    async fn probe_height(&self, path: &Path) -> MediaResult<u32>;
}

#[async_trait]
impl Encoder for FfmpegRunner {
    async fn encode(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run(cmd).await
    }

    async fn probe_height(&self, path: &Path) -> MediaResult<u32> {
        Ok(probe_video(path).await?.height)
    }
}
