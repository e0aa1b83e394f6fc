use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::command::FfmpegCommand;
use crate::encoder::Encoder;
use crate::error::{MediaError, MediaResult};

type FailWhen = Box<dyn Fn(&FfmpegCommand) -> bool + Send + Sync>;

/// Writes a placeholder file for every successful encode.
pub struct RecordingEncoder {
    commands: Mutex<Vec<FfmpegCommand>>,
    fail_when: Option<FailWhen>,
    height: Option<u32>,
    write_before_failing: bool,
}

impl Default for RecordingEncoder {
    fn default() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_when: None,
            height: Some(1080),
            write_before_failing: false,
        }
    }
}

impl RecordingEncoder {
    pub fn failing_when(f: impl Fn(&FfmpegCommand) -> bool + Send + Sync + 'static) -> Self {
        Self {
            fail_when: Some(Box::new(f)),
            ..Default::default()
        }
    }

    pub fn with_height(mut self, height: Option<u32>) -> Self {
        self.height = height;
        self
    }

    /// Leave a truncated output behind before reporting the failure.
    pub fn writing_before_failure(mut self) -> Self {
        self.write_before_failing = true;
        self
    }

    pub fn commands(&self) -> Vec<FfmpegCommand> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl Encoder for RecordingEncoder {
    async fn encode(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.commands.lock().unwrap().push(cmd.clone());
        if self.fail_when.as_ref().is_some_and(|f| f(cmd)) {
            if self.write_before_failing {
                std::fs::write(cmd.output(), b"trunc")?;
            }
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with status 1",
                Some("Invalid argument\n".to_string()),
                Some(1),
            ));
        }
        std::fs::write(cmd.output(), b"encoded")?;
        Ok(())
    }

    async fn probe_height(&self, _path: &Path) -> MediaResult<u32> {
        self.height
            .ok_or_else(|| MediaError::InvalidVideo("no video stream".to_string()))
    }
}
