//! Checkpoint persistence.
//!
//! One `state.json` per work directory. Saves write a sibling temp file and
//! rename it over the record, so a crash mid-save leaves the previous
//! checkpoint intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use vclip_models::Checkpoint;

use crate::error::{PipelineError, PipelineResult};

pub const CHECKPOINT_FILE: &str = "state.json";

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CHECKPOINT_FILE)
    }

    /// Load the checkpoint. A missing file yields [`Checkpoint::Empty`]; a
    /// corrupt or unrecognised record is an error.
    pub async fn load(&self) -> PipelineResult<Checkpoint> {
        let path = self.path();
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No checkpoint yet");
                return Ok(Checkpoint::Empty);
            }
            Err(e) => return Err(e.into()),
        };

        Checkpoint::from_json(&json)
            .map_err(|e| PipelineError::checkpoint(format!("{}: {e}", path.display())))
    }

    /// Replace the stored checkpoint with `checkpoint`.
    pub async fn save(&self, checkpoint: &Checkpoint) -> PipelineResult<()> {
        let json = checkpoint.to_json()?;
        let dir = self.dir.clone();
        let path = self.path();

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, json.as_bytes()))
            .await
            .map_err(|e| PipelineError::checkpoint(format!("save task failed: {e}")))??;

        debug!(stage = %checkpoint.stage(), "Checkpoint saved");
        Ok(())
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> PipelineResult<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;
    Ok(())
}
