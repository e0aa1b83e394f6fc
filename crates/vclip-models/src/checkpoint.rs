//! Per-video checkpoint record.
//!
//! A [`Checkpoint`] is a tagged union over [`Stage`]: each stage carries
//! exactly the fields that are known once that stage has completed, so a
//! record can never claim `cut` without also carrying the video, transcript
//! and clip plan that the cut was made from.
//!
//! Records are written as JSON with a `stage` tag:
//!
//! ```json
//! { "stage": "transcribed", "video": { ... }, "transcript": { ... } }
//! ```
//!
//! Parsing goes through [`Checkpoint::from_json`], which rejects unknown or
//! missing fields instead of silently ignoring them.

use std::fmt;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::utils::video_stem;

/// Pipeline stage, ordered from least to most complete.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No checkpoint exists yet.
    None,
    Ingested,
    Transcribed,
    ClipsReady,
    Cut,
    Published,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::None => "none",
            Stage::Ingested => "ingested",
            Stage::Transcribed => "transcribed",
            Stage::ClipsReady => "clips_ready",
            Stage::Cut => "cut",
            Stage::Published => "published",
        }
    }

    /// Top-level record keys allowed for this stage, besides `stage`.
    fn fields(&self) -> &'static [&'static str] {
        match self {
            Stage::None => &[],
            Stage::Ingested => &["video"],
            Stage::Transcribed => &["video", "transcript"],
            Stage::ClipsReady => &["video", "transcript", "clip_plan"],
            Stage::Cut => &["video", "transcript", "clip_plan", "cut"],
            Stage::Published => &["video", "transcript", "clip_plan", "cut", "publish"],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the source video came from. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    /// File in remote storage.
    Remote {
        file_id: String,
        #[serde(default)]
        parent_id: Option<String>,
    },
    /// File on local disk.
    Local { path: PathBuf },
}

impl SourceRef {
    /// Parent container of a remote source, if known.
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            SourceRef::Remote { parent_id, .. } => parent_id.as_deref(),
            SourceRef::Local { .. } => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceRef::Remote { .. })
    }
}

/// Identity and local location of the source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VideoRecord {
    pub source: SourceRef,
    /// Original file name, e.g. `demo.mp4`.
    pub video_name: String,
    /// Materialized copy or symlink inside the work directory.
    pub video_path: PathBuf,
}

impl VideoRecord {
    /// File name without extension.
    pub fn stem(&self) -> &str {
        video_stem(&self.video_name)
    }
}

/// Derived transcript artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TranscriptRef {
    pub srt_path: PathBuf,
    pub transcript_path: PathBuf,
    pub word_count: usize,
    pub utterance_count: usize,
}

impl TranscriptRef {
    /// Both transcript files are present on disk.
    pub fn artifacts_exist(&self) -> bool {
        self.srt_path.exists() && self.transcript_path.exists()
    }
}

/// Outcome of the cut stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CutRecord {
    pub cut_count: usize,
    #[serde(default)]
    pub failed_ids: Vec<u32>,
}

/// Outcome of the publish stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PublishRecord {
    pub folder_id: String,
    pub folder_url: String,
    pub uploaded_count: usize,
    #[serde(default)]
    pub failed_uploads: Vec<String>,
    /// File names already present in the folder. A later run uploads only
    /// what is missing from this list.
    #[serde(default)]
    pub uploaded_files: Vec<String>,
}

impl PublishRecord {
    pub fn is_uploaded(&self, file_name: &str) -> bool {
        self.uploaded_files.iter().any(|f| f == file_name)
    }
}

/// Checkpoint for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Checkpoint {
    #[default]
    #[serde(rename = "none")]
    Empty,
    Ingested {
        video: VideoRecord,
    },
    Transcribed {
        video: VideoRecord,
        transcript: TranscriptRef,
    },
    ClipsReady {
        video: VideoRecord,
        transcript: TranscriptRef,
        clip_plan: PathBuf,
    },
    Cut {
        video: VideoRecord,
        transcript: TranscriptRef,
        clip_plan: PathBuf,
        cut: CutRecord,
    },
    Published {
        video: VideoRecord,
        transcript: TranscriptRef,
        clip_plan: PathBuf,
        cut: CutRecord,
        publish: PublishRecord,
    },
}

impl Checkpoint {
    /// Parse a stored record, rejecting unknown stages and unexpected keys.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| ModelError::invalid_checkpoint("record is not a JSON object"))?;

        let tag = object
            .get("stage")
            .ok_or_else(|| ModelError::invalid_checkpoint("missing 'stage'"))?;
        let stage: Stage = serde_json::from_value(tag.clone())
            .map_err(|_| ModelError::invalid_checkpoint(format!("unknown stage {tag}")))?;

        let allowed = stage.fields();
        if let Some(unknown) = object
            .keys()
            .find(|k| k.as_str() != "stage" && !allowed.contains(&k.as_str()))
        {
            return Err(ModelError::invalid_checkpoint(format!(
                "unexpected field '{unknown}' for stage {stage}"
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| ModelError::invalid_checkpoint(format!("stage {stage}: {e}")))
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn stage(&self) -> Stage {
        match self {
            Checkpoint::Empty => Stage::None,
            Checkpoint::Ingested { .. } => Stage::Ingested,
            Checkpoint::Transcribed { .. } => Stage::Transcribed,
            Checkpoint::ClipsReady { .. } => Stage::ClipsReady,
            Checkpoint::Cut { .. } => Stage::Cut,
            Checkpoint::Published { .. } => Stage::Published,
        }
    }

    pub fn video(&self) -> Option<&VideoRecord> {
        match self {
            Checkpoint::Empty => None,
            Checkpoint::Ingested { video }
            | Checkpoint::Transcribed { video, .. }
            | Checkpoint::ClipsReady { video, .. }
            | Checkpoint::Cut { video, .. }
            | Checkpoint::Published { video, .. } => Some(video),
        }
    }

    pub fn transcript(&self) -> Option<&TranscriptRef> {
        match self {
            Checkpoint::Transcribed { transcript, .. }
            | Checkpoint::ClipsReady { transcript, .. }
            | Checkpoint::Cut { transcript, .. }
            | Checkpoint::Published { transcript, .. } => Some(transcript),
            _ => None,
        }
    }

    pub fn clip_plan(&self) -> Option<&Path> {
        match self {
            Checkpoint::ClipsReady { clip_plan, .. }
            | Checkpoint::Cut { clip_plan, .. }
            | Checkpoint::Published { clip_plan, .. } => Some(clip_plan),
            _ => None,
        }
    }

    pub fn cut(&self) -> Option<&CutRecord> {
        match self {
            Checkpoint::Cut { cut, .. } | Checkpoint::Published { cut, .. } => Some(cut),
            _ => None,
        }
    }

    pub fn publish(&self) -> Option<&PublishRecord> {
        match self {
            Checkpoint::Published { publish, .. } => Some(publish),
            _ => None,
        }
    }

    /// Record an ingested video.
    ///
    /// From an empty checkpoint this advances to `ingested`; on a later
    /// stage only the video record is replaced, so a re-ingest after the
    /// local file vanished never moves the stage backwards.
    pub fn with_video(self, video: VideoRecord) -> Self {
        match self {
            Checkpoint::Empty | Checkpoint::Ingested { .. } => Checkpoint::Ingested { video },
            Checkpoint::Transcribed { transcript, .. } => {
                Checkpoint::Transcribed { video, transcript }
            }
            Checkpoint::ClipsReady {
                transcript,
                clip_plan,
                ..
            } => Checkpoint::ClipsReady {
                video,
                transcript,
                clip_plan,
            },
            Checkpoint::Cut {
                transcript,
                clip_plan,
                cut,
                ..
            } => Checkpoint::Cut {
                video,
                transcript,
                clip_plan,
                cut,
            },
            Checkpoint::Published {
                transcript,
                clip_plan,
                cut,
                publish,
                ..
            } => Checkpoint::Published {
                video,
                transcript,
                clip_plan,
                cut,
                publish,
            },
        }
    }

    /// Record transcript artifacts. Requires at least `ingested`.
    pub fn with_transcript(self, transcript: TranscriptRef) -> ModelResult<Self> {
        Ok(match self {
            Checkpoint::Empty => return Err(self.order_error(Stage::Ingested)),
            Checkpoint::Ingested { video } | Checkpoint::Transcribed { video, .. } => {
                Checkpoint::Transcribed { video, transcript }
            }
            Checkpoint::ClipsReady {
                video, clip_plan, ..
            } => Checkpoint::ClipsReady {
                video,
                transcript,
                clip_plan,
            },
            Checkpoint::Cut {
                video,
                clip_plan,
                cut,
                ..
            } => Checkpoint::Cut {
                video,
                transcript,
                clip_plan,
                cut,
            },
            Checkpoint::Published {
                video,
                clip_plan,
                cut,
                publish,
                ..
            } => Checkpoint::Published {
                video,
                transcript,
                clip_plan,
                cut,
                publish,
            },
        })
    }

    /// Record the discovered clip plan. Requires at least `transcribed`.
    pub fn with_clip_plan(self, clip_plan: PathBuf) -> ModelResult<Self> {
        Ok(match self {
            Checkpoint::Empty | Checkpoint::Ingested { .. } => {
                return Err(self.order_error(Stage::Transcribed))
            }
            Checkpoint::Transcribed { video, transcript }
            | Checkpoint::ClipsReady {
                video, transcript, ..
            } => Checkpoint::ClipsReady {
                video,
                transcript,
                clip_plan,
            },
            Checkpoint::Cut {
                video,
                transcript,
                cut,
                ..
            } => Checkpoint::Cut {
                video,
                transcript,
                clip_plan,
                cut,
            },
            Checkpoint::Published {
                video,
                transcript,
                cut,
                publish,
                ..
            } => Checkpoint::Published {
                video,
                transcript,
                clip_plan,
                cut,
                publish,
            },
        })
    }

    /// Record a finished cut batch. Requires at least `clips_ready`.
    pub fn with_cut(self, cut: CutRecord) -> ModelResult<Self> {
        Ok(match self {
            Checkpoint::Empty | Checkpoint::Ingested { .. } | Checkpoint::Transcribed { .. } => {
                return Err(self.order_error(Stage::ClipsReady))
            }
            Checkpoint::ClipsReady {
                video,
                transcript,
                clip_plan,
            }
            | Checkpoint::Cut {
                video,
                transcript,
                clip_plan,
                ..
            } => Checkpoint::Cut {
                video,
                transcript,
                clip_plan,
                cut,
            },
            Checkpoint::Published {
                video,
                transcript,
                clip_plan,
                publish,
                ..
            } => Checkpoint::Published {
                video,
                transcript,
                clip_plan,
                cut,
                publish,
            },
        })
    }

    /// Record a publish result. Requires at least `cut`.
    pub fn with_publish(self, publish: PublishRecord) -> ModelResult<Self> {
        match self {
            Checkpoint::Cut {
                video,
                transcript,
                clip_plan,
                cut,
            }
            | Checkpoint::Published {
                video,
                transcript,
                clip_plan,
                cut,
                ..
            } => Ok(Checkpoint::Published {
                video,
                transcript,
                clip_plan,
                cut,
                publish,
            }),
            other => Err(other.order_error(Stage::Cut)),
        }
    }

    fn order_error(&self, required: Stage) -> ModelError {
        ModelError::StageOrder {
            required,
            actual: self.stage(),
        }
    }
}
