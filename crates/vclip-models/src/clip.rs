//! Clip plan entities.
//!
//! Clip plans are produced outside the pipeline and dropped into the work
//! directory as `<name>_clips.json`. The pipeline only reads them.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::utils::slugify;

/// Maximum slug length used for clip file names.
pub const CLIP_TITLE_SLUG_LEN: usize = 40;

/// A single segment to extract from the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Unique within a plan.
    pub id: u32,

    /// Start time in seconds.
    pub start_time: f64,

    /// End time in seconds.
    pub end_time: f64,

    #[serde(default)]
    pub title: String,

    /// Used only to rank clips for the draft cut.
    #[serde(default)]
    pub virality_score: Option<f64>,

    /// Horizontal crop offset in pixels for the vertical variant.
    #[serde(default)]
    pub crop_x: Option<u32>,

    /// Target platform hint, shown in summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl Clip {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Score used for ranking; unscored clips rank as zero.
    pub fn score(&self) -> f64 {
        self.virality_score.unwrap_or(0.0)
    }

    /// Check that the time range can be cut.
    pub fn validate(&self) -> ModelResult<()> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(ModelError::invalid_clip(self.id, "non-finite time range"));
        }
        if self.start_time < 0.0 {
            return Err(ModelError::invalid_clip(
                self.id,
                format!("negative start time {}", self.start_time),
            ));
        }
        if self.end_time <= self.start_time {
            return Err(ModelError::invalid_clip(
                self.id,
                format!(
                    "end time {} is not after start time {}",
                    self.end_time, self.start_time
                ),
            ));
        }
        Ok(())
    }

    /// File name stem, e.g. `clip_03_the_big_reveal`.
    pub fn base_name(&self) -> String {
        let slug = slugify(&self.title, CLIP_TITLE_SLUG_LEN);
        if slug.is_empty() {
            format!("clip_{:02}", self.id)
        } else {
            format!("clip_{:02}_{}", self.id, slug)
        }
    }

    pub fn primary_file_name(&self) -> String {
        format!("{}.mp4", self.base_name())
    }

    pub fn vertical_file_name(&self) -> String {
        format!("{}_vertical.mp4", self.base_name())
    }
}

/// Externally supplied list of clips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipPlan {
    pub clips: Vec<Clip>,
}

impl ClipPlan {
    /// Parse a plan document and check that clip ids are unique.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let plan: ClipPlan = serde_json::from_str(json)
            .map_err(|e| ModelError::InvalidClipPlan(e.to_string()))?;

        let mut seen = HashSet::new();
        for clip in &plan.clips {
            if !seen.insert(clip.id) {
                return Err(ModelError::InvalidClipPlan(format!(
                    "duplicate clip id {}",
                    clip.id
                )));
            }
        }
        Ok(plan)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Highest scored clip; the earliest one wins ties.
    pub fn top_ranked(&self) -> Option<&Clip> {
        self.clips.iter().fold(None, |best: Option<&Clip>, clip| match best {
            Some(b) if b.score() >= clip.score() => Some(b),
            _ => Some(clip),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(id: u32, score: f64) -> Clip {
        Clip {
            id,
            start_time: 10.0,
            end_time: 40.0,
            title: format!("Clip {id}"),
            virality_score: Some(score),
            crop_x: None,
            platform: None,
        }
    }

    #[test]
    fn test_top_ranked_picks_highest_score() {
        let plan = ClipPlan {
            clips: vec![clip(1, 3.0), clip(2, 9.0), clip(3, 5.0)],
        };
        assert_eq!(plan.top_ranked().unwrap().id, 2);

        let reordered = ClipPlan {
            clips: vec![clip(2, 9.0), clip(3, 5.0), clip(1, 3.0)],
        };
        assert_eq!(reordered.top_ranked().unwrap().id, 2);
    }

    #[test]
    fn test_top_ranked_tie_keeps_first() {
        let plan = ClipPlan {
            clips: vec![clip(4, 7.0), clip(5, 7.0)],
        };
        assert_eq!(plan.top_ranked().unwrap().id, 4);
        assert!(ClipPlan::default().top_ranked().is_none());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut bad = clip(1, 1.0);
        bad.end_time = bad.start_time;
        assert!(bad.validate().is_err());

        bad.start_time = -1.0;
        bad.end_time = 5.0;
        assert!(bad.validate().is_err());

        assert!(clip(2, 1.0).validate().is_ok());
    }

    #[test]
    fn test_file_names() {
        let mut c = clip(3, 1.0);
        c.title = "The Big Reveal: Part 1!".to_string();
        assert_eq!(c.base_name(), "clip_03_the_big_reveal_part_1");
        assert_eq!(c.primary_file_name(), "clip_03_the_big_reveal_part_1.mp4");
        assert_eq!(
            c.vertical_file_name(),
            "clip_03_the_big_reveal_part_1_vertical.mp4"
        );

        c.title = "!!!".to_string();
        assert_eq!(c.base_name(), "clip_03");
    }

    #[test]
    fn test_plan_parses_extra_fields() {
        let json = r#"{
            "source": "demo.mp4",
            "clips": [
                {"id": 1, "start_time": 12.5, "end_time": 48.0, "title": "Hook",
                 "virality_score": 8, "platform": "tiktok", "reason": "funny"},
                {"id": 2, "start_time": 100, "end_time": 130, "crop_x": 420}
            ]
        }"#;
        let plan = ClipPlan::from_json(json).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.clips[0].virality_score, Some(8.0));
        assert_eq!(plan.clips[1].crop_x, Some(420));
        assert_eq!(plan.clips[1].title, "");
    }

    #[test]
    fn test_plan_rejects_duplicate_ids() {
        let json = r#"{"clips": [
            {"id": 1, "start_time": 0, "end_time": 5},
            {"id": 1, "start_time": 6, "end_time": 9}
        ]}"#;
        assert!(ClipPlan::from_json(json).is_err());
    }

    #[test]
    fn test_plan_requires_clip_list() {
        assert!(ClipPlan::from_json(r#"{"highlights": []}"#).is_err());
    }
}
