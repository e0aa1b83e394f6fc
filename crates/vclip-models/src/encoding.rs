//! Video encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "medium";
/// CRF for primary-aspect cuts
pub const PRIMARY_CRF: u8 = 18;
/// CRF for vertical cuts and messaging copies
pub const DERIVED_CRF: u8 = 23;

/// Audio extraction codec and bitrate for transcription uploads.
pub const TRANSCRIPTION_AUDIO_CODEC: &str = "libmp3lame";
pub const TRANSCRIPTION_AUDIO_BITRATE: &str = "128k";

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate; encoder default when unset
    #[serde(default)]
    pub audio_bitrate: Option<String>,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    PRIMARY_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: PRIMARY_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: None,
        }
    }
}

impl EncodingConfig {
    /// High-fidelity settings for the primary-aspect cut.
    pub fn for_primary_cut() -> Self {
        Self::default()
    }

    /// Settings for the cropped and rescaled vertical cut.
    pub fn for_vertical_cut() -> Self {
        Self::default().with_crf(DERIVED_CRF)
    }

    /// Settings for the size-limited messaging copy.
    pub fn for_preview() -> Self {
        Self::default().with_crf(DERIVED_CRF)
    }

    /// Returns a new config with updated CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Convert to FFmpeg command arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
        ];

        if let Some(bitrate) = &self.audio_bitrate {
            args.extend_from_slice(&["-b:a".to_string(), bitrate.clone()]);
        }

        args
    }
}
