//! Audio extraction for transcription.

use std::path::{Path, PathBuf};

use tracing::info;

use vclip_models::encoding::{TRANSCRIPTION_AUDIO_BITRATE, TRANSCRIPTION_AUDIO_CODEC};

use crate::clip::{encode_into, partial_path};
use crate::command::FfmpegCommand;
use crate::encoder::Encoder;
use crate::error::MediaResult;

/// Extract the audio track of `video` as MP3 into `audio_path`.
///
/// An existing file is reused. The encoder writes to a partial file that is
/// only renamed into place once it succeeds.
pub async fn extract_audio(
    encoder: &dyn Encoder,
    video: &Path,
    audio_path: &Path,
) -> MediaResult<PathBuf> {
    if audio_path.exists() {
        info!(path = %audio_path.display(), "Audio already extracted");
        return Ok(audio_path.to_path_buf());
    }

    let cmd = FfmpegCommand::new(video, partial_path(audio_path))
        .no_video()
        .audio_codec(TRANSCRIPTION_AUDIO_CODEC)
        .audio_bitrate(TRANSCRIPTION_AUDIO_BITRATE);
    encode_into(encoder, cmd, audio_path).await?;

    info!(path = %audio_path.display(), "Audio extracted");
    Ok(audio_path.to_path_buf())
}
