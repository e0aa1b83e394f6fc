//! Subtitle and markdown renderings of a transcript.

use std::fmt::Write;

use vclip_models::{format_srt_time, format_time, Transcript};

/// SRT cues, one per utterance, labelled with the speaker.
pub fn render_srt(transcript: &Transcript) -> String {
    let mut out = String::new();
    for (i, utterance) in transcript.utterances.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n[Speaker {}] {}\n\n",
            i + 1,
            format_srt_time(utterance.start_secs()),
            format_srt_time(utterance.end_secs()),
            utterance.speaker_label(),
            utterance.text
        );
    }
    out
}

/// Readable transcript with a short header and timestamped speaker turns.
pub fn render_markdown(transcript: &Transcript, title: &str) -> String {
    let mut out = format!("# Transcript: {title}\n\n");
    let _ = write!(
        out,
        "**Duration:** {}\n**Speakers:** {}\n\n---\n\n",
        format_time(transcript.duration_secs()),
        transcript.speaker_count()
    );
    for utterance in &transcript.utterances {
        let _ = write!(
            out,
            "**[{}] Speaker {}:** {}\n\n",
            format_time(utterance.start_secs()),
            utterance.speaker_label(),
            utterance.text
        );
    }
    out
}

/// Details for the transcription-complete notification.
pub fn summary_details(transcript: &Transcript) -> String {
    format!(
        "Duration: {}\nWords: {}\nUtterances: {}\nSpeakers: {}",
        format_time(transcript.duration_secs()),
        transcript.words.len(),
        transcript.utterances.len(),
        transcript.speaker_count()
    )
}
