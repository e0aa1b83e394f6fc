//! Message bodies for pipeline steps, clip summaries and captions.
//!
//! Messages use Telegram's HTML parse mode, so free text coming from clip
//! plans and file names goes through [`escape_html`].

use vclip_models::{format_time, Clip};

const HEADER: &str = "<b>Video Clipper</b>";

/// Appended to the caption of an alternate-aspect preview.
pub const VERTICAL_CAPTION_SUFFIX: &str = "\n(vertical 9:16)";

/// Milestones reported to the messaging channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    DownloadStart,
    DownloadDone,
    TranscribeStart,
    TranscribeDone,
    ClipsIdentified,
    DraftCut,
    CuttingStart,
    CuttingDone,
    UploadStart,
    UploadDone,
    Error,
}

impl PipelineStep {
    pub fn key(&self) -> &'static str {
        match self {
            PipelineStep::DownloadStart => "download_start",
            PipelineStep::DownloadDone => "download_done",
            PipelineStep::TranscribeStart => "transcribe_start",
            PipelineStep::TranscribeDone => "transcribe_done",
            PipelineStep::ClipsIdentified => "clips_identified",
            PipelineStep::DraftCut => "draft_cut",
            PipelineStep::CuttingStart => "cutting_start",
            PipelineStep::CuttingDone => "cutting_done",
            PipelineStep::UploadStart => "upload_start",
            PipelineStep::UploadDone => "upload_done",
            PipelineStep::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStep::DownloadStart => "Downloading from Google Drive",
            PipelineStep::DownloadDone => "Download complete",
            PipelineStep::TranscribeStart => "Transcribing with AssemblyAI",
            PipelineStep::TranscribeDone => "Transcription complete",
            PipelineStep::ClipsIdentified => "Clips identified",
            PipelineStep::DraftCut => "Draft clip cut",
            PipelineStep::CuttingStart => "Cutting all clips",
            PipelineStep::CuttingDone => "All clips cut",
            PipelineStep::UploadStart => "Uploading to Google Drive",
            PipelineStep::UploadDone => "Upload complete",
            PipelineStep::Error => "Error",
        }
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Longest prefix of `text` holding at most `max` chars.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Status message for a pipeline step. `details` is inserted as-is and may
/// carry markup.
pub fn step_message(step: PipelineStep, video_name: &str, details: &str) -> String {
    let mut msg = format!(
        "{HEADER}\n<b>{}</b>\n{}",
        step.label(),
        escape_html(video_name)
    );
    if !details.is_empty() {
        msg.push_str("\n\n");
        msg.push_str(details);
    }
    msg
}

fn score_label(clip: &Clip) -> String {
    match clip.virality_score {
        Some(score) if score.fract() == 0.0 => format!("{score:.0}"),
        Some(score) => score.to_string(),
        None => "?".to_string(),
    }
}

fn title_of(clip: &Clip) -> String {
    if clip.title.trim().is_empty() {
        format!("Clip {}", clip.id)
    } else {
        escape_html(&clip.title)
    }
}

/// `m:ss–m:ss` for a clip.
pub fn time_range(clip: &Clip) -> String {
    format!(
        "{}–{}",
        format_time(clip.start_time),
        format_time(clip.end_time)
    )
}

/// Overview of every clip in a plan.
pub fn clips_summary(clips: &[Clip], video_name: &str) -> String {
    let video = escape_html(video_name);
    if clips.is_empty() {
        return format!("{HEADER}\nNo clips identified for {video}");
    }

    let mut lines = vec![
        format!("<b>Video Clipper - {} Clips Identified</b>", clips.len()),
        format!("<i>{video}</i>\n"),
    ];
    for clip in clips {
        lines.push(format!(
            "<b>#{}</b> [{}/10] {}\n  {} ({:.0}s) | {}",
            clip.id,
            score_label(clip),
            title_of(clip),
            time_range(clip),
            clip.duration(),
            clip.platform.as_deref().map(escape_html).unwrap_or_else(|| "?".into()),
        ));
    }
    lines.join("\n")
}

/// Caption for the `index`-th finished clip of a batch.
pub fn clip_caption(index: usize, total: usize, clip: &Clip) -> String {
    format!(
        "<b>Clip {index}/{total}</b>\n#{} {}\n{} ({:.0}s) | {}/10",
        clip.id,
        title_of(clip),
        time_range(clip),
        clip.duration(),
        score_label(clip),
    )
}

/// Caption for a draft cut preview.
pub fn draft_caption(clip: &Clip, vertical: bool) -> String {
    let kind = if vertical { "vertical 9:16" } else { "horizontal" };
    format!(
        "<b>Draft clip ({kind})</b>\n#{} {}\n{}",
        clip.id,
        title_of(clip),
        time_range(clip)
    )
}

/// Details line announcing a draft cut.
pub fn draft_details(clip: &Clip) -> String {
    format!(
        "Cutting draft: #{} \"{}\"\nTime: {}\nScore: {}/10",
        clip.id,
        title_of(clip),
        time_range(clip),
        score_label(clip)
    )
}
