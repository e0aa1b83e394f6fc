//! Per-video working directory layout.
//!
//! ```text
//! <work_root>/<slug>/
//!   state.json            checkpoint
//!   <video file>          symlink or download
//!   <stem>.mp3 .srt _transcript.md
//!   <name>_clips.json     clip plan, dropped in by the operator
//!   clips/                full-resolution cuts
//!   clips/telegram/       messaging-sized copies
//! ```

use std::path::{Path, PathBuf};

use vclip_media::clip::PARTIAL_SUFFIX;
use vclip_models::utils::WORK_DIR_SLUG_LEN;
use vclip_models::{slugify, video_stem};

use crate::checkpoint::CheckpointStore;
use crate::error::PipelineResult;

pub const CLIPS_DIR: &str = "clips";
pub const PREVIEW_DIR: &str = "telegram";
pub const CLIP_PLAN_SUFFIX: &str = "_clips.json";

const FALLBACK_SLUG: &str = "video";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Work directory for `video_name` under `work_root`, keyed by the slug
    /// of its stem.
    pub fn for_video(work_root: &Path, video_name: &str) -> Self {
        let slug = slugify(video_stem(video_name), WORK_DIR_SLUG_LEN);
        let slug = if slug.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            slug
        };
        Self {
            root: work_root.join(slug),
        }
    }

    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory and its `clips/` subdirectory.
    pub async fn create(&self) -> PipelineResult<()> {
        tokio::fs::create_dir_all(self.clips_dir()).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.root.join(name)
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.root.join(CLIPS_DIR)
    }

    pub fn preview_dir(&self) -> PathBuf {
        self.clips_dir().join(PREVIEW_DIR)
    }

    pub fn checkpoints(&self) -> CheckpointStore {
        CheckpointStore::new(&self.root)
    }

    /// First `*_clips.json` in the directory, by file name.
    pub async fn find_clip_plan(&self) -> PipelineResult<Option<PathBuf>> {
        let mut candidates = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(CLIP_PLAN_SUFFIX) && entry.file_type().await?.is_file() {
                candidates.push(entry.path());
            }
        }
        candidates.sort();
        Ok(candidates.into_iter().next())
    }

    /// Finished full-resolution cuts in `clips/`, sorted by name.
    pub async fn clip_files(&self) -> PipelineResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = match tokio::fs::read_dir(self.clips_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".mp4")
                && !name.ends_with(PARTIAL_SUFFIX)
                && entry.file_type().await?.is_file()
            {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_video_uses_stem_slug() {
        let dir = WorkDir::for_video(Path::new(".tmp"), "My Talk - Final.mp4");
        assert_eq!(dir.path(), Path::new(".tmp/my_talk_final"));
        assert_eq!(dir.preview_dir(), Path::new(".tmp/my_talk_final/clips/telegram"));

        let odd = WorkDir::for_video(Path::new(".tmp"), "???.mp4");
        assert_eq!(odd.path(), Path::new(".tmp/video"));
    }

    #[tokio::test]
    async fn test_find_clip_plan_picks_first_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = WorkDir::open(tmp.path());
        assert_eq!(dir.find_clip_plan().await.unwrap(), None);

        std::fs::write(tmp.path().join("b_clips.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("a_clips.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("notes.json"), "{}").unwrap();

        assert_eq!(
            dir.find_clip_plan().await.unwrap(),
            Some(tmp.path().join("a_clips.json"))
        );
    }

    #[tokio::test]
    async fn test_clip_files_skip_partials_and_previews() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = WorkDir::open(tmp.path());
        dir.create().await.unwrap();
        std::fs::create_dir_all(dir.preview_dir()).unwrap();

        for name in ["clip_02_b.mp4", "clip_01_a.mp4", "clip_03_c.partial.mp4", "notes.txt"] {
            std::fs::write(dir.clips_dir().join(name), b"x").unwrap();
        }
        std::fs::write(dir.preview_dir().join("clip_01_a.mp4"), b"x").unwrap();

        let files = dir.clip_files().await.unwrap();
        assert_eq!(
            files,
            vec![
                dir.clips_dir().join("clip_01_a.mp4"),
                dir.clips_dir().join("clip_02_b.mp4"),
            ]
        );
    }
}
