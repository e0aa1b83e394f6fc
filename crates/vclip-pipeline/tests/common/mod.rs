//! In-memory collaborators for pipeline tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use vclip_media::{Encoder, FfmpegCommand, MediaError, MediaResult};
use vclip_models::{Transcript, TranscriptStatus, Utterance, Word};
use vclip_notify::{Delivery, Messenger};
use vclip_pipeline::{Pipeline, PipelineConfig, PipelineContext};
use vclip_speech::{SpeechError, SpeechResult, SpeechToText, TranscribeOptions};
use vclip_storage::{FileMetadata, RemoteStorage, StorageError, StorageResult};

type OutputRule<T> = Box<dyn Fn(&str) -> T + Send + Sync>;

fn output_name(cmd: &FfmpegCommand) -> String {
    cmd.output()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Writes a placeholder for every encode and records the output names.
#[derive(Default)]
pub struct FakeEncoder {
    outputs: Mutex<Vec<String>>,
    fail_when: Option<OutputRule<bool>>,
    delay: Option<OutputRule<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeEncoder {
    /// Fail every encode whose output file name satisfies `f`.
    pub fn failing_when(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(f));
        self
    }

    /// Sleep before finishing each encode.
    pub fn with_delay(mut self, f: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(f));
        self
    }

    pub fn outputs(&self) -> Vec<String> {
        self.outputs.lock().unwrap().clone()
    }

    pub fn encode_count(&self) -> usize {
        self.outputs.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Encoder for FakeEncoder {
    async fn encode(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let name = output_name(cmd);
        self.outputs.lock().unwrap().push(name.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(&name)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_when.as_ref().is_some_and(|f| f(&name)) {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with status 1",
                Some("Conversion failed!\n".to_string()),
                Some(1),
            ));
        }
        std::fs::write(cmd.output(), b"encoded")?;
        Ok(())
    }

    async fn probe_height(&self, _path: &Path) -> MediaResult<u32> {
        Ok(1080)
    }
}

/// Returns a fixed two-utterance transcript.
pub struct FakeSpeech {
    calls: AtomicUsize,
    status: TranscriptStatus,
}

impl Default for FakeSpeech {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            status: TranscriptStatus::Completed,
        }
    }
}

impl FakeSpeech {
    pub fn failing() -> Self {
        Self {
            status: TranscriptStatus::Error,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for FakeSpeech {
    async fn transcribe(&self, audio: &Path, _options: &TranscribeOptions) -> SpeechResult<Transcript> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !audio.exists() {
            return Err(SpeechError::InvalidResponse("audio missing".into()));
        }
        if self.status == TranscriptStatus::Error {
            return Ok(Transcript {
                status: TranscriptStatus::Error,
                utterances: Vec::new(),
                words: Vec::new(),
                error: Some("Audio file is empty".into()),
            });
        }
        Ok(Transcript {
            status: TranscriptStatus::Completed,
            utterances: vec![
                Utterance {
                    start_ms: 0,
                    end_ms: 4_000,
                    speaker: Some("A".into()),
                    text: "Welcome to the show.".into(),
                },
                Utterance {
                    start_ms: 4_500,
                    end_ms: 600_000,
                    speaker: Some("B".into()),
                    text: "Glad to be here.".into(),
                },
            ],
            words: vec![
                Word {
                    start_ms: 0,
                    end_ms: 500,
                    text: "Welcome".into(),
                },
                Word {
                    start_ms: 599_000,
                    end_ms: 600_000,
                    text: "here.".into(),
                },
            ],
            error: None,
        })
    }

    async fn health_check(&self) -> SpeechResult<()> {
        Ok(())
    }
}

/// Records every storage call as a short string.
pub struct FakeStorage {
    calls: Mutex<Vec<String>>,
    file_name: String,
    parent_id: Option<String>,
    fail_upload: Option<OutputRule<bool>>,
}

impl FakeStorage {
    pub fn new(file_name: &str, parent_id: Option<&str>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            file_name: file_name.to_string(),
            parent_id: parent_id.map(str::to_string),
            fail_upload: None,
        }
    }

    pub fn failing_upload(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.fail_upload = Some(Box::new(f));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteStorage for FakeStorage {
    async fn metadata(&self, file_id: &str) -> StorageResult<FileMetadata> {
        self.record(format!("metadata {file_id}"));
        Ok(FileMetadata {
            id: file_id.to_string(),
            name: self.file_name.clone(),
            size: Some(10 * 1024 * 1024),
            parent_id: self.parent_id.clone(),
        })
    }

    async fn download(&self, file_id: &str, dest: &Path) -> StorageResult<u64> {
        self.record(format!("download {file_id}"));
        std::fs::write(dest, vec![0u8; 2048])?;
        Ok(2048)
    }

    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> StorageResult<String> {
        self.record(format!("create_folder {name} in {}", parent_id.unwrap_or("root")));
        Ok("folder-1".to_string())
    }

    async fn upload(&self, path: &Path, parent_id: Option<&str>) -> StorageResult<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("upload {name} to {}", parent_id.unwrap_or("root")));
        if self.fail_upload.as_ref().is_some_and(|f| f(&name)) {
            return Err(StorageError::UploadFailed(format!("{name}: quota exceeded")));
        }
        Ok(format!("file-{name}"))
    }

    async fn set_public_readable(&self, file_id: &str) -> StorageResult<()> {
        self.record(format!("share {file_id}"));
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<String> {
        Ok("clipper@example.iam.gserviceaccount.com".to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String),
    File(PathBuf, Option<String>),
    Media(PathBuf, Option<String>),
}

/// Captures everything the pipeline sends.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn media_captions(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Media(_, caption) => caption,
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, text: &str) -> Delivery {
        self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
        Delivery::Sent
    }

    async fn send_file(&self, path: &Path, caption: Option<&str>) -> Delivery {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::File(path.to_path_buf(), caption.map(str::to_string)));
        Delivery::Sent
    }

    async fn send_media(&self, path: &Path, caption: Option<&str>) -> Delivery {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Media(path.to_path_buf(), caption.map(str::to_string)));
        Delivery::Sent
    }
}

/// A temp work root, a source video and the fakes wired into a pipeline.
pub struct Harness {
    pub tmp: tempfile::TempDir,
    pub source: PathBuf,
    pub encoder: Arc<FakeEncoder>,
    pub speech: Arc<FakeSpeech>,
    pub storage: Option<Arc<FakeStorage>>,
    pub messenger: Arc<RecordingMessenger>,
    pub config: PipelineConfig,
}

impl Harness {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("input").join("demo.mp4");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, vec![1u8; 4096]).unwrap();

        let config = PipelineConfig {
            work_root: tmp.path().join("work"),
            ..PipelineConfig::default()
        }
        .with_workers(2);

        Self {
            tmp,
            source,
            encoder: Arc::new(FakeEncoder::default()),
            speech: Arc::new(FakeSpeech::default()),
            storage: Some(Arc::new(FakeStorage::new("demo.mp4", None))),
            messenger: Arc::new(RecordingMessenger::default()),
            config,
        }
    }

    pub fn with_encoder(mut self, encoder: FakeEncoder) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn with_speech(mut self, speech: FakeSpeech) -> Self {
        self.speech = Arc::new(speech);
        self
    }

    pub fn with_storage(mut self, storage: Option<FakeStorage>) -> Self {
        self.storage = storage.map(Arc::new);
        self
    }

    pub fn with_config(mut self, f: impl FnOnce(PipelineConfig) -> PipelineConfig) -> Self {
        self.config = f(self.config);
        self
    }

    pub fn pipeline(&self) -> Pipeline {
        let storage = self
            .storage
            .clone()
            .map(|s| s as Arc<dyn RemoteStorage>);
        Pipeline::new(PipelineContext::new(
            self.config.clone(),
            self.encoder.clone(),
            self.speech.clone(),
            storage,
            self.messenger.clone(),
        ))
    }

    pub fn storage(&self) -> &FakeStorage {
        self.storage.as_deref().unwrap()
    }

    /// Work directory the pipeline derives for `demo.mp4`.
    pub fn work_dir(&self) -> PathBuf {
        self.config.work_root.join("demo")
    }
}

/// Plan document with `(id, start, end, score)` clips.
pub fn plan_json(clips: &[(u32, f64, f64, f64)]) -> String {
    let clips: Vec<_> = clips
        .iter()
        .map(|(id, start, end, score)| {
            json!({
                "id": id,
                "start_time": start,
                "end_time": end,
                "title": format!("Moment {id}"),
                "virality_score": score,
                "platform": "shorts"
            })
        })
        .collect();
    json!({ "clips": clips }).to_string()
}

pub fn write_plan(dir: &Path, name: &str, clips: &[(u32, f64, f64, f64)]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, plan_json(clips)).unwrap();
    path
}
