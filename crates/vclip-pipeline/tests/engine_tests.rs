//! Cut engine behaviour with a fake encoder.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeEncoder, RecordingMessenger};
use vclip_media::CutOptions;
use vclip_models::Clip;
use vclip_notify::NotificationRelay;
use vclip_pipeline::{CutEngine, PreviewSink};

fn clip(id: u32, start: f64, end: f64) -> Clip {
    Clip {
        id,
        start_time: start,
        end_time: end,
        title: format!("Part {id}"),
        virality_score: Some(5.0),
        crop_x: None,
        platform: None,
    }
}

#[tokio::test]
async fn concurrency_is_bounded_by_workers() {
    let tmp = tempfile::tempdir().unwrap();
    let encoder = Arc::new(FakeEncoder::default().with_delay(|_| Duration::from_millis(20)));
    let engine = CutEngine::new(encoder.clone(), 2, CutOptions::default().without_vertical());
    let clips: Vec<Clip> = (1..=5).map(|i| clip(i, i as f64 * 10.0, i as f64 * 10.0 + 5.0)).collect();

    let report = engine
        .run(&tmp.path().join("src.mp4"), &clips, tmp.path(), None)
        .await;

    assert_eq!(report.succeeded(), 5);
    assert_eq!(encoder.encode_count(), 5);
    assert!(encoder.max_in_flight() <= 2);
}

#[tokio::test]
async fn report_is_ordered_by_clip_id() {
    let tmp = tempfile::tempdir().unwrap();
    let encoder = Arc::new(
        FakeEncoder::default()
            .with_delay(|name| {
                if name.starts_with("clip_01") {
                    Duration::from_millis(50)
                } else {
                    Duration::ZERO
                }
            })
            .failing_when(|name| name.starts_with("clip_03")),
    );
    let engine = CutEngine::new(encoder, 4, CutOptions::default());
    let clips = vec![clip(3, 0.0, 10.0), clip(1, 20.0, 30.0), clip(2, 40.0, 50.0)];

    let report = engine
        .run(&tmp.path().join("src.mp4"), &clips, tmp.path(), None)
        .await;

    let ids: Vec<u32> = report.results.iter().map(|r| r.clip_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(report.failed_ids(), vec![3]);
    assert!(report.results[2]
        .outcome
        .as_ref()
        .unwrap_err()
        .contains("Conversion failed!"));
}

#[tokio::test]
async fn zero_workers_still_make_progress() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = CutEngine::new(Arc::new(FakeEncoder::default()), 0, CutOptions::default());
    assert_eq!(engine.workers(), 1);

    let report = engine
        .run(&tmp.path().join("src.mp4"), &[clip(1, 0.0, 5.0)], tmp.path(), None)
        .await;
    assert_eq!(report.succeeded(), 1);
}

#[tokio::test]
async fn previews_are_queued_for_successful_clips_only() {
    let tmp = tempfile::tempdir().unwrap();
    let encoder = Arc::new(FakeEncoder::default());
    let messenger = Arc::new(RecordingMessenger::default());
    let relay = NotificationRelay::spawn(messenger.clone(), 8);
    let sink = PreviewSink {
        dir: tmp.path().join("telegram"),
        relay: relay.sender(),
    };
    let engine = CutEngine::new(encoder, 2, CutOptions::default());
    let clips = vec![clip(1, 0.0, 10.0), clip(2, 30.0, 20.0)];

    let report = engine
        .run(&tmp.path().join("src.mp4"), &clips, tmp.path(), Some(&sink))
        .await;
    drop(sink);
    let relayed = relay.drain().await;

    assert_eq!(report.failed_ids(), vec![2]);
    assert_eq!(relayed.sent, 2);
    let captions = messenger.media_captions();
    assert!(captions[0].starts_with("<b>Clip 1/2</b>\n#1 Part 1"));
    assert!(captions[1].ends_with("(vertical 9:16)"));
    assert!(tmp.path().join("telegram/clip_01_part_1.mp4").exists());
    assert!(tmp.path().join("telegram/clip_01_part_1_vertical.mp4").exists());
}
