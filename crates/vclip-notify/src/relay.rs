//! Notification relay.
//!
//! Producers (clip workers) enqueue `(artifact, caption)` pairs through a
//! [`RelaySender`]; one background task forwards them to the [`Messenger`]
//! strictly in enqueue order. [`NotificationRelay::drain`] closes the
//! relay's own sender and waits until the queue is empty and the task has
//! exited, so every item is either sent or its failure is logged.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::messenger::{Delivery, Messenger};

/// How an artifact is forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    /// Playable video (`send_media`)
    Media,
    /// Generic document (`send_file`)
    File,
}

/// A queued artifact.
#[derive(Debug, Clone)]
pub struct RelayItem {
    pub path: PathBuf,
    pub caption: String,
    pub kind: RelayKind,
}

impl RelayItem {
    pub fn media(path: impl Into<PathBuf>, caption: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            caption: caption.into(),
            kind: RelayKind::Media,
        }
    }

    pub fn file(path: impl Into<PathBuf>, caption: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            caption: caption.into(),
            kind: RelayKind::File,
        }
    }
}

/// What the consumer did with the queue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayReport {
    pub sent: usize,
    pub skipped: usize,
    /// Artifacts whose send failed, in processing order.
    pub failed: Vec<PathBuf>,
}

impl RelayReport {
    pub fn processed(&self) -> usize {
        self.sent + self.skipped + self.failed.len()
    }
}

/// Cloneable producer handle.
#[derive(Debug, Clone)]
pub struct RelaySender {
    tx: mpsc::Sender<RelayItem>,
}

impl RelaySender {
    /// Queue an item. Waits when the queue is full; returns `false` once the
    /// consumer is gone.
    pub async fn enqueue(&self, item: RelayItem) -> bool {
        debug!(path = %item.path.display(), "Queueing notification");
        self.tx.send(item).await.is_ok()
    }
}

/// Handle to the background consumer.
pub struct NotificationRelay {
    sender: RelaySender,
    worker: JoinHandle<RelayReport>,
}

impl NotificationRelay {
    /// Spawn the consumer task. `capacity` bounds the queue (minimum 1).
    pub fn spawn(messenger: Arc<dyn Messenger>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(forward(messenger, rx));
        Self {
            sender: RelaySender { tx },
            worker,
        }
    }

    pub fn sender(&self) -> RelaySender {
        self.sender.clone()
    }

    pub async fn enqueue(&self, item: RelayItem) -> bool {
        self.sender.enqueue(item).await
    }

    /// Close the queue and wait for the consumer to finish.
    ///
    /// Returns only after every outstanding [`RelaySender`] clone has been
    /// dropped and the queue has been emptied.
    pub async fn drain(self) -> RelayReport {
        let Self { sender, worker } = self;
        drop(sender);

        match worker.await {
            Ok(report) => {
                info!(
                    sent = report.sent,
                    skipped = report.skipped,
                    failed = report.failed.len(),
                    "Notification relay drained"
                );
                report
            }
            Err(e) => {
                error!(error = %e, "Notification relay task aborted");
                RelayReport::default()
            }
        }
    }
}

async fn forward(messenger: Arc<dyn Messenger>, mut rx: mpsc::Receiver<RelayItem>) -> RelayReport {
    let mut report = RelayReport::default();

    while let Some(item) = rx.recv().await {
        let caption = Some(item.caption.as_str()).filter(|c| !c.is_empty());
        let delivery = match item.kind {
            RelayKind::Media => messenger.send_media(&item.path, caption).await,
            RelayKind::File => messenger.send_file(&item.path, caption).await,
        };

        match delivery {
            Delivery::Sent => report.sent += 1,
            Delivery::Skipped => report.skipped += 1,
            Delivery::Failed(reason) => {
                warn!(path = %item.path.display(), error = %reason, "Notification send failed");
                report.failed.push(item.path);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    /// Records sends; the first send is slow so later producers race ahead.
    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(String, Option<String>)>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingMessenger {
        fn names(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
        }

        async fn record(&self, path: &Path, caption: Option<&str>) -> Delivery {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            let first = self.sent.lock().unwrap().is_empty();
            if first {
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            self.sent
                .lock()
                .unwrap()
                .push((name.clone(), caption.map(str::to_string)));
            if self.fail_on == Some(name.as_str()) {
                Delivery::Failed("boom".into())
            } else {
                Delivery::Sent
            }
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_text(&self, _text: &str) -> Delivery {
            Delivery::Sent
        }

        async fn send_file(&self, path: &Path, caption: Option<&str>) -> Delivery {
            self.record(path, caption).await
        }

        async fn send_media(&self, path: &Path, caption: Option<&str>) -> Delivery {
            self.record(path, caption).await
        }
    }

    #[tokio::test]
    async fn test_sends_in_enqueue_order() {
        let messenger = Arc::new(RecordingMessenger::default());
        let relay = NotificationRelay::spawn(messenger.clone(), 8);

        for name in ["a.mp4", "b.mp4", "c.mp4"] {
            assert!(relay.enqueue(RelayItem::media(name, format!("clip {name}"))).await);
        }
        let report = relay.drain().await;

        assert_eq!(messenger.names(), vec!["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(report.sent, 3);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_drain_waits_for_cloned_senders() {
        let messenger = Arc::new(RecordingMessenger::default());
        let relay = NotificationRelay::spawn(messenger.clone(), 1);

        let sender = relay.sender();
        let producer = tokio::spawn(async move {
            for i in 0..4 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                sender.enqueue(RelayItem::file(format!("{i}.json"), "")).await;
            }
        });

        let report = relay.drain().await;
        producer.await.unwrap();

        assert_eq!(report.processed(), 4);
        assert_eq!(messenger.names(), vec!["0.json", "1.json", "2.json", "3.json"]);
        assert!(messenger.sent.lock().unwrap().iter().all(|(_, c)| c.is_none()));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_relay() {
        let messenger = Arc::new(RecordingMessenger {
            fail_on: Some("b.mp4"),
            ..Default::default()
        });
        let relay = NotificationRelay::spawn(messenger.clone(), 4);

        for name in ["a.mp4", "b.mp4", "c.mp4"] {
            relay.enqueue(RelayItem::media(name, "x")).await;
        }
        let report = relay.drain().await;

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, vec![PathBuf::from("b.mp4")]);
        assert_eq!(messenger.names().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_relay_drains() {
        let relay = NotificationRelay::spawn(Arc::new(RecordingMessenger::default()), 0);
        assert_eq!(relay.drain().await, RelayReport::default());
    }
}
