//! Bounded event dispatch.
//!
//! The upstream source delivers events one at a time; workers process
//! them concurrently up to a configured maximum so an event burst cannot
//! spawn an unbounded number of screenshot/browser processes. A full
//! queue applies backpressure to the source.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::common::EditEvent;
use crate::kernel::pipeline::Pipeline;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum events in flight at once.
    pub max_concurrency: usize,
    /// Queued events before `dispatch` blocks the source.
    pub queue_depth: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            queue_depth: 64,
        }
    }
}

pub struct EventDispatcher {
    tx: mpsc::Sender<EditEvent>,
    workers: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl EventDispatcher {
    /// Start the worker pool.
    pub fn spawn(pipeline: Arc<Pipeline>, config: DispatcherConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();

        let workers = (0..config.max_concurrency.max(1))
            .map(|worker_id| {
                let pipeline = pipeline.clone();
                let rx = rx.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    worker_loop(worker_id, pipeline, rx, cancel).await;
                })
            })
            .collect();

        Self {
            tx,
            workers,
            cancel,
        }
    }

    /// Enqueue one event; waits when the queue is full.
    pub async fn dispatch(&self, event: EditEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow!("dispatcher is shut down"))
    }

    /// Stop accepting events, drain the queue, and wait for workers.
    pub async fn shutdown(self) {
        drop(self.tx);
        for worker in self.workers {
            let _ = worker.await;
        }
        tracing::info!("event dispatcher stopped");
    }

    /// Abandon queued events and stop workers at the next opportunity.
    pub fn abort(&self) {
        self.cancel.cancel();
    }
}

async fn worker_loop(
    worker_id: usize,
    pipeline: Arc<Pipeline>,
    rx: Arc<Mutex<mpsc::Receiver<EditEvent>>>,
    cancel: CancellationToken,
) {
    tracing::debug!(worker_id, "dispatch worker started");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = async { rx.lock().await.recv().await } => match event {
                Some(event) => event,
                None => break,
            },
        };
        pipeline.handle_event(event).await;
    }
    tracing::debug!(worker_id, "dispatch worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::StatusDraft;
    use crate::domains::publish::{PostReceipt, PostRequest, Publisher};
    use crate::domains::screening::{Screen, ScreenOutcome};
    use crate::kernel::geo::StaticGeoLookup;
    use crate::kernel::screenshot::Screenshotter;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct AlwaysSafe;

    #[async_trait]
    impl Screen for AlwaysSafe {
        async fn screen(&self, _e: &EditEvent, _s: &StatusDraft) -> ScreenOutcome {
            ScreenOutcome {
                safe: true,
                reason: None,
                pii: None,
                draft_id: None,
            }
        }
    }

    struct TempShots {
        dir: PathBuf,
    }

    #[async_trait]
    impl Screenshotter for TempShots {
        async fn capture(&self, _url: &str) -> Option<PathBuf> {
            let path = self.dir.join(format!("{}.png", uuid::Uuid::new_v4()));
            tokio::fs::write(&path, b"png").await.ok()?;
            Some(path)
        }
    }

    /// Publisher that records the peak number of concurrent `post` calls.
    struct GaugePublisher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        total: AtomicUsize,
    }

    #[async_trait]
    impl Publisher for GaugePublisher {
        fn name(&self) -> &'static str {
            "gauge"
        }

        async fn post(&self, _req: &PostRequest) -> anyhow::Result<PostReceipt> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.total.fetch_add(1, Ordering::SeqCst);
            Ok(PostReceipt {
                platform: "gauge",
                url: None,
            })
        }
    }

    fn event(n: usize) -> EditEvent {
        EditEvent {
            page: format!("Page {n}"),
            editor: "Bar".into(),
            source_url: "https://en.site.org/w/index.php?diff=1".into(),
            site: "en.site.org".into(),
        }
    }

    #[tokio::test]
    async fn processes_everything_within_the_concurrency_cap() {
        let tmp = tempfile::tempdir().unwrap();
        let publisher = Arc::new(GaugePublisher {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        });

        let pipeline = Arc::new(Pipeline::new(
            "{{page}}".into(),
            Arc::new(StaticGeoLookup::empty()),
            Arc::new(AlwaysSafe),
            vec![publisher.clone()],
            Arc::new(TempShots {
                dir: tmp.path().to_path_buf(),
            }),
            None,
        ));

        let dispatcher = EventDispatcher::spawn(
            pipeline,
            DispatcherConfig {
                max_concurrency: 2,
                queue_depth: 16,
            },
        );

        for n in 0..6 {
            dispatcher.dispatch(event(n)).await.unwrap();
        }
        dispatcher.shutdown().await;

        assert_eq!(publisher.total.load(Ordering::SeqCst), 6);
        assert!(publisher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn abort_stops_workers_without_draining() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Arc::new(Pipeline::new(
            "{{page}}".into(),
            Arc::new(StaticGeoLookup::empty()),
            Arc::new(AlwaysSafe),
            vec![],
            Arc::new(TempShots {
                dir: tmp.path().to_path_buf(),
            }),
            None,
        ));

        let dispatcher = EventDispatcher::spawn(pipeline, DispatcherConfig::default());
        dispatcher.abort();
        dispatcher.shutdown().await;
    }
}
