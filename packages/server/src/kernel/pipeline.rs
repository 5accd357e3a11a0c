//! Per-event pipeline: normalize -> enrich -> screen -> publish or block.

use std::sync::Arc;

use crate::common::{EditEvent, StatusDraft};
use crate::domains::publish::{PostMetadata, PostRequest, Publisher};
use crate::domains::screening::Screen;
use crate::domains::status::{build_status, enrich_with_location};
use crate::kernel::geo::GeoLookup;
use crate::kernel::screenshot::Screenshotter;
use crate::kernel::suppress::RepeatSuppressor;

/// Everything one event needs, wired once at startup.
///
/// Blocked drafts persist the already-enriched text, so review-time
/// publishing reuses it as-is and facets are always computed after the
/// last text mutation.
pub struct Pipeline {
    template: String,
    geo: Arc<dyn GeoLookup>,
    gate: Arc<dyn Screen>,
    publishers: Vec<Arc<dyn Publisher>>,
    screenshots: Arc<dyn Screenshotter>,
    suppressor: Option<RepeatSuppressor>,
}

impl Pipeline {
    pub fn new(
        template: String,
        geo: Arc<dyn GeoLookup>,
        gate: Arc<dyn Screen>,
        publishers: Vec<Arc<dyn Publisher>>,
        screenshots: Arc<dyn Screenshotter>,
        suppressor: Option<RepeatSuppressor>,
    ) -> Self {
        Self {
            template,
            geo,
            gate,
            publishers,
            screenshots,
            suppressor,
        }
    }

    /// Process one event to completion. Never returns an error: every
    /// failure mode is either a block decision or a per-platform log line.
    pub async fn handle_event(&self, event: EditEvent) {
        if let Some(suppressor) = &self.suppressor {
            if suppressor.check_and_set(&event) {
                tracing::debug!(page = %event.page, editor = %event.editor, "repeat event suppressed");
                return;
            }
        }

        let status = build_status(&event, &self.template);
        let text = enrich_with_location(&status.text, self.geo.as_ref());
        let status = StatusDraft { text, ..status };

        let outcome = self.gate.screen(&event, &status).await;
        if !outcome.safe {
            tracing::info!(
                page = %event.page,
                reason = outcome.reason.map(|r| r.as_str()).unwrap_or("unknown"),
                "event blocked"
            );
            return;
        }

        self.publish(&event, &status).await;
    }

    /// Fan out to every configured platform; each failure is its own log
    /// line and never stops the others.
    async fn publish(&self, event: &EditEvent, status: &StatusDraft) {
        let Some(shot_path) = self.screenshots.capture(&event.source_url).await else {
            tracing::error!(page = %event.page, "screenshot capture failed, publish aborted");
            return;
        };

        let request = PostRequest {
            text: status.text.clone(),
            screenshot_path: shot_path.clone(),
            metadata: PostMetadata {
                page: status.page.clone(),
                editor: status.editor.clone(),
                page_url: status.page_url.clone(),
                user_url: status.user_url.clone(),
            },
        };

        let attempts = self.publishers.iter().map(|publisher| {
            let request = &request;
            async move { (publisher.name(), publisher.post(request).await) }
        });
        for (platform, result) in futures::future::join_all(attempts).await {
            if let Err(e) = result {
                tracing::error!(platform, page = %event.page, error = %e, "publish failed");
            }
        }

        // Live captures are one-shot; reclaim the file after the fan-out.
        if let Err(e) = tokio::fs::remove_file(&shot_path).await {
            tracing::warn!(path = %shot_path.display(), error = %e, "failed to reclaim capture");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::publish::PostReceipt;
    use crate::domains::screening::{BlockReason, ScreenOutcome};
    use crate::kernel::geo::StaticGeoLookup;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeScreen {
        safe: bool,
    }

    #[async_trait]
    impl Screen for FakeScreen {
        async fn screen(&self, _event: &EditEvent, _status: &StatusDraft) -> ScreenOutcome {
            if self.safe {
                ScreenOutcome {
                    safe: true,
                    reason: None,
                    pii: None,
                    draft_id: None,
                }
            } else {
                ScreenOutcome {
                    safe: false,
                    reason: Some(BlockReason::PiiDetected),
                    pii: None,
                    draft_id: Some("1700000000000".into()),
                }
            }
        }
    }

    struct CountingPublisher {
        platform: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Publisher for CountingPublisher {
        fn name(&self) -> &'static str {
            self.platform
        }

        async fn post(&self, _req: &PostRequest) -> anyhow::Result<PostReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PostReceipt {
                platform: self.platform,
                url: None,
            })
        }
    }

    struct TempShots {
        dir: PathBuf,
        fail: bool,
    }

    #[async_trait]
    impl Screenshotter for TempShots {
        async fn capture(&self, _url: &str) -> Option<PathBuf> {
            if self.fail {
                return None;
            }
            let path = self.dir.join(format!("{}.png", uuid::Uuid::new_v4()));
            tokio::fs::write(&path, b"png").await.ok()?;
            Some(path)
        }
    }

    fn event() -> EditEvent {
        EditEvent {
            page: "Foo".into(),
            editor: "Bar".into(),
            source_url: "https://en.site.org/w/index.php?diff=1".into(),
            site: "en.site.org".into(),
        }
    }

    fn pipeline(
        tmp: &tempfile::TempDir,
        safe: bool,
        shots_fail: bool,
        suppressor: Option<RepeatSuppressor>,
    ) -> (Pipeline, Arc<CountingPublisher>) {
        let publisher = Arc::new(CountingPublisher {
            platform: "bluesky",
            calls: AtomicUsize::new(0),
        });
        let pipeline = Pipeline::new(
            "{{page}} edited by {{name}} {{&url}}".into(),
            Arc::new(StaticGeoLookup::empty()),
            Arc::new(FakeScreen { safe }),
            vec![publisher.clone()],
            Arc::new(TempShots {
                dir: tmp.path().to_path_buf(),
                fail: shots_fail,
            }),
            suppressor,
        );
        (pipeline, publisher)
    }

    #[tokio::test]
    async fn allowed_events_are_published() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, publisher) = pipeline(&tmp, true, false, None);

        pipeline.handle_event(event()).await;
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blocked_events_never_reach_publishers() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, publisher) = pipeline(&tmp, false, false, None);

        pipeline.handle_event(event()).await;
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn capture_failure_aborts_the_publish_attempt() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, publisher) = pipeline(&tmp, true, true, None);

        pipeline.handle_event(event()).await;
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn suppressed_repeats_are_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, publisher) = pipeline(&tmp, true, false, Some(RepeatSuppressor::new()));

        pipeline.handle_event(event()).await;
        pipeline.handle_event(event()).await;
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    }
}
