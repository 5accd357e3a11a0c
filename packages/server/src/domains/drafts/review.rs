//! Review-driven publishing of blocked drafts.
//!
//! The outer per-platform loop is what achieves cross-platform partial
//! success: each platform's failure is recorded and the rest continue.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::domains::publish::{PostMetadata, PostRequest, Publisher};
use crate::kernel::screenshot::{capture_filename, Screenshotter};

use super::store::DraftStore;

#[derive(Debug, Clone, Serialize)]
pub struct PlatformFailure {
    pub platform: String,
    pub error: String,
}

/// Per-platform detail of one `post` call, surfaced to the admin UI.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub draft_id: String,
    /// Platforms published during this call.
    pub posted: Vec<String>,
    /// Platforms that still need a retry, with their errors.
    pub failed: Vec<PlatformFailure>,
    /// True once every configured platform has been posted to and the
    /// draft record was removed.
    pub deleted: bool,
}

/// Publish a draft to every configured platform not already in
/// `posted_to`.
///
/// A fresh screenshot is captured per attempt; the block-time capture is
/// not retained. On a platform's success the record is persisted before
/// the next platform is attempted, so a later retry only covers what is
/// still missing — at most one successful publish per platform per draft.
///
/// Returns `None` when no such draft exists.
pub async fn post_draft(
    store: &DraftStore,
    publishers: &[Arc<dyn Publisher>],
    screenshots: &dyn Screenshotter,
    id: &str,
) -> Result<Option<ReviewOutcome>> {
    let Some(mut record) = store.get(id).await? else {
        return Ok(None);
    };

    let mut posted = Vec::new();
    let mut failed = Vec::new();

    for publisher in publishers {
        let platform = publisher.name();
        if record.posted_to.iter().any(|p| p == platform) {
            continue;
        }

        let Some(shot_path) = screenshots.capture(&record.diff_url).await else {
            tracing::warn!(draft_id = %record.id, platform, "screenshot capture failed");
            failed.push(PlatformFailure {
                platform: platform.to_string(),
                error: "screenshot capture failed".to_string(),
            });
            continue;
        };

        let request = PostRequest {
            text: record.text.clone(),
            screenshot_path: shot_path.clone(),
            metadata: PostMetadata {
                page: record.article.clone(),
                editor: record.editor.clone(),
                page_url: record.page_url.clone(),
                user_url: record.user_url.clone(),
            },
        };

        match publisher.post(&request).await {
            Ok(receipt) => {
                record.posted_to.push(platform.to_string());

                // Keep the newest capture for the admin preview, reclaim
                // the one it replaces.
                if let Some(old) = record.screenshot.take() {
                    let _ = tokio::fs::remove_file(store.screenshot_path(&old)).await;
                }
                record.screenshot = capture_filename(&shot_path);

                store.update(&record).await?;
                tracing::info!(draft_id = %record.id, platform, url = ?receipt.url, "draft published");
                posted.push(platform.to_string());
            }
            Err(e) => {
                tracing::warn!(draft_id = %record.id, platform, error = %e, "draft publish failed");
                let _ = tokio::fs::remove_file(&shot_path).await;
                failed.push(PlatformFailure {
                    platform: platform.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    let configured: Vec<String> = publishers.iter().map(|p| p.name().to_string()).collect();
    let deleted = if record.is_fully_posted(&configured) {
        store.delete(&record.id).await?
    } else {
        false
    };

    Ok(Some(ReviewOutcome {
        draft_id: record.id,
        posted,
        failed,
        deleted,
    }))
}
