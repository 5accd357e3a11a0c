//! Rich-text platform adapter: facets, blob embed, timestamped record.

use anyhow::{Context, Result};
use async_trait::async_trait;
use atproto::{AtprotoClient, EmbedImage, EmbedImages, Facet, PostRecord};
use chrono::Utc;

use crate::domains::status::build_facets;

use super::{PostReceipt, PostRequest, Publisher};

pub const PLATFORM: &str = "bluesky";

pub struct BlueskyPublisher {
    service: String,
    identifier: String,
    password: String,
}

impl BlueskyPublisher {
    pub fn new(service: String, identifier: String, password: String) -> Self {
        Self {
            service,
            identifier,
            password,
        }
    }
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    /// authenticate -> upload blob -> build facets -> create post.
    ///
    /// The three calls are not transactional: a failure after a successful
    /// upload leaves an orphaned, unattached media object behind.
    async fn post(&self, req: &PostRequest) -> Result<PostReceipt> {
        let mut client = AtprotoClient::new(self.service.clone());
        client
            .create_session(&self.identifier, &self.password)
            .await
            .context("authentication failed")?;

        let bytes = tokio::fs::read(&req.screenshot_path)
            .await
            .with_context(|| format!("failed to read {}", req.screenshot_path.display()))?;
        let blob = client
            .upload_blob(bytes, "image/png")
            .await
            .context("screenshot upload failed")?;

        let meta = &req.metadata;
        let facets: Vec<Facet> = build_facets(
            &req.text,
            &meta.page,
            &meta.editor,
            meta.page_url.as_deref(),
            meta.user_url.as_deref(),
        )
        .into_iter()
        .map(|f| Facet::link(f.byte_start, f.byte_end, f.uri))
        .collect();

        let record = PostRecord {
            record_type: "app.bsky.feed.post".to_string(),
            text: req.text.clone(),
            facets,
            embed: Some(EmbedImages::new(vec![EmbedImage {
                image: blob,
                alt: format!("Screenshot of the edit to {}", meta.page),
            }])),
            created_at: Utc::now(),
        };

        let created = client.create_post(record).await.context("post failed")?;
        tracing::info!(uri = %created.uri, "published to bluesky");

        Ok(PostReceipt {
            platform: PLATFORM,
            url: Some(created.uri),
        })
    }
}
