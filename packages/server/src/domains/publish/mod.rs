//! Uniform publishing contract over two structurally different platform
//! protocols.
//!
//! A `post` call either fully succeeds or surfaces one publish error for
//! that platform; cross-platform partial success lives in the draft
//! review loop, never inside a single adapter call.

pub mod bluesky;
pub mod mastodon;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

pub use bluesky::BlueskyPublisher;
pub use mastodon::MastodonPublisher;

/// Page/editor context for alt-text and link substitution.
///
/// Independent from whatever enrichment already happened to the post text.
#[derive(Debug, Clone)]
pub struct PostMetadata {
    pub page: String,
    pub editor: String,
    pub page_url: Option<String>,
    pub user_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostRequest {
    pub text: String,
    pub screenshot_path: PathBuf,
    pub metadata: PostMetadata,
}

/// Where the published post ended up, when the platform reports it.
#[derive(Debug, Clone)]
pub struct PostReceipt {
    pub platform: &'static str,
    pub url: Option<String>,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Publish one post: media upload always precedes the post/status call.
    async fn post(&self, req: &PostRequest) -> Result<PostReceipt>;
}
