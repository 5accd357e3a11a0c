//! Minimal Mastodon REST API client.
//!
//! Authenticates with a static long-lived access token. Covers media upload
//! (multipart, with an accessibility description) and status creation,
//! which is all the mirror service needs.
//!
//! # Example
//!
//! ```rust,ignore
//! use mastodon::MastodonClient;
//!
//! let client = MastodonClient::new("https://mastodon.example".into(), token);
//! let media = client.upload_media(bytes, "edit.png", "Screenshot of the edit").await?;
//! let status = client.create_status("Page edited", vec![media.id]).await?;
//! println!("posted {}", status.url.unwrap_or_default());
//! ```

pub mod error;
pub mod types;

pub use error::{MastodonError, Result};
pub use types::{MediaAttachment, Status};

use types::NewStatus;

pub struct MastodonClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MastodonClient {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// Upload media bytes with a description, returning the attachment id.
    pub async fn upload_media(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        description: &str,
    ) -> Result<MediaAttachment> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("image/png")?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("description", description.to_string());

        let resp = self
            .client
            .post(format!("{}/api/v2/media", self.base_url))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await?;

        let media: MediaAttachment = check(resp).await?.json().await?;
        tracing::debug!(media_id = %media.id, "media uploaded");
        Ok(media)
    }

    /// Publish a status, optionally with previously uploaded media.
    pub async fn create_status(&self, text: &str, media_ids: Vec<String>) -> Result<Status> {
        let body = NewStatus {
            status: text.to_string(),
            media_ids,
        };

        let resp = self
            .client
            .post(format!("{}/api/v1/statuses", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status: Status = check(resp).await?.json().await?;
        Ok(status)
    }
}

/// Translate non-2xx responses into typed API errors.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(MastodonError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}
