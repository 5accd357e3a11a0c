//! Minimal AT Protocol (XRPC) client.
//!
//! Covers the calls the mirror service needs: session creation, blob
//! upload, post creation with rich-text facets and image embeds, and the
//! chat sub-API for direct messages.
//!
//! # Example
//!
//! ```rust,ignore
//! use atproto::AtprotoClient;
//!
//! let mut client = AtprotoClient::new("https://bsky.social".into());
//! client.create_session("bot.example.com", "app-password").await?;
//!
//! let blob = client.upload_blob(bytes, "image/png").await?;
//! let post = client.create_post(record).await?;
//! println!("posted {}", post.uri);
//! ```

pub mod error;
pub mod types;

pub use error::{AtprotoError, Result};
pub use types::{
    Convo, CreateRecordResponse, EmbedImage, EmbedImages, Facet, MessageView, PostRecord, Session,
};

use types::{
    CreateRecordRequest, ListConvosResponse, MessageInput, SendMessageRequest, SessionInput,
    UploadBlobResponse,
};

/// Service proxy header value routing chat calls to the DM service.
const CHAT_PROXY: &str = "did:web:api.bsky.chat#bsky_chat";

const POST_COLLECTION: &str = "app.bsky.feed.post";

pub struct AtprotoClient {
    client: reqwest::Client,
    service: String,
    session: Option<Session>,
}

impl AtprotoClient {
    /// Create an unauthenticated client for the given PDS base URL.
    pub fn new(service: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            service: service.trim_end_matches('/').to_string(),
            session: None,
        }
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service, method)
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(AtprotoError::NotAuthenticated)
    }

    /// Exchange credentials for a short-lived access token.
    pub async fn create_session(&mut self, identifier: &str, password: &str) -> Result<&Session> {
        let input = SessionInput {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };

        let resp = self
            .client
            .post(self.xrpc("com.atproto.server.createSession"))
            .json(&input)
            .send()
            .await?;

        let session: Session = check(resp).await?.json().await?;
        tracing::debug!(handle = %session.handle, "session created");
        self.session = Some(session);
        Ok(self.session.as_ref().expect("session just set"))
    }

    /// Upload raw bytes and obtain an opaque blob reference.
    pub async fn upload_blob(&self, bytes: Vec<u8>, mime: &str) -> Result<serde_json::Value> {
        let session = self.session()?;

        let resp = self
            .client
            .post(self.xrpc("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_jwt)
            .header("Content-Type", mime)
            .body(bytes)
            .send()
            .await?;

        let parsed: UploadBlobResponse = check(resp).await?.json().await?;
        Ok(parsed.blob)
    }

    /// Submit a post record to the authenticated account's repo.
    pub async fn create_post(&self, record: PostRecord) -> Result<CreateRecordResponse> {
        let session = self.session()?;

        let request = CreateRecordRequest {
            repo: session.did.clone(),
            collection: POST_COLLECTION.to_string(),
            record,
        };

        let resp = self
            .client
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&request)
            .send()
            .await?;

        let created: CreateRecordResponse = check(resp).await?.json().await?;
        Ok(created)
    }

    /// List the account's direct-message conversations.
    pub async fn list_convos(&self) -> Result<Vec<Convo>> {
        let session = self.session()?;

        let resp = self
            .client
            .get(self.xrpc("chat.bsky.convo.listConvos"))
            .bearer_auth(&session.access_jwt)
            .header("Atproto-Proxy", CHAT_PROXY)
            .send()
            .await?;

        let parsed: ListConvosResponse = check(resp).await?.json().await?;
        Ok(parsed.convos)
    }

    /// Send a direct message into an existing conversation.
    pub async fn send_message(&self, convo_id: &str, text: &str) -> Result<MessageView> {
        let session = self.session()?;

        let request = SendMessageRequest {
            convo_id: convo_id.to_string(),
            message: MessageInput {
                text: text.to_string(),
            },
        };

        let resp = self
            .client
            .post(self.xrpc("chat.bsky.convo.sendMessage"))
            .bearer_auth(&session.access_jwt)
            .header("Atproto-Proxy", CHAT_PROXY)
            .json(&request)
            .send()
            .await?;

        let sent: MessageView = check(resp).await?.json().await?;
        Ok(sent)
    }

    /// Find the conversation whose other member matches `handle`, then send.
    ///
    /// Convenience for alert delivery: the service configures alert targets
    /// by handle, not by conversation id.
    pub async fn send_message_to(&self, handle: &str, text: &str) -> Result<MessageView> {
        let convos = self.list_convos().await?;
        let convo = convos
            .into_iter()
            .find(|c| c.members.iter().any(|m| m.handle == handle))
            .ok_or_else(|| AtprotoError::ConvoNotFound(handle.to_string()))?;

        self.send_message(&convo.id, text).await
    }
}

/// Translate non-2xx responses into typed API errors.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AtprotoError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn facet_serializes_with_byte_offsets() {
        let facet = Facet::link(4, 10, "https://example.com");
        let json = serde_json::to_value(&facet).unwrap();

        assert_eq!(json["index"]["byteStart"], 4);
        assert_eq!(json["index"]["byteEnd"], 10);
        assert_eq!(
            json["features"][0]["$type"],
            "app.bsky.richtext.facet#link"
        );
        assert_eq!(json["features"][0]["uri"], "https://example.com");
    }

    #[test]
    fn post_record_omits_empty_facets_and_embed() {
        let record = PostRecord {
            record_type: "app.bsky.feed.post".to_string(),
            text: "hello".to_string(),
            facets: Vec::new(),
            embed: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("facets").is_none());
        assert!(json.get("embed").is_none());
        assert_eq!(json["$type"], "app.bsky.feed.post");
    }

    #[test]
    fn calls_require_session() {
        let client = AtprotoClient::new("https://pds.example".into());
        assert!(matches!(
            client.session(),
            Err(AtprotoError::NotAuthenticated)
        ));
    }
}
