use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials for `com.atproto.server.createSession`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInput {
    pub identifier: String,
    pub password: String,
}

/// An authenticated session returned by the PDS.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(rename = "accessJwt")]
    pub access_jwt: String,
    #[serde(rename = "refreshJwt")]
    pub refresh_jwt: String,
    pub did: String,
    pub handle: String,
}

/// Response wrapper for `com.atproto.repo.uploadBlob`.
///
/// The blob reference is kept as an opaque JSON value: the server hands it
/// back verbatim inside the post embed and its internal shape is not ours
/// to interpret.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadBlobResponse {
    pub blob: serde_json::Value,
}

/// A byte-range link annotation over post text.
///
/// Offsets are UTF-8 byte positions, which is how the protocol addresses
/// post text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

impl Facet {
    /// Build a single-feature link facet for `[byte_start, byte_end)`.
    pub fn link(byte_start: usize, byte_end: usize, uri: impl Into<String>) -> Self {
        Self {
            index: ByteSlice {
                byte_start,
                byte_end,
            },
            features: vec![FacetFeature::Link { uri: uri.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ByteSlice {
    #[serde(rename = "byteStart")]
    pub byte_start: usize,
    #[serde(rename = "byteEnd")]
    pub byte_end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
}

/// An image attached to a post, referencing a previously uploaded blob.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedImage {
    pub image: serde_json::Value,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedImages {
    #[serde(rename = "$type")]
    pub embed_type: String,
    pub images: Vec<EmbedImage>,
}

impl EmbedImages {
    pub fn new(images: Vec<EmbedImage>) -> Self {
        Self {
            embed_type: "app.bsky.embed.images".to_string(),
            images,
        }
    }
}

/// The post record submitted via `com.atproto.repo.createRecord`.
#[derive(Debug, Clone, Serialize)]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub record_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedImages>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRecordRequest {
    pub repo: String,
    pub collection: String,
    pub record: PostRecord,
}

/// Reference to a created record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordResponse {
    pub uri: String,
    pub cid: String,
}

/// A direct-message conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct Convo {
    pub id: String,
    #[serde(default)]
    pub members: Vec<ConvoMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvoMember {
    pub did: String,
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListConvosResponse {
    pub convos: Vec<Convo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageInput {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    #[serde(rename = "convoId")]
    pub convo_id: String,
    pub message: MessageInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageView {
    pub id: String,
}
