use serde::{Deserialize, Serialize};

/// A media attachment accepted by the instance.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaAttachment {
    pub id: String,
    pub url: Option<String>,
}

/// Form body for `POST /api/v1/statuses`.
#[derive(Debug, Clone, Serialize)]
pub struct NewStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_ids: Vec<String>,
}

/// A published status.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    pub url: Option<String>,
}
