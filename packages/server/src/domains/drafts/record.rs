use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted, blocked candidate post awaiting human review.
///
/// `posted_to` is monotonically non-decreasing: it only ever grows, one
/// platform at a time, on successful publish. The record is deleted only
/// once `posted_to` covers every configured platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    /// Creation-timestamp derived id (millisecond epoch).
    pub id: String,
    pub text: String,
    pub diff_url: String,
    pub article: String,
    pub editor: String,
    /// Distinct analyzer entity types that triggered the block.
    pub pii_types: Vec<String>,
    /// Highest analyzer confidence across findings.
    pub max_score: f64,
    pub page_url: Option<String>,
    pub user_url: Option<String>,
    /// Latest screenshot filename under the screenshot directory, if any.
    pub screenshot: Option<String>,
    #[serde(default)]
    pub posted_to: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DraftRecord {
    /// True once every platform in `configured` has been posted to.
    pub fn is_fully_posted(&self, configured: &[String]) -> bool {
        configured.iter().all(|p| self.posted_to.contains(p))
    }
}

/// Fields captured at block time; the store assigns id and created-at.
#[derive(Debug, Clone)]
pub struct NewDraft {
    pub text: String,
    pub diff_url: String,
    pub article: String,
    pub editor: String,
    pub pii_types: Vec<String>,
    pub max_score: f64,
    pub page_url: Option<String>,
    pub user_url: Option<String>,
    pub screenshot: Option<String>,
}
