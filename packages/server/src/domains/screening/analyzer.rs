//! HTTP client for the PII NLP analyzer service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{PiiFinding, PiiResult};

/// The analyzer seam: the gate only depends on this contract.
#[async_trait]
pub trait PiiAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str, blocked_entity_types: Option<&[String]>)
        -> Result<PiiResult>;
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked_entity_types: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct AnalyzeEntity {
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default)]
    text: String,
    score: f64,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    has_pii: bool,
    entities: Vec<AnalyzeEntity>,
}

/// `POST /analyze` client with a caller-enforced bounded wait.
///
/// A slow analyzer must not stall the pipeline past the configured
/// timeout; the transport error that results is the fail-open path.
pub struct AnalyzerClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl AnalyzerClient {
    pub fn new(base_url: String) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(5))
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl PiiAnalyzer for AnalyzerClient {
    async fn analyze(
        &self,
        text: &str,
        blocked_entity_types: Option<&[String]>,
    ) -> Result<PiiResult> {
        let request = AnalyzeRequest {
            text,
            blocked_entity_types,
        };

        let send = async {
            let resp = self
                .client
                .post(format!("{}/analyze", self.base_url))
                .json(&request)
                .send()
                .await
                .context("analyzer request failed")?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("analyzer error ({status}): {body}");
            }

            resp.json::<AnalyzeResponse>()
                .await
                .context("failed to parse analyzer response")
        };

        let parsed = tokio::time::timeout(self.timeout, send)
            .await
            .context("analyzer timed out")??;

        Ok(PiiResult {
            has_pii: parsed.has_pii,
            findings: parsed
                .entities
                .into_iter()
                .map(|e| PiiFinding {
                    entity_type: e.entity_type,
                    matched_text: e.text,
                    score: e.score,
                })
                .collect(),
        })
    }
}
