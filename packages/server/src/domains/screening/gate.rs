//! The allow/block decision and its block-side bookkeeping.

use std::sync::Arc;

use chrono::Utc;

use crate::common::{EditEvent, PiiResult, StatusDraft};
use crate::domains::drafts::{DraftStore, NewDraft};
use crate::kernel::alerts::AlertSender;

use super::analyzer::PiiAnalyzer;
use super::audit::{AuditEntry, AuditLog};
use super::extract::extract_diff_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Nothing reviewable could be extracted from the diff (fail-closed).
    ExtractionFailure,
    /// The analyzer reported PII in the extracted text.
    PiiDetected,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::ExtractionFailure => "extraction failure",
            BlockReason::PiiDetected => "pii detected",
        }
    }
}

/// One decision per event; never re-evaluated.
#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    pub safe: bool,
    pub reason: Option<BlockReason>,
    pub pii: Option<PiiResult>,
    /// Id of the draft persisted for a PII block.
    pub draft_id: Option<String>,
}

impl ScreenOutcome {
    fn allowed() -> Self {
        Self {
            safe: true,
            reason: None,
            pii: None,
            draft_id: None,
        }
    }

    fn blocked(reason: BlockReason) -> Self {
        Self {
            safe: false,
            reason: Some(reason),
            pii: None,
            draft_id: None,
        }
    }
}

/// Screening seam for the pipeline.
#[async_trait::async_trait]
pub trait Screen: Send + Sync {
    async fn screen(&self, event: &EditEvent, status: &StatusDraft) -> ScreenOutcome;
}

#[async_trait::async_trait]
impl Screen for ScreeningGate {
    async fn screen(&self, event: &EditEvent, status: &StatusDraft) -> ScreenOutcome {
        ScreeningGate::screen(self, event, status).await
    }
}

/// The screening gate: fetch, extract, analyze, decide, record.
pub struct ScreeningGate {
    http: reqwest::Client,
    analyzer: Arc<dyn PiiAnalyzer>,
    blocked_entity_types: Option<Vec<String>>,
    drafts: DraftStore,
    audit: AuditLog,
    alerts: Arc<dyn AlertSender>,
    alert_handles: Vec<String>,
}

impl ScreeningGate {
    pub fn new(
        user_agent: &str,
        analyzer: Arc<dyn PiiAnalyzer>,
        blocked_entity_types: Option<Vec<String>>,
        drafts: DraftStore,
        audit: AuditLog,
        alerts: Arc<dyn AlertSender>,
        alert_handles: Vec<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            http,
            analyzer,
            blocked_entity_types,
            drafts,
            audit,
            alerts,
            alert_handles,
        })
    }

    /// Screen one event end to end. Callers must not publish when the
    /// outcome is not safe.
    pub async fn screen(&self, event: &EditEvent, status: &StatusDraft) -> ScreenOutcome {
        let markup = match self.fetch_diff(&event.source_url).await {
            Ok(markup) => markup,
            Err(e) => {
                // Content we cannot fetch is content we cannot review.
                tracing::warn!(diff_url = %event.source_url, error = %e, "diff fetch failed, blocking");
                return ScreenOutcome::blocked(BlockReason::ExtractionFailure);
            }
        };

        self.screen_markup(event, status, &markup).await
    }

    /// Decision and block-side effects over already-fetched markup.
    pub async fn screen_markup(
        &self,
        event: &EditEvent,
        status: &StatusDraft,
        markup: &str,
    ) -> ScreenOutcome {
        let text = extract_diff_text(markup);
        if text.is_empty() {
            tracing::info!(page = %event.page, "extraction produced no text, blocking");
            return ScreenOutcome::blocked(BlockReason::ExtractionFailure);
        }

        let pii = match self
            .analyzer
            .analyze(&text, self.blocked_entity_types.as_deref())
            .await
        {
            Ok(pii) => pii,
            Err(e) => {
                // Availability problem, not a content problem: fail open.
                tracing::warn!(page = %event.page, error = %e, "analyzer unavailable, allowing");
                return ScreenOutcome::allowed();
            }
        };

        if !pii.has_pii {
            return ScreenOutcome::allowed();
        }

        let draft_id = self.record_block(event, status, &pii).await;
        ScreenOutcome {
            safe: false,
            reason: Some(BlockReason::PiiDetected),
            pii: Some(pii),
            draft_id,
        }
    }

    /// Persist the draft, append the audit line, and alert every channel.
    ///
    /// Each step is best-effort and isolated; an alert failure never
    /// escalates past its own log line.
    async fn record_block(
        &self,
        event: &EditEvent,
        status: &StatusDraft,
        pii: &PiiResult,
    ) -> Option<String> {
        let pii_types = pii.entity_types();
        let max_score = pii.max_score();

        let draft_id = match self
            .drafts
            .create(NewDraft {
                text: status.text.clone(),
                diff_url: event.source_url.clone(),
                article: event.page.clone(),
                editor: event.editor.clone(),
                pii_types: pii_types.clone(),
                max_score,
                page_url: status.page_url.clone(),
                user_url: status.user_url.clone(),
                screenshot: None,
            })
            .await
        {
            Ok(record) => {
                tracing::info!(draft_id = %record.id, page = %event.page, "blocked edit saved for review");
                Some(record.id)
            }
            Err(e) => {
                tracing::error!(page = %event.page, error = %e, "failed to persist blocked draft");
                None
            }
        };

        let entry = AuditEntry {
            timestamp: Utc::now(),
            site: event.site.clone(),
            page: event.page.clone(),
            editor: event.editor.clone(),
            diff_url: event.source_url.clone(),
            pii_types: pii_types.clone(),
            max_score,
        };
        if let Err(e) = self.audit.append(&entry).await {
            tracing::error!(page = %event.page, error = %e, "failed to append audit line");
        }

        let message = format!(
            "Blocked an edit to \"{}\" by {} ({}, max score {:.2}). Review it in the admin panel.",
            event.page,
            event.editor,
            pii_types.join(", "),
            max_score,
        );
        for handle in &self.alert_handles {
            if let Err(e) = self.alerts.send_dm(handle, &message).await {
                tracing::warn!(recipient = %handle, error = %e, "alert delivery failed");
            }
        }

        draft_id
    }

    async fn fetch_diff(&self, diff_url: &str) -> anyhow::Result<String> {
        let resp = self.http.get(diff_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("diff fetch returned {status}");
        }
        Ok(resp.text().await?)
    }
}
