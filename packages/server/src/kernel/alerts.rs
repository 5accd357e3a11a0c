//! Direct-message alert delivery.
//!
//! Used for block notifications and for admin login codes. Delivery is
//! best-effort at the call sites: each recipient's failure is caught and
//! logged independently and never escalates.

use anyhow::{Context, Result};
use async_trait::async_trait;
use atproto::AtprotoClient;

#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn send_dm(&self, recipient: &str, text: &str) -> Result<()>;
}

/// DM delivery over the rich-text platform's chat sub-API.
///
/// Authenticates per send; no session is cached between alerts.
pub struct BlueskyAlerts {
    service: String,
    identifier: String,
    password: String,
}

impl BlueskyAlerts {
    pub fn new(service: String, identifier: String, password: String) -> Self {
        Self {
            service,
            identifier,
            password,
        }
    }
}

#[async_trait]
impl AlertSender for BlueskyAlerts {
    async fn send_dm(&self, recipient: &str, text: &str) -> Result<()> {
        let mut client = AtprotoClient::new(self.service.clone());
        client
            .create_session(&self.identifier, &self.password)
            .await
            .context("alert session creation failed")?;

        client
            .send_message_to(recipient, text)
            .await
            .with_context(|| format!("failed to DM {recipient}"))?;

        tracing::debug!(recipient, "alert delivered");
        Ok(())
    }
}
