use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct LoginCode {
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
}

/// Single-use login codes delivered out-of-band.
///
/// Issuing a new code does not invalidate a previously issued one; each
/// code remains valid until consumed or until its own TTL lapses.
pub struct LoginCodeStore {
    codes: Arc<RwLock<HashMap<String, LoginCode>>>,
    ttl: Duration,
}

impl LoginCodeStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(10))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Generate and store a cryptographically random 6-digit code.
    pub async fn issue(&self) -> String {
        let code = format!("{:06}", OsRng.gen_range(0..1_000_000u32));
        let created = Utc::now();

        let mut codes = self.codes.write().await;
        codes.insert(
            code.clone(),
            LoginCode {
                created,
                expires: created + self.ttl,
            },
        );
        code
    }

    /// Consume a code: valid exactly once. The read-then-delete happens
    /// under one write lock, so a replayed code cannot race its way in.
    pub async fn consume(&self, code: &str) -> bool {
        let mut codes = self.codes.write().await;
        match codes.remove(code) {
            Some(entry) if entry.expires > Utc::now() => true,
            Some(entry) => {
                tracing::debug!(issued_at = %entry.created, "expired login code presented");
                false
            }
            None => false,
        }
    }

    /// Clean up expired codes (run periodically)
    pub async fn cleanup_expired(&self) {
        let now = Utc::now();
        let mut codes = self.codes.write().await;
        codes.retain(|_, code| code.expires > now);
    }
}

impl Default for LoginCodeStore {
    fn default() -> Self {
        Self::new()
    }
}
