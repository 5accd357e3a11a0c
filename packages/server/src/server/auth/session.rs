use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token (random UUID)
pub type SessionToken = String;

#[derive(Clone, Debug)]
pub struct Session {
    pub token: SessionToken,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// In-memory session store.
///
/// Process-lifetime state: a restart invalidates every session, which is
/// accepted for this system's threat model. Sessions expire after 24
/// hours and are swept periodically.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(24))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Mint a new session and return it.
    pub async fn create_session(&self) -> Session {
        let created = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            created,
            expires: created + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// True when the token names a live session. Expired sessions are
    /// evicted on the spot.
    pub async fn validate(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some(session) if session.expires > Utc::now() => true,
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }

    /// Clean up expired sessions (run periodically)
    pub async fn cleanup_expired(&self) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.expires > now);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
