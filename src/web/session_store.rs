// Session store: per-browser SessionContext keyed by the signed session ID.
//
// The store is a trait so a persistent backend could replace the in-memory
// map without touching the handlers. Handlers load a context, run one
// operation on it, and save it back; requests within one session are not
// serialized against each other.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::session::SessionContext;

/// Opaque session key carried in the signed cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Enough to correlate log lines without printing the whole key.
        let short: String = self.0.chars().take(8).collect();
        write!(f, "{short}")
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Context for `id`, or an empty one if the session has no state yet.
    async fn load(&self, id: &SessionId) -> SessionContext;

    /// Replace the stored context for `id`.
    async fn save(&self, id: &SessionId, context: SessionContext);

    /// Forget everything stored for `id`.
    async fn remove(&self, id: &SessionId);
}

struct Entry {
    context: SessionContext,
    last_seen: DateTime<Utc>,
}

/// In-memory session store. Any load or save marks a session as active;
/// sessions idle for longer than `ttl` are purged on the next write.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Entry>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(super::auth::SESSION_TTL_SECS as i64))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> SessionContext {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(entry) if now - entry.last_seen < self.ttl => {
                entry.last_seen = now;
                entry.context.clone()
            }
            _ => SessionContext::default(),
        }
    }

    async fn save(&self, id: &SessionId, context: SessionContext) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_seen < self.ttl);
        if sessions.len() < before {
            debug!(purged = before - sessions.len(), "Purged idle sessions");
        }

        sessions.insert(
            id.clone(),
            Entry {
                context,
                last_seen: now,
            },
        );
    }

    async fn remove(&self, id: &SessionId) {
        self.sessions.write().await.remove(id);
    }
}
