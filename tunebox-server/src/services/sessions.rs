//! Server-side session store
//!
//! Maps an opaque token (handed to the client in a cookie) to the user id
//! established at login. Held in memory only; a restart logs everyone out.
//! Sessions expire after sitting idle longer than the configured timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use tunebox_common::db::UserId;
use uuid::Uuid;

/// Per-request session identity, passed explicitly into every call that
/// needs to know who is asking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Token presented by the client, if any (may be stale)
    pub token: Option<Uuid>,
    /// User bound to the token; `None` means unauthenticated
    pub user_id: Option<UserId>,
}

impl SessionIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    user_id: UserId,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Bind a fresh token to `user_id`, dropping `previous` if given
    ///
    /// Expired sessions are pruned here as well.
    pub async fn establish(&self, user_id: UserId, previous: Option<Uuid>) -> Uuid {
        let token = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(previous) = previous {
            sessions.remove(&previous);
        }

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "Pruned expired sessions");
        }

        sessions.insert(
            token,
            SessionEntry {
                user_id,
                last_seen: now,
            },
        );
        token
    }

    /// Look up the identity behind a presented token
    ///
    /// A live session has its idle clock reset; an expired one is removed
    /// and resolves as unauthenticated.
    pub async fn resolve(&self, token: Uuid) -> SessionIdentity {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let user_id = match sessions.get_mut(&token) {
            Some(entry) if now.duration_since(entry.last_seen) <= self.idle_timeout => {
                entry.last_seen = now;
                Some(entry.user_id)
            }
            Some(_) => {
                sessions.remove(&token);
                debug!("Session expired");
                None
            }
            None => None,
        };

        SessionIdentity {
            token: Some(token),
            user_id,
        }
    }

    /// Remove a token; returns false if it was not active
    pub async fn clear(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
