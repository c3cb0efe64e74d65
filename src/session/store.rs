use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::session::state::{Session, SessionKey};

/// Shared handle to one session. The lock is held for a whole command, render included.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Key-to-session map owned by the engine.
///
/// The outer lock only guards membership; per-session work happens under the session's own
/// FIFO mutex so unrelated keys never wait on each other.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, SessionHandle>>,
}

impl SessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `key`, creating it with `init` if absent.
    pub async fn get_or_create(
        &self,
        key: &SessionKey,
        init: impl FnOnce() -> Session,
    ) -> SessionHandle {
        {
            let sessions = self.sessions.read().await;
            if let Some(s) = sessions.get(key) {
                return s.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        // Another task may have created it between the two locks.
        if let Some(s) = sessions.get(key) {
            return s.clone();
        }
        let handle = Arc::new(Mutex::new(init()));
        sessions.insert(key.clone(), handle.clone());
        tracing::debug!(%key, "session created");
        handle
    }

    /// Existing session for `key`.
    pub async fn get(&self, key: &SessionKey) -> Option<SessionHandle> {
        self.sessions.read().await.get(key).cloned()
    }

    /// Drop the session for `key`. In-flight commands holding the handle finish on the detached
    /// session.
    pub async fn remove(&self, key: &SessionKey) -> bool {
        let removed = self.sessions.write().await.remove(key).is_some();
        if removed {
            tracing::debug!(%key, "session removed");
        }
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Keys of all live sessions, sorted.
    pub async fn keys(&self) -> Vec<SessionKey> {
        let mut keys: Vec<_> = self.sessions.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/store.rs"]
mod tests;
