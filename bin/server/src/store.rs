//! In-process registry of session states, keyed by session cookie.
//!
//! Sessions unused for longer than the idle timeout are forgotten, either
//! when next looked up or by [`SessionStore::delete_expired`].

use portico_core::SessionKey;
use portico_session::SessionState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// State of one session. Requests of the same session are serialized on
/// the mutex.
pub type SharedSession = Arc<Mutex<SessionState>>;

#[derive(Debug)]
struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

impl Entry {
    fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.last_seen.elapsed() >= idle_timeout
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, Entry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Returns the session and marks it as used.
    pub async fn get(&self, key: &SessionKey) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(key)?;
        if entry.is_expired(self.idle_timeout) {
            sessions.remove(key);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Registers a new session and returns its key.
    pub async fn insert(&self, state: SessionState) -> (SessionKey, SharedSession) {
        let key = SessionKey::new();
        let session = Arc::new(Mutex::new(state));
        self.sessions.write().await.insert(
            key,
            Entry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        (key, session)
    }

    pub async fn remove(&self, key: &SessionKey) -> Option<SharedSession> {
        self.sessions
            .write()
            .await
            .remove(key)
            .map(|entry| entry.session)
    }

    /// Forgets every session idle for at least the idle timeout and returns
    /// how many were dropped.
    pub async fn delete_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.idle_timeout));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_session::{HostingMode, SessionConfig};

    fn state() -> SessionState {
        let config = SessionConfig::builder(
            "https://cas.example.edu/cas/logout?service=%s",
            "1.0.0",
            "https://www.example.edu",
        )
        .build()
        .expect("valid config");
        SessionState::new(HostingMode::Standalone, &config)
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn insert_then_get_returns_same_session() {
        let store = SessionStore::new(HOUR);
        let (key, session) = store.insert(state()).await;

        session
            .lock()
            .await
            .set_action(Some("grades".to_string()));

        let found = store.get(&key).await.expect("registered");
        assert_eq!(found.lock().await.action(), Some("grades"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sessions_get_distinct_keys() {
        let store = SessionStore::new(HOUR);
        let (first, _) = store.insert(state()).await;
        let (second, _) = store.insert(state()).await;

        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn remove_forgets_session() {
        let store = SessionStore::new(HOUR);
        let (key, _) = store.insert(state()).await;

        assert!(store.remove(&key).await.is_some());
        assert!(store.get(&key).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_expired_drops_idle_sessions() {
        let store = SessionStore::new(Duration::ZERO);
        store.insert(state()).await;
        store.insert(state()).await;

        assert_eq!(store.delete_expired().await, 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_expired_keeps_recent_sessions() {
        let store = SessionStore::new(HOUR);
        let (key, _) = store.insert(state()).await;

        assert_eq!(store.delete_expired().await, 0);
        assert!(store.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn expired_session_is_not_returned() {
        let store = SessionStore::new(Duration::ZERO);
        let (key, _) = store.insert(state()).await;

        assert!(store.get(&key).await.is_none());
        assert!(store.is_empty().await);
    }
}
