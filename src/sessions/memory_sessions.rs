use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::{Session, SessionStore};

/// Number of creates between two sweeps of expired sessions.
pub const DEFAULT_SWEEP_INTERVAL: usize = 256;

/// Process-local session store.
///
/// Expired sessions are dropped when read, and every `sweep_interval`
/// creates the whole map is swept, so abandoned sessions cannot pile up.
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
    sweep_interval: usize,
    creates_since_sweep: AtomicUsize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_interval(sweep_interval: usize) -> Self {
        MemorySessionStore {
            sessions: DashMap::new(),
            sweep_interval: sweep_interval.max(1),
            creates_since_sweep: AtomicUsize::new(0),
        }
    }

    /// Removes every expired session, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!(removed, remaining = self.sessions.len(), "Swept expired sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: Session) -> String {
        let creates = self.creates_since_sweep.fetch_add(1, Ordering::Relaxed) + 1;
        if creates >= self.sweep_interval {
            self.creates_since_sweep.store(0, Ordering::Relaxed);
            self.sweep_expired();
        }

        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), session);
        id
    }

    async fn get(&self, id: &str) -> Option<Session> {
        let session = self.sessions.get(id).map(|entry| entry.value().clone())?;
        if session.is_expired() {
            debug!("Dropping expired session");
            self.sessions.remove(id);
            return None;
        }
        Some(session)
    }

    async fn put(&self, id: &str, session: Session) {
        self.sessions.insert(id.to_string(), session);
    }

    async fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemorySessionStore::new();
        let id = store
            .create(Session::authenticated(Identity::new("42", "Ada"), 60))
            .await;

        let session = store.get(&id).await.expect("session should exist");
        assert_eq!(session.identity.unwrap().display_name, "Ada");
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = MemorySessionStore::new();
        let a = store.create(Session::new(60)).await;
        let b = store.create(Session::new(60)).await;
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn expired_sessions_are_evicted_on_read() {
        let store = MemorySessionStore::new();
        let id = store.create(Session::new(0)).await;

        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn abandoned_sessions_are_swept_on_create() {
        let store = MemorySessionStore::with_sweep_interval(4);
        for _ in 0..3 {
            store.create(Session::new(0)).await;
        }
        assert_eq!(store.len(), 3);

        let live = store.create(Session::new(60)).await;
        assert_eq!(store.len(), 1);
        assert!(store.get(&live).await.is_some());
    }

    #[tokio::test]
    async fn default_store_stays_bounded_under_anonymous_logins() {
        let store = MemorySessionStore::new();
        for _ in 0..(DEFAULT_SWEEP_INTERVAL * 4) {
            store.create(Session::new(0)).await;
        }
        assert!(store.len() < DEFAULT_SWEEP_INTERVAL);
    }

    #[tokio::test]
    async fn sweep_keeps_live_sessions() {
        let store = MemorySessionStore::new();
        let live = store.create(Session::new(60)).await;
        store.create(Session::new(0)).await;

        assert_eq!(store.sweep_expired(), 1);
        assert!(store.get(&live).await.is_some());
    }

    #[tokio::test]
    async fn remove_forgets_session() {
        let store = MemorySessionStore::new();
        let id = store.create(Session::new(60)).await;
        store.remove(&id).await;
        assert!(store.get(&id).await.is_none());
    }
}
