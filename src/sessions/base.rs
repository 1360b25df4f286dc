use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::models::Identity;

/// Server-side state behind a session cookie.
#[derive(Debug, Clone)]
pub struct Session {
    /// Set once the OAuth callback completes.
    pub identity: Option<Identity>,
    /// Anti-forgery value sent to the provider with the last login attempt.
    pub oauth_state: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(ttl_in_seconds: i64) -> Self {
        Session {
            identity: None,
            oauth_state: None,
            expires_at: Utc::now() + Duration::seconds(ttl_in_seconds),
        }
    }

    pub fn authenticated(identity: Identity, ttl_in_seconds: i64) -> Self {
        Session {
            identity: Some(identity),
            ..Session::new(ttl_in_seconds)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// The SessionStore trait abstracts session storage keyed by an opaque id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a new session and returns its freshly generated id.
    async fn create(&self, session: Session) -> String;
    /// Returns the session unless it is unknown or expired.
    async fn get(&self, id: &str) -> Option<Session>;
    /// Replaces an existing session.
    async fn put(&self, id: &str, session: Session);
    async fn remove(&self, id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_anonymous_and_live() {
        let session = Session::new(60);
        assert!(session.identity.is_none());
        assert!(!session.is_expired());
    }

    #[test]
    fn zero_ttl_is_expired() {
        assert!(Session::new(0).is_expired());
    }
}
