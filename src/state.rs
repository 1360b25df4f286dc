//! Shared application state.
//!
//! Contains the state that is shared across all request handlers,
//! including configuration, the identity provider, sessions and the context service.

use crate::config::ConfigV1;
use crate::context::ContextService;
use crate::providers::IdentityProvider;
use crate::sessions::SessionStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// This state is cloned for each request handler and only holds `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The external login flow.
    pub provider: Arc<dyn IdentityProvider>,
    /// Server-side sessions behind the session cookie.
    pub sessions: Arc<dyn SessionStore>,
    /// Upsert/lookup/process over the context store.
    pub contexts: Arc<ContextService>,
}
