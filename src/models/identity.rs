use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AuthError, ContextError};
use crate::state::AppState;
use crate::utils::cookies::read_cookie;

/// An authenticated user, as reported by the identity provider.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-issued stable user id.
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Identity {
            id: id.into(),
            display_name: display_name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Resolves the session cookie into the bound `Identity`.
/// Requests without a live, authenticated session are rejected with 401.
#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ContextError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(session_id) = read_cookie(&parts.headers, &state.config.session.cookie_name) else {
            debug!("No session cookie on request to {}", parts.uri.path());
            return Err(AuthError::Unauthenticated.into());
        };

        match state.sessions.get(&session_id).await {
            Some(session) => session
                .identity
                .ok_or_else(|| AuthError::Unauthenticated.into()),
            None => {
                debug!("Unknown or expired session on request to {}", parts.uri.path());
                Err(AuthError::Unauthenticated.into())
            }
        }
    }
}
