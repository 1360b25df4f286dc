//! Error types shared by the identity gate, the extractors and the context service.
//!
//! Every error that can reach a handler ends up as a [`ContextError`], which
//! knows how to render itself as an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::utils::http_helpers::HTTPError;

/// Failures of the login flow or of a missing/expired session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authenticated session")]
    Unauthenticated,

    #[error("provider returned an error: {0}")]
    Denied(String),

    #[error("callback is missing the authorization code")]
    MissingCode,

    #[error("callback state does not match the login session")]
    StateMismatch,

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("failed to fetch user profile: {0}")]
    Profile(String),

    #[error("invalid provider configuration: {0}")]
    Config(String),
}

/// Failures of a [`crate::extract::TextExtractor`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document is not a valid archive: {0}")]
    InvalidArchive(String),

    #[error("document has no '{0}' part")]
    MissingPart(String),

    #[error("document body could not be read: {0}")]
    InvalidContent(String),

    #[error("extraction did not finish within {0} ms")]
    Timeout(u64),

    #[error("extraction worker failed: {0}")]
    Worker(String),

    #[error("document body exceeds {0} bytes")]
    TooLarge(u64),
}

/// The error taxonomy surfaced by the HTTP API.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("no context stored for this identity")]
    NotFound,

    #[error("store error: {0}")]
    Store(String),
}

impl ContextError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContextError::Auth(_) => StatusCode::UNAUTHORIZED,
            ContextError::Validation(_) | ContextError::NotFound => StatusCode::BAD_REQUEST,
            ContextError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ContextError::Extraction(_) | ContextError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message returned to clients. Internal failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            ContextError::Auth(_) => "unauthorized".to_string(),
            ContextError::Validation(msg) => msg.clone(),
            ContextError::NotFound => "no context".to_string(),
            ContextError::PayloadTooLarge(_) => "payload too large".to_string(),
            ContextError::Extraction(_) | ContextError::Store(_) => "failed".to_string(),
        }
    }
}

impl IntoResponse for ContextError {
    fn into_response(self) -> Response {
        match &self {
            ContextError::Extraction(_) | ContextError::Store(_) => {
                error!("Request failed: {}", self)
            }
            ContextError::Validation(_) | ContextError::PayloadTooLarge(_) => {
                warn!("Rejected request: {}", self)
            }
            ContextError::Auth(_) | ContextError::NotFound => debug!("Request denied: {}", self),
        }
        HTTPError::new(self.status(), self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_not_found_are_client_errors() {
        let err = ContextError::Validation("slackUsers is required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "slackUsers is required");

        assert_eq!(ContextError::NotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ContextError::NotFound.public_message(), "no context");
    }

    #[test]
    fn extraction_failures_hide_details() {
        let err: ContextError = ExtractionError::InvalidArchive("bad zip".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "failed");
    }

    #[test]
    fn oversized_bodies_keep_their_status() {
        let err = ContextError::PayloadTooLarge("length limit exceeded".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.public_message(), "payload too large");

        let err: ContextError = ExtractionError::TooLarge(64).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        let err: ContextError = AuthError::Unauthenticated.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.public_message(), "unauthorized");
    }
}
