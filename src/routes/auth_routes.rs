//! Login endpoints driving the identity provider's redirect flow.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{routing::get, Router};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AuthError;
use crate::providers::CallbackParams;
use crate::sessions::Session;
use crate::state::AppState;
use crate::utils::cookies::{read_cookie, session_cookie};
use crate::utils::http_helpers::HTTPError;

/// Registers login routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google", get(login))
        .route("/auth/google/callback", get(callback))
}

fn cookie_for(state: &AppState, session_id: &str) -> String {
    let cfg = &state.config.session;
    session_cookie(&cfg.cookie_name, session_id, cfg.ttl_in_seconds, cfg.secure)
}

/// Starts a login: remembers a fresh `state` value in the caller's session
/// and redirects to the provider.
async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let nonce = Uuid::new_v4().simple().to_string();
    let authorize_url = match state.provider.initiate(&nonce) {
        Ok(url) => url,
        Err(e) => {
            error!("Cannot start login with '{}': {}", state.provider.get_name(), e);
            return HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed").into_response();
        }
    };

    let existing = match read_cookie(&headers, &state.config.session.cookie_name) {
        Some(id) => state.sessions.get(&id).await.map(|session| (id, session)),
        None => None,
    };
    let session_id = match existing {
        Some((id, mut session)) => {
            session.oauth_state = Some(nonce);
            state.sessions.put(&id, session).await;
            id
        }
        None => {
            let mut session = Session::new(state.config.session.ttl_in_seconds);
            session.oauth_state = Some(nonce);
            state.sessions.create(session).await
        }
    };

    (
        [(header::SET_COOKIE, cookie_for(&state, &session_id))],
        Redirect::to(authorize_url.as_str()),
    )
        .into_response()
}

/// Finishes a login. Success binds the identity to a new session; any failure
/// leaves the caller unauthenticated. Both redirect to `/`.
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_login(&state, &headers, &params).await {
        Ok(session_id) => (
            [(header::SET_COOKIE, cookie_for(&state, &session_id))],
            Redirect::to("/"),
        )
            .into_response(),
        Err(e) => {
            warn!("Login via '{}' failed: {}", state.provider.get_name(), e);
            Redirect::to("/").into_response()
        }
    }
}

async fn complete_login(
    state: &AppState,
    headers: &HeaderMap,
    params: &CallbackParams,
) -> Result<String, AuthError> {
    let session_id = read_cookie(headers, &state.config.session.cookie_name)
        .ok_or(AuthError::StateMismatch)?;
    let mut session = state
        .sessions
        .get(&session_id)
        .await
        .ok_or(AuthError::StateMismatch)?;

    // The state value is single-use.
    let expected = session.oauth_state.take();
    state.sessions.put(&session_id, session).await;
    match (expected.as_deref(), params.state.as_deref()) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => return Err(AuthError::StateMismatch),
    }

    let identity = state.provider.complete(params).await?;
    info!(user = %identity.id, "User '{}' logged in", identity.display_name);

    // Rotate the session id so a pre-login id never becomes authenticated.
    state.sessions.remove(&session_id).await;
    let fresh = Session::authenticated(identity, state.config.session.ttl_in_seconds);
    Ok(state.sessions.create(fresh).await)
}
