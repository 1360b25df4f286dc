//! HTTP route definitions and handlers.
//!
//! This module organizes all HTTP endpoints into logical groups:
//! login, context management, AI processing, and health checks.

mod ai_routes;
mod auth_routes;
mod context_routes;
mod health_routes;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// Combines all route modules into a single router, caps request bodies at
/// `extraction.max_upload_bytes`, and attaches the application state.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.extraction.max_upload_bytes;
    Router::new()
        .merge(auth_routes::routes())
        .merge(context_routes::routes())
        .merge(ai_routes::routes())
        .merge(health_routes::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
