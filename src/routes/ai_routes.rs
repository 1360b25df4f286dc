//! Generative-AI processing endpoint.

use axum::extract::State;
use axum::{routing::post, Json, Router};
use serde::Serialize;

use crate::errors::ContextError;
use crate::models::Identity;
use crate::state::AppState;

/// Registers AI processing routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/ai/process", post(process))
}

#[derive(Serialize)]
struct ProcessResponse {
    summary: String,
}

/// Summarizes the caller's stored context. 400 `no context` before the first save.
async fn process(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ProcessResponse>, ContextError> {
    let summary = state.contexts.process(&identity).await?;
    Ok(Json(ProcessResponse { summary }))
}
