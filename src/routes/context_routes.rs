//! Context save and lookup endpoints.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::ContextError;
use crate::models::{ContextRecord, ContextSubmission, Identity};
use crate::state::AppState;

/// Registers context routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/save-context", post(save_context))
        .route("/api/context", get(get_context))
}

/// Keeps axum's 413 for bodies over the configured limit; anything else is a bad form.
fn invalid_form(e: MultipartError) -> ContextError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ContextError::PayloadTooLarge(e.body_text())
    } else {
        ContextError::Validation(format!("invalid form data: {}", e.body_text()))
    }
}

/// Reads the multipart form into a submission.
///
/// Known fields are `notes`, `apiKey`, `slackUsers` and the file `docx`;
/// anything else is skipped. A `docx` part with neither a file name nor
/// content is what browsers send when no file was chosen, and counts as absent.
async fn read_submission(mut multipart: Multipart) -> Result<ContextSubmission, ContextError> {
    let mut submission = ContextSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "notes" => submission.notes = Some(field.text().await.map_err(invalid_form)?),
            "apiKey" => submission.api_key = Some(field.text().await.map_err(invalid_form)?),
            "slackUsers" => {
                submission.slack_users_csv = Some(field.text().await.map_err(invalid_form)?)
            }
            "docx" => {
                let has_file_name = field.file_name().is_some_and(|n| !n.is_empty());
                let bytes = field.bytes().await.map_err(invalid_form)?;
                if bytes.is_empty() && !has_file_name {
                    debug!("Empty docx part, treating as no document");
                } else {
                    submission.document = Some(bytes.to_vec());
                }
            }
            other => debug!("Ignoring unexpected form field '{}'", other),
        }
    }

    Ok(submission)
}

/// Saves notes, API key, Slack handles and optional document text for the caller.
async fn save_context(
    identity: Identity,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ContextError> {
    let multipart = multipart.map_err(|e| ContextError::Validation(e.body_text()))?;
    let submission = read_submission(multipart).await?;
    state.contexts.upsert(&identity, submission).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Returns the caller's context, `{}` if nothing was saved yet.
async fn get_context(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ContextRecord>, ContextError> {
    Ok(Json(state.contexts.lookup(&identity).await?))
}
