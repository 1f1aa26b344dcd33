//! Shared state endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::store::{into_document, Document};

/// Body returned by a successful write.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SaveResponse {
    pub ok: bool,
}

/// GET /state - Current document.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<Document> {
    Json(state.service.load_state())
}

/// POST /state - Replace the document and push it to every client.
///
/// The body must be a JSON object; anything else is rejected with 400 and
/// nothing is stored or pushed.
pub async fn post_state(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<SaveResponse>, ApiError> {
    tracing::debug!(payload = %body, "Incoming state payload");

    let Some(candidate) = into_document(body) else {
        return Err(ApiError::BadRequest("state must be an object"));
    };

    let saved = state.service.save_state(candidate)?;
    state.broadcaster.broadcast(&saved);

    Ok(Json(SaveResponse { ok: true }))
}
