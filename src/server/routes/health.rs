//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    /// Registered sessions, possibly including some not yet pruned.
    pub clients: usize,
    /// RFC 3339 time of the last stored write.
    pub state_updated_at: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let state_updated_at = match state.service.database().last_modified() {
        Ok(t) => t.map(|t| t.to_rfc3339()),
        Err(e) => {
            tracing::warn!(?e, "Failed to read last modification time");
            None
        }
    };

    Json(HealthResponse {
        status: "ok",
        clients: state.registry.len(),
        state_updated_at,
    })
}
