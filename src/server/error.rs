//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::SyncError;

/// Error returned by route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request was rejected before touching state.
    BadRequest(&'static str),
    /// Store or serialization failure.
    Internal(SyncError),
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(e) => {
                tracing::error!(?e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
