//! HTTP error mapping for the dispatcher.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bark_pay::PayError;

/// Wraps a [`PayError`] for conversion into a dispatcher response.
///
/// User-correctable errors (bad input, unknown records, exhausted cards)
/// map to 400; ledger and internal failures map to 500. The envelope shape
/// matches successful responses: `{"success": false, "error": "..."}`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ActionError(#[from] pub PayError);

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = if self.0.is_user_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
