//! The response for requests that do not match any route.

use axum::{http::StatusCode, response::Response};

use crate::response::error_envelope;

/// The fallback handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    error_envelope(StatusCode::NOT_FOUND, "unknown endpoint", None)
}
