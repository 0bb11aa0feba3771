//! The JSON envelope that wraps every API response.
//!
//! Successful responses look like `{"success": true, "data": ...}` and errors
//! look like `{"success": false, "error": "...", "details": [...]}`, where
//! `details` is only present for validation errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::FieldError;

/// The body of every JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// The payload of a successful response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A message describing why the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// One entry per invalid field for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// A successful response whose data is wrapped in an [Envelope].
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: T,
    status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// A 200 OK response.
    pub fn ok(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::OK,
        }
    }

    /// A 201 Created response.
    pub fn created(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            success: true,
            data: Some(self.data),
            error: None,
            details: None,
        };

        (self.status_code, Json(envelope)).into_response()
    }
}

/// An empty 204 No Content response, used for successful deletes.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// An error response with the envelope `{"success": false, "error": message}`.
pub fn error_envelope(
    status_code: StatusCode,
    message: &str,
    details: Option<Vec<FieldError>>,
) -> Response {
    let envelope: Envelope<()> = Envelope {
        success: false,
        data: None,
        error: Some(message.to_owned()),
        details,
    };

    (status_code, Json(envelope)).into_response()
}

#[cfg(test)]
mod response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde::Deserialize;
    use serde_json::json;

    use crate::test_utils::parse_json_body;

    use super::{ApiResponse, Envelope, error_envelope, no_content};

    #[derive(Debug, PartialEq, Deserialize)]
    struct Receipt {
        id: i64,
    }

    #[tokio::test]
    async fn created_wraps_data_in_envelope() {
        let response = ApiResponse::created(json!({"id": 1})).into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(body, json!({"success": true, "data": {"id": 1}}));
    }

    #[tokio::test]
    async fn error_envelope_omits_data_and_details() {
        let response = error_envelope(StatusCode::NOT_FOUND, "unknown endpoint", None);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = parse_json_body(response).await;
        assert_eq!(body, json!({"success": false, "error": "unknown endpoint"}));
    }

    #[tokio::test]
    async fn no_content_has_empty_body() {
        let response = no_content();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn envelope_deserializes_data_without_default() {
        let success: Envelope<Receipt> =
            serde_json::from_value(json!({"success": true, "data": {"id": 7}})).unwrap();
        let failure: Envelope<Receipt> =
            serde_json::from_value(json!({"success": false, "error": "category not found"}))
                .unwrap();

        assert_eq!(success.data, Some(Receipt { id: 7 }));
        assert_eq!(failure.data, None);
        assert_eq!(failure.error.as_deref(), Some("category not found"));
        assert_eq!(failure.details, None);
    }
}
