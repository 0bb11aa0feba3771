//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::response::error_envelope;

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED_FIELDS: [&str; 1] = ["password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the response body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged at the `debug` level.
/// Passwords in JSON request bodies are replaced with asterisks.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Some(bytes) => bytes,
        None => {
            return error_envelope(StatusCode::BAD_REQUEST, "could not read request body", None);
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        log_request(&parts, &redact_passwords(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Some(bytes) => bytes,
        None => {
            return error_envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
                None,
            );
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Option<Bytes> {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            tracing::error!("could not read body: {error}");
            None
        }
    }
}

/// Replace the values of password fields in a JSON object.
///
/// Text that is not a JSON object is returned unchanged.
fn redact_passwords(body_text: &str) -> String {
    let mut object = match serde_json::from_str::<Value>(body_text) {
        Ok(Value::Object(object)) => object,
        _ => return body_text.to_owned(),
    };

    let mut redacted = false;
    for field in REDACTED_FIELDS {
        if let Some(value) = object.get_mut(field) {
            *value = Value::String("********".to_owned());
            redacted = true;
        }
    }

    if !redacted {
        return body_text.to_owned();
    }

    Value::Object(object).to_string()
}

/// The longest prefix of `text` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character, or `None` if `text` already fits.
fn truncate(text: &str) -> Option<&str> {
    if text.len() <= LOG_BODY_LENGTH_LIMIT {
        return None;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    Some(&text[..end])
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    match truncate(body) {
        Some(prefix) => {
            tracing::info!("Received request: {headers:#?}\nbody: {prefix:}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {headers:#?}\nbody: {body:?}"),
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    match truncate(body) {
        Some(prefix) => {
            tracing::info!("Sending response: {headers:#?}\nbody: {prefix:}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {headers:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{Json, Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_passwords, truncate};

    #[test]
    fn password_is_redacted() {
        let redacted = redact_passwords(r#"{"username":"alice","password":"hunter2"}"#);

        let value: Value = serde_json::from_str(&redacted).unwrap();
        assert_eq!(value["username"], "alice");
        assert_eq!(value["password"], "********");
    }

    #[test]
    fn body_without_password_is_unchanged() {
        let body = r#"{"amount": 12.5}"#;

        assert_eq!(redact_passwords(body), body);
    }

    #[test]
    fn non_json_body_is_unchanged() {
        assert_eq!(redact_passwords("password=hunter2"), "password=hunter2");
    }

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(truncate("hello"), None);
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let prefix = truncate(&text).unwrap();

        assert!(prefix.len() <= LOG_BODY_LENGTH_LIMIT);
        assert_eq!(prefix.chars().count(), LOG_BODY_LENGTH_LIMIT / 2);
    }

    #[tokio::test]
    async fn middleware_passes_body_through() {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = json!({"password": "hunter2", "note": "x".repeat(100)});

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }
}
