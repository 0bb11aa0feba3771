use axum::{http::StatusCode, response::Response};
use axum_test::TestServer;
use serde_json::{Value, json};

use crate::{
    AppState, build_router, endpoints,
    test_utils::{TEST_PASSWORD, get_test_state},
};

pub(crate) async fn parse_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body.");

    serde_json::from_slice(&body).expect("Response body is not JSON.")
}

/// A test server over a fresh in-memory database, and the state it shares.
pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let state = get_test_state();
    let app = build_router(state.clone());
    let server = TestServer::try_new(app).expect("Could not create test server.");

    (server, state)
}

/// Register `username` with the name "Test User" and [TEST_PASSWORD].
pub(crate) async fn register(server: &TestServer, username: &str) {
    server
        .post(endpoints::REGISTER)
        .json(&json!({
            "username": username,
            "name": "Test User",
            "password": TEST_PASSWORD,
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

/// Register `username` and return a bearer token for them.
pub(crate) async fn register_and_log_in(server: &TestServer, username: &str) -> String {
    register(server, username).await;

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({"username": username, "password": TEST_PASSWORD}))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["data"]["token"]
        .as_str()
        .expect("Log in response has no token.")
        .to_owned()
}

/// Create a category from `body` as the owner of `token` and return its ID.
pub(crate) async fn create_category_via_api(server: &TestServer, token: &str, body: Value) -> i64 {
    let response = server
        .post(endpoints::CATEGORIES)
        .authorization_bearer(token)
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);

    response.json::<Value>()["data"]["id"]
        .as_i64()
        .expect("Category response has no ID.")
}
