//! The route handler for logging in with a username and password.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use jsonwebtoken::EncodingKey;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::token::encode_token,
    db::lock_connection,
    response::ApiResponse,
    user::get_user_by_username,
    validation::{JsonPayload, RuleSet, Validator, rules, validate},
};

/// The state needed to perform a login.
#[derive(Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The key used to sign new tokens.
    pub encoding_key: EncodingKey,
    /// How long a new token stays valid.
    pub token_duration: Duration,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            encoding_key: state.encoding_key.clone(),
            token_duration: state.token_duration,
        }
    }
}

/// The credentials entered at log in.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    /// The username entered during log in.
    pub username: String,
    /// The password entered during log in.
    pub password: String,
}

impl RuleSet for Credentials {
    fn read(fields: &mut Validator<'_>) -> Option<Self> {
        let username = fields.required("username", rules::any_string);
        let password = fields.required("password", rules::any_string);

        Some(Self {
            username: username?,
            password: password?,
        })
    }
}

/// The body of a successful log in response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The bearer token for authenticating later requests.
    pub token: String,
    /// The username of the user that logged in.
    pub username: String,
    /// The display name of the user that logged in.
    pub name: String,
}

/// A route handler for logging in with a username and password.
///
/// Unknown usernames and wrong passwords both result in the same
/// [Error::InvalidCredentials] so that callers cannot tell which usernames
/// are registered.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiResponse<LogInResponse>, Error> {
    let credentials: Credentials = validate(&payload)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_username(credentials.username.trim(), &connection).map_err(
            |error| match error {
                Error::NotFound => Error::InvalidCredentials,
                error => error,
            },
        )?
    };

    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        tracing::debug!("wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(&user, state.token_duration, &state.encoding_key)?;

    Ok(ApiResponse::ok(LogInResponse {
        token,
        username: user.username,
        name: user.name,
    }))
}

#[cfg(test)]
mod log_in_tests {
    use serde_json::{Value, json};

    use crate::{
        auth::token::decode_token,
        endpoints,
        response::Envelope,
        test_utils::{get_test_server, register},
    };

    use super::LogInResponse;

    #[tokio::test]
    async fn log_in_returns_token_for_user() {
        let (server, state) = get_test_server();
        register(&server, "alice").await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"username": "alice", "password": "password"}))
            .await;

        response.assert_status_ok();
        let body = response.json::<Envelope<LogInResponse>>().data.unwrap();
        assert_eq!(body.username, "alice");
        assert_eq!(body.name, "Test User");
        let claims = decode_token(&body.token, &state.decoding_key).unwrap();
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (server, _) = get_test_server();
        register(&server, "alice").await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"username": "alice", "password": "wrong"}))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(
            response.json::<Value>()["error"],
            "invalid username or password"
        );
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"username": "nobody", "password": "password"}))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(
            response.json::<Value>()["error"],
            "invalid username or password"
        );
    }

    #[tokio::test]
    async fn missing_fields_are_reported() {
        let (server, _) = get_test_server();

        let response = server.post(endpoints::LOG_IN).json(&json!({})).await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["details"].as_array().unwrap().len(), 2);
    }
}
