//! Authentication middleware that validates bearer tokens.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::DecodingKey;

use crate::{AppState, Error, auth::token::decode_token};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key used to verify the signature of bearer tokens.
    pub decoding_key: DecodingKey,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding_key: state.decoding_key.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The user ID is placed into the request and then the request is executed
/// normally if the token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    let (mut parts, body) = request.into_parts();

    let bearer = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(rejection) if rejection.is_missing() => return Err(Error::MissingToken),
        Err(rejection) => {
            tracing::debug!("malformed authorization header: {rejection}");
            return Err(Error::InvalidToken);
        }
    };

    let claims = decode_token(bearer.token(), &state.decoding_key)?;

    parts.extensions.insert(claims.id);
    let request = Request::from_parts(parts, body);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, middleware, routing::get};
    use axum_test::TestServer;
    use jsonwebtoken::{DecodingKey, EncodingKey};
    use serde_json::Value;
    use time::Duration;

    use crate::{
        auth::token::encode_token,
        password::PasswordHash,
        user::{User, UserID},
    };

    use super::{AuthState, auth_guard};

    const SECRET: &[u8] = b"foobar";

    async fn handler(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    fn get_test_server() -> TestServer {
        let state = AuthState {
            decoding_key: DecodingKey::from_secret(SECRET),
        };
        let app = Router::new()
            .route("/protected", get(handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn token(duration: Duration) -> String {
        let user = User {
            id: UserID::new(42),
            username: "alice".to_owned(),
            name: "Alice".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        };

        encode_token(&user, duration, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    #[tokio::test]
    async fn valid_token_passes_user_id_to_handler() {
        let server = get_test_server();

        let response = server
            .get("/protected")
            .authorization_bearer(token(Duration::hours(1)))
            .await;

        response.assert_status_ok();
        response.assert_text("42");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let server = get_test_server();

        let response = server.get("/protected").await;

        response.assert_status_unauthorized();
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "token missing");
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let server = get_test_server();

        let response = server
            .get("/protected")
            .authorization_bearer("definitely-not-a-jwt")
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["error"], "invalid token");
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let server = get_test_server();

        let response = server
            .get("/protected")
            .authorization_bearer(token(Duration::hours(-2)))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["error"], "token expired");
    }
}
