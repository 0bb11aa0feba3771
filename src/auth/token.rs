//! Defines the claims carried in a bearer token and how tokens are signed and verified.

use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::User, user::UserID};

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub id: UserID,
    /// The username of the user the token was issued to.
    pub username: String,
    /// The expiry time of the token as a unix timestamp in seconds.
    pub exp: i64,
    /// The time the token was issued as a unix timestamp in seconds.
    pub iat: i64,
}

/// Create a signed token for `user` that expires after `duration`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn encode_token(
    user: &User,
    duration: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        id: user.id,
        username: user.username.clone(),
        exp: (now + duration).unix_timestamp(),
        iat: now.unix_timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::ExpiredToken] if the token has expired, or
/// [Error::InvalidToken] if it is malformed or was not signed with the matching key.
pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| match error.kind() {
            ErrorKind::ExpiredSignature => Error::ExpiredToken,
            _ => {
                tracing::debug!("rejected token: {error}");
                Error::InvalidToken
            }
        })
}

#[cfg(test)]
mod token_tests {
    use jsonwebtoken::{DecodingKey, EncodingKey};
    use time::Duration;

    use crate::{
        Error,
        password::PasswordHash,
        user::{User, UserID},
    };

    use super::{decode_token, encode_token};

    fn test_user() -> User {
        User {
            id: UserID::new(7),
            username: "alice".to_owned(),
            name: "Alice".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn decoded_token_has_user_claims() {
        let user = test_user();
        let token = encode_token(
            &user,
            Duration::hours(1),
            &EncodingKey::from_secret(b"foobar"),
        )
        .unwrap();

        let claims = decode_token(&token, &DecodingKey::from_secret(b"foobar")).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = encode_token(
            &test_user(),
            Duration::hours(1),
            &EncodingKey::from_secret(b"foobar"),
        )
        .unwrap();

        let result = decode_token(&token, &DecodingKey::from_secret(b"barfoo"));

        assert_eq!(result, Err(Error::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = encode_token(
            &test_user(),
            Duration::hours(-2),
            &EncodingKey::from_secret(b"foobar"),
        )
        .unwrap();

        let result = decode_token(&token, &DecodingKey::from_secret(b"foobar"));

        assert_eq!(result, Err(Error::ExpiredToken));
    }

    #[test]
    fn garbage_is_invalid() {
        let result = decode_token("not.a.token", &DecodingKey::from_secret(b"foobar"));

        assert_eq!(result, Err(Error::InvalidToken));
    }
}
