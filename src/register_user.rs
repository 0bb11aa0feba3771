//! The route handler for registering a new user.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    password::{PasswordHash, ValidatedPassword},
    response::ApiResponse,
    user::{UserProfile, create_user, username_exists},
    validation::{JsonPayload, RuleSet, Validator, rules, validate},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for hashing the new user's password.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The validated registration details.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// The trimmed username, at least three characters long.
    pub username: String,
    /// The display name.
    pub name: String,
    /// The password to hash.
    pub password: ValidatedPassword,
}

impl RuleSet for Registration {
    fn read(fields: &mut Validator<'_>) -> Option<Self> {
        let username = fields.required("username", rules::username);
        let name = fields.required("name", rules::display_name);
        let password = fields.required("password", rules::password);

        Some(Self {
            username: username?,
            name: name?,
            password: password?,
        })
    }
}

/// A route handler for registering a new user.
///
/// Responds with the new user's profile, never the password hash.
pub async fn register_user_endpoint(
    State(state): State<RegistrationState>,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiResponse<UserProfile>, Error> {
    let registration: Registration = validate(&payload)?;

    let password_hash = PasswordHash::new(registration.password, state.password_hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;

    if username_exists(&registration.username, &connection)? {
        return Err(Error::DuplicateUsername);
    }

    let user = create_user(
        &registration.username,
        &registration.name,
        password_hash,
        &connection,
    )?;

    tracing::info!("registered user {}", user.id);

    Ok(ApiResponse::created(user.into()))
}
