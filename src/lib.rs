//! Fintrack is a JSON API for tracking personal income and expenses.
//!
//! Users register, log in with a bearer token, and manage their own
//! categories and transactions. Every read and write is scoped to the
//! authenticated user.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod database_id;
mod db;
mod endpoints;
mod kind;
mod logging;
mod not_found;
mod password;
mod register_user;
mod response;
mod routing;
mod timestamp;
mod transaction;
mod user;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use validation::{FieldError, ValidationErrors};

use crate::response::error_envelope;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A path parameter could not be parsed as an ID.
    ///
    /// The string names the kind of resource, e.g. "transaction".
    #[error("invalid {0} ID")]
    MalformedId(&'static str),

    /// One or more fields of a request payload failed validation.
    ///
    /// Every violated field is listed, not just the first one.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The category referenced by a transaction does not exist, is inactive,
    /// or belongs to another user.
    #[error("category not found or inactive")]
    InvalidCategory,

    /// A category cannot be deleted while transactions still refer to it.
    #[error("category is still used by transactions; deactivate it instead")]
    CategoryInUse,

    /// The user already has a category with the same name.
    #[error("category name already exists")]
    DuplicateCategoryName,

    /// Another user has already registered the username.
    #[error("username already exists")]
    DuplicateUsername,

    /// The username or password given when logging in was wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request did not include a bearer token.
    #[error("token missing")]
    MissingToken,

    /// The bearer token could not be decoded or its signature is wrong.
    #[error("invalid token")]
    InvalidToken,

    /// The bearer token was valid once, but it has expired.
    #[error("token expired")]
    ExpiredToken,

    /// The token for a successful log in could not be created.
    ///
    /// The error string should only be logged on the server.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are reported as not found so that
    /// callers cannot learn whether they exist.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist or is not owned by the caller.
    #[error("transaction not found")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or is not owned by the caller.
    #[error("transaction not found")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist or is not owned by the caller.
    #[error("category not found")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist or is not owned by the caller.
    #[error("category not found")]
    DeleteMissingCategory,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedId(_)
            | Error::Validation(_)
            | Error::InvalidCategory
            | Error::CategoryInUse
            // Kept as 400 rather than 409 to match what existing clients expect.
            | Error::DuplicateCategoryName => StatusCode::BAD_REQUEST,
            Error::DuplicateUsername => StatusCode::CONFLICT,
            Error::InvalidCredentials
            | Error::MissingToken
            | Error::InvalidToken
            | Error::ExpiredToken => StatusCode::UNAUTHORIZED,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::TokenCreation(_)
            | Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            Error::Validation(errors) => {
                error_envelope(status, &errors.to_string(), Some(errors.into_inner()))
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                error_envelope(status, "internal server error", None)
            }
            error => error_envelope(status, &error.to_string(), None),
        }
    }
}
