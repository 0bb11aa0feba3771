//! Route handlers for the transaction API.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::parse_database_id,
    db::lock_connection,
    response::{ApiResponse, no_content},
    transaction::{
        NewTransaction, Transaction, TransactionPatch, TransactionQuery, create_transaction,
        delete_transaction, get_transaction, get_transactions, update_transaction,
    },
    user::UserID,
    validation::{JsonPayload, QueryPayload, validate},
};

/// The state needed by the transaction route handlers.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the transactions of the logged in user.
///
/// Supports the query parameters `type`, `page` and `limit`.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    QueryPayload(payload): QueryPayload,
) -> Result<ApiResponse<Vec<Transaction>>, Error> {
    let query: TransactionQuery = validate(&payload)?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = get_transactions(&query, user_id, &connection)?;

    Ok(ApiResponse::ok(transactions))
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiResponse<Transaction>, Error> {
    let new_transaction: NewTransaction = validate(&payload)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(new_transaction, user_id, &connection)?;

    tracing::debug!("user {user_id} created transaction {}", transaction.id);

    Ok(ApiResponse::created(transaction))
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_transaction_id): Path<String>,
) -> Result<ApiResponse<Transaction>, Error> {
    let transaction_id = parse_database_id(&raw_transaction_id, "transaction")?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = get_transaction(transaction_id, user_id, &connection)?;

    Ok(ApiResponse::ok(transaction))
}

/// A route handler for changing some of the fields of a transaction.
///
/// Only the fields `type`, `amount`, `category`, `date` and `description` can
/// be changed, any other fields in the body are ignored.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_transaction_id): Path<String>,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiResponse<Transaction>, Error> {
    let transaction_id = parse_database_id(&raw_transaction_id, "transaction")?;
    let patch: TransactionPatch = validate(&payload)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = update_transaction(transaction_id, user_id, patch, &connection)?;

    Ok(ApiResponse::ok(transaction))
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_transaction_id): Path<String>,
) -> Result<Response, Error> {
    let transaction_id = parse_database_id(&raw_transaction_id, "transaction")?;

    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(transaction_id, user_id, &connection)?;

    tracing::debug!("user {user_id} deleted transaction {transaction_id}");

    Ok(no_content())
}
