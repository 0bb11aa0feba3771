//! Database operations for transactions.
//!
//! Every function takes the ID of the user making the request and only ever
//! reads or writes that user's transactions. Writes that set the category of
//! a transaction first check that the category is active and owned by the
//! same user.

use rusqlite::{Connection, Row, ToSql, params_from_iter};

use crate::{
    Error,
    category::{CategoryName, active_category_exists},
    database_id::DatabaseId,
    timestamp::Timestamp,
    transaction::{
        CategorySummary, NewTransaction, Transaction, TransactionPatch, TransactionQuery,
    },
    user::UserID,
};

const SELECT_TRANSACTION: &str = "SELECT t.id, t.user_id, t.type, t.amount, t.date, \
     t.description, t.created_at, t.updated_at, c.id, c.name, c.type, c.color \
     FROM \"transaction\" t \
     INNER JOIN category c ON c.id = t.category_id AND c.user_id = t.user_id";

/// Create a transaction owned by `user_id`.
///
/// The date defaults to the current time if `new_transaction` does not have one.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the category does not exist, is
/// inactive or belongs to another user.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    ensure_category_usable(new_transaction.category_id, user_id, connection)?;

    let now = Timestamp::now();

    connection
        .execute(
            "INSERT INTO \"transaction\" (user_id, type, amount, category_id, date, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            (
                user_id,
                new_transaction.kind,
                new_transaction.amount,
                new_transaction.category_id,
                new_transaction.date.unwrap_or(now),
                &new_transaction.description,
                now,
            ),
        )
        .map_err(map_category_constraint)?;

    get_transaction(connection.last_insert_rowid(), user_id, connection)
}

/// Retrieve a transaction owned by `user_id` with its category.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn get_transaction(
    transaction_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = ?1 AND t.user_id = ?2"
        ))?
        .query_row((transaction_id, user_id), map_transaction_row)
        .map_err(|error| error.into())
}

/// Retrieve the transactions of `user_id` that match `query`.
///
/// Transactions are sorted by date, newest first, then by creation time, newest first.
pub fn get_transactions(
    query: &TransactionQuery,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut where_clause_parts = vec!["t.user_id = ?1".to_owned()];
    let mut query_parameters: Vec<&dyn ToSql> = Vec::new();
    query_parameters.push(&user_id);

    if let Some(kind) = &query.kind {
        query_parameters.push(kind);
        where_clause_parts.push(format!("t.type = ?{}", query_parameters.len()));
    }

    let mut query_string_parts = vec![
        SELECT_TRANSACTION.to_owned(),
        String::from("WHERE ") + &where_clause_parts.join(" AND "),
        "ORDER BY t.date DESC, t.created_at DESC, t.id DESC".to_owned(),
    ];

    if let Some(page_size) = query.page_size() {
        // SQLite integers are signed, so anything larger is the same as no limit.
        let limit = page_size.min(i64::MAX as u64);
        let offset = query.offset().min(i64::MAX as u64);
        query_string_parts.push(format!("LIMIT {limit} OFFSET {offset}"));
    }

    let query_string = query_string_parts.join(" ");

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(|error| error.into()))
        .collect()
}

/// Apply `patch` to a transaction owned by `user_id` and return the updated transaction.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the patch sets a category that is not
/// usable, or [Error::UpdateMissingTransaction] if the transaction does not
/// exist or belongs to another user.
pub fn update_transaction(
    transaction_id: DatabaseId,
    user_id: UserID,
    patch: TransactionPatch,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if let Some(category_id) = patch.category_id {
        ensure_category_usable(category_id, user_id, connection)?;
    }

    if patch.is_empty() {
        return get_transaction(transaction_id, user_id, connection).map_err(
            |error| match error {
                Error::NotFound => Error::UpdateMissingTransaction,
                error => error,
            },
        );
    }

    let now = Timestamp::now();
    let mut set_clause_parts = vec![];
    let mut query_parameters: Vec<&dyn ToSql> = vec![];

    if let Some(kind) = &patch.kind {
        query_parameters.push(kind);
        set_clause_parts.push(format!("type = ?{}", query_parameters.len()));
    }

    if let Some(amount) = &patch.amount {
        query_parameters.push(amount);
        set_clause_parts.push(format!("amount = ?{}", query_parameters.len()));
    }

    if let Some(category_id) = &patch.category_id {
        query_parameters.push(category_id);
        set_clause_parts.push(format!("category_id = ?{}", query_parameters.len()));
    }

    if let Some(date) = &patch.date {
        query_parameters.push(date);
        set_clause_parts.push(format!("date = ?{}", query_parameters.len()));
    }

    if let Some(description) = &patch.description {
        query_parameters.push(description);
        set_clause_parts.push(format!("description = ?{}", query_parameters.len()));
    }

    query_parameters.push(&now);
    set_clause_parts.push(format!("updated_at = ?{}", query_parameters.len()));

    query_parameters.push(&transaction_id);
    let id_parameter = query_parameters.len();
    query_parameters.push(&user_id);
    let user_id_parameter = query_parameters.len();

    let query = format!(
        "UPDATE \"transaction\" SET {} WHERE id = ?{id_parameter} AND user_id = ?{user_id_parameter}",
        set_clause_parts.join(", ")
    );

    let rows_affected = connection
        .execute(&query, params_from_iter(query_parameters))
        .map_err(map_category_constraint)?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    get_transaction(transaction_id, user_id, connection)
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingTransaction] if the transaction does not
/// exist or belongs to another user.
pub fn delete_transaction(
    transaction_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table.
///
/// A transaction refers to its category by the pair (category ID, user ID),
/// so the database rejects categories of other users, and categories cannot
/// be deleted while transactions still refer to them.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            amount INTEGER NOT NULL CHECK (amount > 0),
            category_id INTEGER NOT NULL,
            date INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (category_id, user_id) REFERENCES category(id, user_id) ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date DESC, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_transaction_category
            ON \"transaction\"(category_id, user_id);",
    )?;

    Ok(())
}

/// Get the number of transactions in the database, across all users.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<usize, Error> {
    let count: i64 =
        connection.query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| row.get(0))?;

    Ok(count as usize)
}

fn ensure_category_usable(
    category_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    if active_category_exists(category_id, user_id, connection)? {
        Ok(())
    } else {
        Err(Error::InvalidCategory)
    }
}

fn map_category_constraint(error: rusqlite::Error) -> Error {
    match error {
        // Code 787 occurs when a FOREIGN KEY constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
            Error::InvalidCategory
        }
        error => error.into(),
    }
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category_name: String = row.get(9)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        category: CategorySummary {
            id: row.get(8)?,
            name: CategoryName::new_unchecked(&raw_category_name),
            kind: row.get(10)?,
            color: row.get(11)?,
        },
    })
}
