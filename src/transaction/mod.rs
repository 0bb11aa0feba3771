//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated inputs for changing transactions
//! - The `Amount` type for rounded monetary values
//! - Owner-scoped database functions for storing and querying transactions
//! - Route handlers for the transaction API

mod amount;
mod core;
mod db;
mod handlers;

pub use amount::Amount;
pub use core::{CategorySummary, NewTransaction, Transaction, TransactionPatch, TransactionQuery};
pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, update_transaction,
};
pub use handlers::{
    create_transaction_endpoint, delete_transaction_endpoint,
    edit_transaction_endpoint, get_transaction_endpoint, get_transactions_endpoint,
};

#[cfg(test)]
pub use db::count_transactions;
