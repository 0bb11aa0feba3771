//! Categories group a user's transactions, e.g. "Groceries" or "Salary".
//!
//! This module contains the category model, the owner-scoped database
//! functions and the route handlers for the category API.

mod core;
mod db;
mod handlers;

pub use core::{Category, CategoryName, CategoryPatch, NewCategory};
pub use db::{
    active_category_exists, create_category, create_category_table, delete_category,
    get_active_categories, get_active_category, update_category,
};
#[cfg(test)]
pub use handlers::CategoryState;
pub use handlers::{
    create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
    get_categories_endpoint, get_category_endpoint,
};
