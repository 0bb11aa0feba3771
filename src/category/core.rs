//! The category type and the inputs for creating and updating categories.

use std::fmt::Display;

use rusqlite::{ToSql, types::ToSqlOutput};
use serde::{Deserialize, Serialize};

use crate::{database_id::DatabaseId, kind::Kind, timestamp::Timestamp, user::UserID};

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 50;

/// Why a string is not a valid category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryNameError {
    /// The name is empty or only whitespace.
    #[error("must not be empty")]
    Empty,
    /// The name has more than [MAX_CATEGORY_NAME_LENGTH] characters.
    #[error("must be at most {MAX_CATEGORY_NAME_LENGTH} characters long")]
    TooLong,
}

/// The name of a category, trimmed of surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed before checking the length.
    ///
    /// # Errors
    ///
    /// This function will return an error if the trimmed `name` is empty or too long.
    pub fn new(name: &str) -> Result<Self, CategoryNameError> {
        let name = name.trim();

        if name.is_empty() {
            Err(CategoryNameError::Empty)
        } else if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            Err(CategoryNameError::TooLong)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is trimmed, not empty and not too long.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToSql for CategoryName {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user defined group of transactions, e.g. "Groceries" or "Salary".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: DatabaseId,
    /// The user that owns the category.
    pub user_id: UserID,
    /// The name of the category, unique for each user.
    pub name: CategoryName,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub kind: Kind,
    /// A color token for displaying the category, e.g. "#FF0000".
    pub color: String,
    /// Inactive categories are hidden and cannot be used by new transactions.
    pub is_active: bool,
    /// Whether the category was provided by the application rather than the user.
    pub is_default: bool,
    /// When the category was created.
    pub created_at: Timestamp,
    /// When the category was last changed.
    pub updated_at: Timestamp,
}

/// The validated fields for creating a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The name of the category.
    pub name: CategoryName,
    /// Whether the category is for income or expenses.
    pub kind: Kind,
    /// A color token for displaying the category.
    pub color: String,
    /// Whether the category starts out active.
    pub is_active: bool,
}

/// The validated fields for updating a category.
///
/// Only these fields of a category can be changed after it is created.
/// A `None` field is left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    /// The new name.
    pub name: Option<CategoryName>,
    /// The new kind.
    pub kind: Option<Kind>,
    /// The new color.
    pub color: Option<String>,
    /// Set to `false` to deactivate the category, or `true` to reactivate it.
    pub is_active: Option<bool>,
}

impl CategoryPatch {
    /// Whether the patch leaves every field unchanged.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.kind.is_none()
            && self.color.is_none()
            && self.is_active.is_none()
    }
}
