//! The transaction type and the inputs for creating, updating and listing transactions.

use serde::{Deserialize, Serialize};

use crate::{
    category::CategoryName, database_id::DatabaseId, kind::Kind, timestamp::Timestamp,
    transaction::Amount, user::UserID,
};

/// The parts of a category that are shown with each transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The ID of the category.
    pub id: DatabaseId,
    /// The name of the category.
    pub name: CategoryName,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub kind: Kind,
    /// The color token of the category.
    pub color: String,
}

/// An income or expense of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: Kind,
    /// How much money, always positive.
    pub amount: Amount,
    /// The category the transaction belongs to.
    pub category: CategorySummary,
    /// When the transaction happened.
    pub date: Timestamp,
    /// A free text description, may be empty.
    pub description: String,
    /// When the transaction was created.
    pub created_at: Timestamp,
    /// When the transaction was last changed.
    pub updated_at: Timestamp,
}

/// The validated fields for creating a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether money was earned or spent.
    pub kind: Kind,
    /// How much money.
    pub amount: Amount,
    /// The category to file the transaction under.
    pub category_id: DatabaseId,
    /// When the transaction happened, or `None` for the time it is created.
    pub date: Option<Timestamp>,
    /// A trimmed description, empty if none was given.
    pub description: String,
}

/// The validated fields for updating a transaction.
///
/// Only these fields of a transaction can be changed after it is created.
/// A `None` field is left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    /// The new kind.
    pub kind: Option<Kind>,
    /// The new amount.
    pub amount: Option<Amount>,
    /// The new category, which must be active and owned by the same user.
    pub category_id: Option<DatabaseId>,
    /// The new date.
    pub date: Option<Timestamp>,
    /// The new description.
    pub description: Option<String>,
}

impl TransactionPatch {
    /// Whether the patch leaves every field unchanged.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

/// Filters and pagination for listing transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions of this kind.
    pub kind: Option<Kind>,
    /// The 1-based page number. `None` and `Some(0)` both mean the first page.
    pub page: Option<u64>,
    /// The page size. `None` and `Some(0)` both mean no limit.
    pub limit: Option<u64>,
}

impl TransactionQuery {
    /// The maximum number of transactions to return, if any.
    pub fn page_size(&self) -> Option<u64> {
        self.limit.filter(|limit| *limit > 0)
    }

    /// The number of transactions to skip.
    ///
    /// Always zero when there is no page size.
    pub fn offset(&self) -> u64 {
        let page_size = match self.page_size() {
            Some(page_size) => page_size,
            None => return 0,
        };
        let page = self.page.unwrap_or(1).max(1);

        (page - 1).saturating_mul(page_size)
    }
}
