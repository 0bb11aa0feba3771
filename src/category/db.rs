//! Database operations for categories.
//!
//! Every function takes the ID of the user making the request and only ever
//! reads or writes that user's categories.

use rusqlite::{Connection, Row, ToSql, params_from_iter};

use crate::{
    Error,
    category::{Category, CategoryName, CategoryPatch, NewCategory},
    database_id::DatabaseId,
    timestamp::Timestamp,
    user::UserID,
};

const SELECT_CATEGORY: &str = "SELECT id, user_id, name, type, color, is_active, is_default, \
                               created_at, updated_at FROM category";

/// Create a category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// with the same name, or [Error::SqlError] for other SQL errors.
pub fn create_category(
    new_category: NewCategory,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    // The UNIQUE constraint still catches a duplicate inserted between these two statements.
    if category_name_taken(&new_category.name, user_id, connection)? {
        return Err(Error::DuplicateCategoryName);
    }

    let now = Timestamp::now();

    connection.execute(
        "INSERT INTO category (user_id, name, type, color, is_active, is_default, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
        (
            user_id,
            &new_category.name,
            new_category.kind,
            &new_category.color,
            new_category.is_active,
            now,
        ),
    )?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        user_id,
        name: new_category.name,
        kind: new_category.kind,
        color: new_category.color,
        is_active: new_category.is_active,
        is_default: false,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a category owned by `user_id`, whether it is active or not.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    category_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!("{SELECT_CATEGORY} WHERE id = ?1 AND user_id = ?2"))?
        .query_row((category_id, user_id), map_row)
        .map_err(|error| error.into())
}

/// Retrieve an active category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist, is inactive or
/// belongs to another user.
pub fn get_active_category(
    category_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY} WHERE id = ?1 AND user_id = ?2 AND is_active = 1"
        ))?
        .query_row((category_id, user_id), map_row)
        .map_err(|error| error.into())
}

/// Retrieve the active categories of `user_id` ordered alphabetically by name.
pub fn get_active_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY} WHERE user_id = ?1 AND is_active = 1 ORDER BY name ASC"
        ))?
        .query_map([user_id], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Whether `category_id` names an active category owned by `user_id`.
///
/// This is checked on every write that sets the category of a transaction.
pub fn active_category_exists(
    category_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1 AND user_id = ?2 AND is_active = 1)",
            (category_id, user_id),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Apply `patch` to a category owned by `user_id` and return the updated category.
///
/// # Errors
///
/// Returns [Error::UpdateMissingCategory] if the category does not exist or
/// belongs to another user, or [Error::DuplicateCategoryName] if the new name
/// is used by another of the user's categories.
pub fn update_category(
    category_id: DatabaseId,
    user_id: UserID,
    patch: CategoryPatch,
    connection: &Connection,
) -> Result<Category, Error> {
    if patch.is_empty() {
        return get_category(category_id, user_id, connection).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingCategory,
            error => error,
        });
    }

    let now = Timestamp::now();
    let mut set_clause_parts = vec![];
    let mut query_parameters: Vec<&dyn ToSql> = vec![];

    if let Some(name) = &patch.name {
        query_parameters.push(name);
        set_clause_parts.push(format!("name = ?{}", query_parameters.len()));
    }

    if let Some(kind) = &patch.kind {
        query_parameters.push(kind);
        set_clause_parts.push(format!("type = ?{}", query_parameters.len()));
    }

    if let Some(color) = &patch.color {
        query_parameters.push(color);
        set_clause_parts.push(format!("color = ?{}", query_parameters.len()));
    }

    if let Some(is_active) = &patch.is_active {
        query_parameters.push(is_active);
        set_clause_parts.push(format!("is_active = ?{}", query_parameters.len()));
    }

    query_parameters.push(&now);
    set_clause_parts.push(format!("updated_at = ?{}", query_parameters.len()));

    query_parameters.push(&category_id);
    let id_parameter = query_parameters.len();
    query_parameters.push(&user_id);
    let user_id_parameter = query_parameters.len();

    let query = format!(
        "UPDATE category SET {} WHERE id = ?{id_parameter} AND user_id = ?{user_id_parameter}",
        set_clause_parts.join(", ")
    );

    let rows_affected = connection.execute(&query, params_from_iter(query_parameters))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    get_category(category_id, user_id, connection)
}

/// Delete a category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingCategory] if the category does not exist or
/// belongs to another user, or [Error::CategoryInUse] if any transaction
/// still refers to the category.
pub fn delete_category(
    category_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id),
        )
        .map_err(|error| match error {
            // ON DELETE RESTRICT fails with code 1811 rather than the usual 787.
            rusqlite::Error::SqliteFailure(sql_error, _)
                if matches!(sql_error.extended_code, 787 | 1811) =>
            {
                Error::CategoryInUse
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            color TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_default INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(user_id, name),
            UNIQUE(id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_active ON category(user_id, is_active);",
    )?;

    Ok(())
}

fn category_name_taken(
    name: &CategoryName,
    user_id: UserID,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM category WHERE user_id = ?1 AND name = ?2)",
            (user_id, name),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: CategoryName::new_unchecked(&raw_name),
        kind: row.get(3)?,
        color: row.get(4)?,
        is_active: row.get(5)?,
        is_default: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            CategoryName, CategoryPatch, NewCategory, active_category_exists, create_category,
            delete_category, get_active_categories, get_active_category, update_category,
        },
        kind::Kind,
        test_utils::{create_test_user, get_test_connection},
        user::UserID,
    };

    use super::get_category;

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: CategoryName::new_unchecked(name),
            kind: Kind::Expense,
            color: "#FF0000".to_owned(),
            is_active: true,
        }
    }

    fn get_connection_and_users() -> (Connection, UserID, UserID) {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection).id;
        let bob = create_test_user("bob", &connection).id;

        (connection, alice, bob)
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, alice, _) = get_connection_and_users();

        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        assert!(category.id > 0);
        assert_eq!(category.user_id, alice);
        assert!(category.is_active);
        assert!(!category.is_default);
        assert_eq!(category.created_at, category.updated_at);
        assert_eq!(get_category(category.id, alice, &connection), Ok(category));
    }

    #[test]
    fn duplicate_name_for_same_user_fails() {
        let (connection, alice, _) = get_connection_and_users();
        create_category(new_category("Food"), alice, &connection).unwrap();

        let result = create_category(new_category("Food"), alice, &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName));
    }

    #[test]
    fn same_name_for_different_users_succeeds() {
        let (connection, alice, bob) = get_connection_and_users();
        create_category(new_category("Food"), alice, &connection).unwrap();

        let result = create_category(new_category("Food"), bob, &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn get_category_is_scoped_to_owner() {
        let (connection, alice, bob) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        assert_eq!(
            get_category(category.id, bob, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn inactive_categories_are_hidden() {
        let (connection, alice, _) = get_connection_and_users();
        let active = create_category(new_category("Food"), alice, &connection).unwrap();
        let mut inactive = new_category("Old");
        inactive.is_active = false;
        let inactive = create_category(inactive, alice, &connection).unwrap();

        assert_eq!(
            get_active_categories(alice, &connection),
            Ok(vec![active.clone()])
        );
        assert_eq!(
            get_active_category(inactive.id, alice, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            active_category_exists(inactive.id, alice, &connection),
            Ok(false)
        );
        assert_eq!(
            active_category_exists(active.id, alice, &connection),
            Ok(true)
        );
    }

    #[test]
    fn active_categories_are_sorted_by_name_and_owner_scoped() {
        let (connection, alice, bob) = get_connection_and_users();
        let zoo = create_category(new_category("Zoo"), alice, &connection).unwrap();
        let art = create_category(new_category("Art"), alice, &connection).unwrap();
        create_category(new_category("Bills"), bob, &connection).unwrap();

        assert_eq!(get_active_categories(alice, &connection), Ok(vec![art, zoo]));
    }

    #[test]
    fn active_category_exists_is_false_for_other_users() {
        let (connection, alice, bob) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        assert_eq!(
            active_category_exists(category.id, bob, &connection),
            Ok(false)
        );
    }

    #[test]
    fn update_category_applies_patch() {
        let (connection, alice, _) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        let updated = update_category(
            category.id,
            alice,
            CategoryPatch {
                name: Some(CategoryName::new_unchecked("Groceries")),
                is_active: Some(false),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.name, CategoryName::new_unchecked("Groceries"));
        assert!(!updated.is_active);
        assert_eq!(updated.kind, category.kind);
        assert_eq!(updated.color, category.color);
        assert_eq!(updated.user_id, category.user_id);
        assert_eq!(updated.created_at, category.created_at);
    }

    #[test]
    fn update_category_can_reactivate() {
        let (connection, alice, _) = get_connection_and_users();
        let mut inactive = new_category("Old");
        inactive.is_active = false;
        let category = create_category(inactive, alice, &connection).unwrap();

        let updated = update_category(
            category.id,
            alice,
            CategoryPatch {
                is_active: Some(true),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert!(updated.is_active);
    }

    #[test]
    fn update_category_of_other_user_fails() {
        let (connection, alice, bob) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        let result = update_category(
            category.id,
            bob,
            CategoryPatch {
                color: Some("#000000".to_owned()),
                ..Default::default()
            },
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
        assert_eq!(get_category(category.id, alice, &connection), Ok(category));
    }

    #[test]
    fn update_category_to_existing_name_fails() {
        let (connection, alice, _) = get_connection_and_users();
        create_category(new_category("Food"), alice, &connection).unwrap();
        let other = create_category(new_category("Rent"), alice, &connection).unwrap();

        let result = update_category(
            other.id,
            alice,
            CategoryPatch {
                name: Some(CategoryName::new_unchecked("Food")),
                ..Default::default()
            },
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategoryName));
    }

    #[test]
    fn rename_of_other_users_category_is_missing_even_if_name_is_taken() {
        let (connection, alice, bob) = get_connection_and_users();
        create_category(new_category("Food"), alice, &connection).unwrap();
        let bobs_category = create_category(new_category("Rent"), bob, &connection).unwrap();

        let result = update_category(
            bobs_category.id,
            alice,
            CategoryPatch {
                name: Some(CategoryName::new_unchecked("Food")),
                ..Default::default()
            },
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
        assert_eq!(
            get_category(bobs_category.id, bob, &connection),
            Ok(bobs_category)
        );
    }

    #[test]
    fn update_category_to_own_name_succeeds() {
        let (connection, alice, _) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        let result = update_category(
            category.id,
            alice,
            CategoryPatch {
                name: Some(CategoryName::new_unchecked("Food")),
                ..Default::default()
            },
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn empty_patch_returns_category_unchanged() {
        let (connection, alice, bob) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        assert_eq!(
            update_category(category.id, alice, CategoryPatch::default(), &connection),
            Ok(category.clone())
        );
        assert_eq!(
            update_category(category.id, bob, CategoryPatch::default(), &connection),
            Err(Error::UpdateMissingCategory)
        );
    }

    #[test]
    fn delete_category_succeeds() {
        let (connection, alice, _) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        assert_eq!(delete_category(category.id, alice, &connection), Ok(()));
        assert_eq!(
            get_category(category.id, alice, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_category_of_other_user_fails() {
        let (connection, alice, bob) = get_connection_and_users();
        let category = create_category(new_category("Food"), alice, &connection).unwrap();

        assert_eq!(
            delete_category(category.id, bob, &connection),
            Err(Error::DeleteMissingCategory)
        );
        assert_eq!(get_category(category.id, alice, &connection), Ok(category));
    }
}
