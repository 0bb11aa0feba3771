//! The route handlers for listing, creating, editing and deleting categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        Category, CategoryPatch, NewCategory, create_category, delete_category,
        get_active_categories, get_active_category, update_category,
    },
    database_id::parse_database_id,
    db::lock_connection,
    response::{ApiResponse, no_content},
    user::UserID,
    validation::{JsonPayload, validate},
};

/// The state needed by the category route handlers.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the active categories of the logged in user.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<ApiResponse<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let categories = get_active_categories(user_id, &connection)?;

    Ok(ApiResponse::ok(categories))
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiResponse<Category>, Error> {
    let new_category: NewCategory = validate(&payload)?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(new_category, user_id, &connection)?;

    tracing::debug!("user {user_id} created category {}", category.id);

    Ok(ApiResponse::created(category))
}

/// A route handler for getting a single active category.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_category_id): Path<String>,
) -> Result<ApiResponse<Category>, Error> {
    let category_id = parse_database_id(&raw_category_id, "category")?;

    let connection = lock_connection(&state.db_connection)?;
    let category = get_active_category(category_id, user_id, &connection)?;

    Ok(ApiResponse::ok(category))
}

/// A route handler for changing the name, type, color or active flag of a category.
pub async fn edit_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_category_id): Path<String>,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiResponse<Category>, Error> {
    let category_id = parse_database_id(&raw_category_id, "category")?;
    let patch: CategoryPatch = validate(&payload)?;

    let connection = lock_connection(&state.db_connection)?;
    let category = update_category(category_id, user_id, patch, &connection)?;

    Ok(ApiResponse::ok(category))
}

/// A route handler for deleting a category that no transaction uses.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_category_id): Path<String>,
) -> Result<Response, Error> {
    let category_id = parse_database_id(&raw_category_id, "category")?;

    let connection = lock_connection(&state.db_connection)?;
    delete_category(category_id, user_id, &connection)?;

    tracing::debug!("user {user_id} deleted category {category_id}");

    Ok(no_content())
}
