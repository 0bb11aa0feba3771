#![allow(missing_docs)]

pub(crate) mod http;

use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState,
    db::initialize,
    password::PasswordHash,
    user::{User, create_user},
};

pub(crate) use http::{
    create_category_via_api, get_test_server, parse_json_body, register, register_and_log_in,
};

/// The bcrypt cost used in tests, the lowest bcrypt allows.
pub(crate) const TEST_PASSWORD_HASH_COST: u32 = 4;

/// The password of every user created through [register].
pub(crate) const TEST_PASSWORD: &str = "password";

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

#[track_caller]
pub(crate) fn create_test_user(username: &str, connection: &Connection) -> User {
    create_user(
        username,
        "Test User",
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user.")
}

#[track_caller]
pub(crate) fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(connection, "foobar", Duration::hours(1))
        .expect("Could not create app state.")
        .with_password_hash_cost(TEST_PASSWORD_HASH_COST)
}
