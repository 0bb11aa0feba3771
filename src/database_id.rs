//! Database ID type definition and parsing of IDs from request paths.

use crate::Error;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// Parse a path parameter into a database ID.
///
/// Only positive base-10 integers are valid IDs. `resource` names the kind
/// of entity for the error message, e.g. "transaction".
///
/// # Errors
///
/// Returns [Error::MalformedId] if `raw_id` is not a valid ID.
pub fn parse_database_id(raw_id: &str, resource: &'static str) -> Result<DatabaseId, Error> {
    parse_positive_id(raw_id).ok_or(Error::MalformedId(resource))
}

/// Parse a string of ASCII digits into a positive ID.
///
/// Signs, whitespace and leading plus signs are rejected because `str::parse`
/// would otherwise accept some of them.
pub fn parse_positive_id(raw_id: &str) -> Option<DatabaseId> {
    if raw_id.is_empty() || !raw_id.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    raw_id.parse::<DatabaseId>().ok().filter(|id| *id > 0)
}
