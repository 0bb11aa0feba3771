//! Rules for individual payload fields.
//!
//! Each rule takes the raw JSON value of a field and either converts it into
//! a typed value or returns a message describing what is wrong with it.

use serde_json::Value;

use crate::{
    category::CategoryName,
    database_id::{DatabaseId, parse_positive_id},
    kind::Kind,
    password::ValidatedPassword,
    timestamp::Timestamp,
    transaction::Amount,
};

/// The maximum number of characters in a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
/// The minimum number of characters in a username.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// "income" or "expense".
pub fn kind(value: &Value) -> Result<Kind, String> {
    value
        .as_str()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| "must be either income or expense".to_owned())
}

/// A positive number, rounded to the nearest cent.
pub fn amount(value: &Value) -> Result<Amount, String> {
    let number = value
        .as_f64()
        .ok_or_else(|| "must be a positive number".to_owned())?;

    Amount::new(number).map_err(|error| error.to_string())
}

/// The ID of a category, either as a JSON integer or a string of digits.
pub fn category_reference(value: &Value) -> Result<DatabaseId, String> {
    let id = match value {
        Value::Number(number) => number.as_i64().filter(|id| *id > 0),
        Value::String(text) => parse_positive_id(text),
        _ => None,
    };

    id.ok_or_else(|| "must be a valid category ID".to_owned())
}

/// A date or date time string.
pub fn date(value: &Value) -> Result<Timestamp, String> {
    value
        .as_str()
        .and_then(Timestamp::parse)
        .ok_or_else(|| "must be a valid date".to_owned())
}

/// A string of at most [MAX_DESCRIPTION_LENGTH] characters, trimmed.
pub fn description(value: &Value) -> Result<String, String> {
    let text = value
        .as_str()
        .ok_or_else(|| "must be a string".to_owned())?
        .trim();

    if text.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "must be at most {MAX_DESCRIPTION_LENGTH} characters long"
        ));
    }

    Ok(text.to_owned())
}

/// A non-empty category name, trimmed.
pub fn category_name(value: &Value) -> Result<CategoryName, String> {
    let text = value.as_str().ok_or_else(|| "must be a string".to_owned())?;

    CategoryName::new(text).map_err(|error| error.to_string())
}

/// A non-empty color token such as "#FF0000", trimmed.
pub fn color(value: &Value) -> Result<String, String> {
    non_empty_string(value)
}

/// `true` or `false`.
pub fn boolean(value: &Value) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| "must be true or false".to_owned())
}

/// A string of decimal digits, as found in query strings.
pub fn non_negative_integer(value: &Value) -> Result<u64, String> {
    let message = || "must be a non-negative integer".to_owned();

    match value {
        Value::String(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            text.parse().map_err(|_| message())
        }
        Value::Number(number) => number.as_u64().ok_or_else(message),
        _ => Err(message()),
    }
}

/// A username of at least [MIN_USERNAME_LENGTH] characters, trimmed.
pub fn username(value: &Value) -> Result<String, String> {
    let text = value
        .as_str()
        .ok_or_else(|| "must be a string".to_owned())?
        .trim();

    if text.chars().count() < MIN_USERNAME_LENGTH {
        return Err(format!(
            "must be at least {MIN_USERNAME_LENGTH} characters long"
        ));
    }

    Ok(text.to_owned())
}

/// The name a user is displayed as.
pub fn display_name(value: &Value) -> Result<String, String> {
    non_empty_string(value)
}

/// A password that is long enough to be accepted.
pub fn password(value: &Value) -> Result<ValidatedPassword, String> {
    let text = value.as_str().ok_or_else(|| "must be a string".to_owned())?;

    ValidatedPassword::new(text).map_err(|error| error.to_string())
}

/// Any string, as given. Used where the value is only compared, e.g. log in.
pub fn any_string(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| "must be a string".to_owned())
}

fn non_empty_string(value: &Value) -> Result<String, String> {
    let text = value
        .as_str()
        .ok_or_else(|| "must be a string".to_owned())?
        .trim();

    if text.is_empty() {
        return Err("must not be empty".to_owned());
    }

    Ok(text.to_owned())
}
