//! Validation of untyped JSON payloads into typed records.
//!
//! Each operation has a [RuleSet] that reads the fields it knows about from a
//! [Payload] through a [Validator]. Fields that are not read are ignored, so a
//! rule set doubles as the whitelist of fields an operation accepts. Every
//! violated rule is recorded and reported together in [ValidationErrors].

mod category;
pub mod rules;
mod transaction;

use std::{collections::HashMap, fmt::Display};

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// A JSON object as received from the client.
pub type Payload = Map<String, Value>;

/// A rule that checks a single field value and converts it into `T`.
///
/// The error is a message that completes the sentence "<field> ...".
pub type Rule<T> = fn(&Value) -> Result<T, String>;

/// A violated rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The name of the field as it appears in the payload.
    pub field: String,
    /// What is wrong with the value, e.g. "must be a positive number".
    pub message: String,
}

impl FieldError {
    /// Create a new error for `field`.
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// All the rules a payload violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual field errors, in the order they were found.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(FieldError::to_string).collect();

        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Reads fields from a payload and collects the errors of every failed rule.
pub struct Validator<'a> {
    payload: &'a Payload,
    errors: Vec<FieldError>,
}

impl<'a> Validator<'a> {
    /// Create a validator for `payload`.
    pub fn new(payload: &'a Payload) -> Self {
        Self {
            payload,
            errors: Vec::new(),
        }
    }

    /// Check a field that must be present.
    ///
    /// Returns `None` if the field is missing or fails `rule`, in which case
    /// the error has been recorded.
    pub fn required<T>(&mut self, field: &str, rule: Rule<T>) -> Option<T> {
        match self.payload.get(field) {
            Some(value) => self.check(field, value, rule),
            None => {
                self.errors.push(FieldError::new(field, "is required"));
                None
            }
        }
    }

    /// Check a field that may be omitted.
    ///
    /// A present field, including one set to `null`, must pass `rule`.
    /// Returns `None` if the field is missing or fails `rule`, in which case
    /// the error has been recorded.
    pub fn optional<T>(&mut self, field: &str, rule: Rule<T>) -> Option<T> {
        let value = self.payload.get(field)?;

        self.check(field, value, rule)
    }

    /// Return `output` if no rule was violated, otherwise all the errors.
    pub fn finish<T>(self, output: Option<T>) -> Result<T, ValidationErrors> {
        match output {
            Some(output) if self.errors.is_empty() => Ok(output),
            _ => Err(ValidationErrors(self.errors)),
        }
    }

    fn check<T>(&mut self, field: &str, value: &Value, rule: Rule<T>) -> Option<T> {
        match rule(value) {
            Ok(checked) => Some(checked),
            Err(message) => {
                self.errors.push(FieldError::new(field, &message));
                None
            }
        }
    }
}

/// The fields and rules of one kind of payload.
pub trait RuleSet: Sized {
    /// Read and check the fields of the payload.
    ///
    /// Implementations should return `None` only after recording an error on
    /// `fields`.
    fn read(fields: &mut Validator<'_>) -> Option<Self>;
}

/// Validate `payload` with the rules of `T`.
///
/// # Errors
///
/// Returns every rule the payload violated.
pub fn validate<T: RuleSet>(payload: &Payload) -> Result<T, ValidationErrors> {
    let mut fields = Validator::new(payload);
    let output = T::read(&mut fields);

    fields.finish(output)
}

/// Extracts a request body that must be a JSON object.
///
/// Malformed JSON, a missing JSON content type and bodies that are not
/// objects are reported as a validation error on the field "body".
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPayload(pub Payload);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(request, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("rejected request body: {}", rejection.body_text());
                request_error("body", "must be a JSON object")
            })?;

        match value {
            Value::Object(payload) => Ok(Self(payload)),
            _ => Err(request_error("body", "must be a JSON object")),
        }
    }
}

/// Extracts the query string as a payload of string values.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPayload(pub Payload);

impl<S> FromRequestParts<S> for QueryPayload
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("rejected query string: {}", rejection.body_text());
                request_error("query", "must be a valid query string")
            })?;

        let payload = params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        Ok(Self(payload))
    }
}

fn request_error(field: &str, message: &str) -> Error {
    Error::Validation(ValidationErrors(vec![FieldError::new(field, message)]))
}
