//! Schema error types
//!
//! Two very different failures live here:
//! - [`ValidationError`]: a request payload broke a constraint (per request, 400)
//! - [`SchemaError`]: a schema declaration is broken (startup, fatal)

use serde::Serialize;
use thiserror::Error;

/// One violated constraint in a request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Offending field; absent when the payload as a whole is wrong
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::field(field, format!("The field {} is required.", field))
    }

    pub fn type_mismatch(field: &str, expected: &str, received: &str) -> Self {
        Self::field(
            field,
            format!(
                "The field {} must be {} {}, but received {}.",
                field,
                article(expected),
                expected,
                received
            ),
        )
    }

    pub fn out_of_range(field: &str) -> Self {
        Self::field(
            field,
            format!(
                "The field {} is out of range. It must be between {} and {}.",
                field,
                i64::MIN,
                i64::MAX
            ),
        )
    }

    pub fn too_short(field: &str, min: usize) -> Self {
        Self::field(
            field,
            format!(
                "The field {} is too small. It should have at least {} characters.",
                field, min
            ),
        )
    }

    pub fn too_long(field: &str, max: usize) -> Self {
        Self::field(
            field,
            format!(
                "The field {} is too large. It should have at most {} characters.",
                field, max
            ),
        )
    }

    pub fn not_positive(field: &str) -> Self {
        Self::field(
            field,
            format!("The field {} is too small. It must be greater than 0.", field),
        )
    }

    pub fn below_min(field: &str, min: f64) -> Self {
        Self::field(
            field,
            format!("The field {} is too small. It must be at least {}.", field, min),
        )
    }

    pub fn above_max(field: &str, max: f64) -> Self {
        Self::field(
            field,
            format!("The field {} is too large. It must be at most {}.", field, max),
        )
    }

    pub fn not_in_enum(field: &str, allowed: &[String]) -> Self {
        Self::field(
            field,
            format!(
                "The field {} must be one of the following values: {}",
                field,
                allowed.join(", ")
            ),
        )
    }

    pub fn invalid(field: &str, message: Option<&str>) -> Self {
        match message {
            Some(msg) => Self::field(field, msg),
            None => Self::field(field, format!("The field {} is invalid.", field)),
        }
    }
}

/// Result type for schema construction and lookup
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Programmer/configuration errors in schema declarations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field declaration is inconsistent
    #[error("Malformed schema '{schema}': field '{field}' {reason}")]
    Malformed {
        schema: String,
        field: String,
        reason: String,
    },

    /// Two schemas registered under one name
    #[error("Schema '{0}' registered twice")]
    DuplicateSchema(String),

    /// A route or caller referenced a schema nobody registered
    #[error("Schema '{0}' not found")]
    UnknownSchema(String),
}

impl SchemaError {
    pub fn malformed(schema: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            schema: schema.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

fn article(noun: &str) -> &'static str {
    match noun.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
