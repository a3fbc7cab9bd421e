//! Schema Validator subsystem
//!
//! Request bodies are checked against declared schemas before any handler
//! touches them.
//!
//! # Design Principles
//!
//! - All violations reported in one pass
//! - No coercion; normalization only where a field declares it
//! - Malformed schemas fail at startup, never per request
//! - Deterministic validation

pub mod catalog;
mod errors;
mod registry;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult, ValidationError};
pub use registry::SchemaRegistry;
pub use types::{Constraint, FieldDef, FieldType, Normalization, Schema, SchemaRef};
pub use validator::{validate, SchemaValidator, ValidatedPayload};
