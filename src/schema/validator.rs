//! Schema validator for request payloads
//!
//! Validation semantics:
//! - Fields are checked in declaration order: presence, type, then constraints
//! - Every violation is collected; nothing short-circuits across fields
//! - A field with the wrong type reports only the type violation
//! - Declared normalizations run before constraints and are kept in the output
//! - Undeclared keys pass through untouched
//! - No coercion: "5" is not a number

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::{SchemaResult, ValidationError};
use super::registry::SchemaRegistry;
use super::types::{is_out_of_range_integer, received_type, Constraint, FieldDef, FieldType, Schema, SchemaRef};

/// A payload that passed its schema, normalized where declared
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload(Value);

impl ValidatedPayload {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Deserialize into the handler's input type
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.0)
    }
}

/// Validates a payload against a schema.
///
/// Returns every violation in one pass so a caller can fix them all at once.
pub fn validate(schema: &Schema, payload: &Value) -> Result<ValidatedPayload, Vec<ValidationError>> {
    let obj = payload.as_object().ok_or_else(|| {
        vec![ValidationError::payload(format!(
            "The request body must be an object, but received {}.",
            received_type(payload, &FieldType::String)
        ))]
    })?;

    let mut output: Map<String, Value> = obj.clone();
    let mut errors = Vec::new();

    for field in schema.fields() {
        match obj.get(&field.name) {
            None => {
                if field.required {
                    errors.push(ValidationError::required(&field.name));
                }
            }
            Some(value) => {
                if let Some(normalized) = validate_field(field, value, &mut errors) {
                    output.insert(field.name.clone(), normalized);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(ValidatedPayload(Value::Object(output)))
    } else {
        Err(errors)
    }
}

/// Checks one present field; returns the normalized value when it changed.
fn validate_field(field: &FieldDef, value: &Value, errors: &mut Vec<ValidationError>) -> Option<Value> {
    if field.field_type == FieldType::Integer && is_out_of_range_integer(value) {
        errors.push(ValidationError::out_of_range(&field.name));
        return None;
    }

    if !field.field_type.accepts(value) {
        errors.push(ValidationError::type_mismatch(
            &field.name,
            field.field_type.type_name(),
            received_type(value, &field.field_type),
        ));
        return None;
    }

    match value {
        Value::String(text) => {
            let normalized = field
                .normalizations
                .iter()
                .fold(text.clone(), |acc, n| n.apply(&acc));

            check_text(field, &normalized, errors);

            if normalized != *text {
                Some(Value::String(normalized))
            } else {
                None
            }
        }
        Value::Number(n) => {
            let number = n.as_f64()?;
            check_number(field, number, errors);

            // 3.0 declared as integer leaves as 3; range was checked above
            match field.field_type {
                FieldType::Integer if n.is_f64() => Some(Value::from(number as i64)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn check_text(field: &FieldDef, text: &str, errors: &mut Vec<ValidationError>) {
    if let FieldType::Enum(allowed) = &field.field_type {
        if !allowed.iter().any(|a| a == text) {
            errors.push(ValidationError::not_in_enum(&field.name, allowed));
        }
    }

    let len = text.chars().count();
    for constraint in &field.constraints {
        match constraint {
            Constraint::MinLength(min) if len < *min => {
                errors.push(ValidationError::too_short(&field.name, *min));
            }
            Constraint::MaxLength(max) if len > *max => {
                errors.push(ValidationError::too_long(&field.name, *max));
            }
            Constraint::Pattern(rule) if !rule.is_match(text) => {
                errors.push(ValidationError::invalid(&field.name, rule.message.as_deref()));
            }
            _ => {}
        }
    }
}

fn check_number(field: &FieldDef, number: f64, errors: &mut Vec<ValidationError>) {
    for constraint in &field.constraints {
        match constraint {
            Constraint::Positive if number <= 0.0 => {
                errors.push(ValidationError::not_positive(&field.name));
            }
            Constraint::Min(min) if number < *min => {
                errors.push(ValidationError::below_min(&field.name, *min));
            }
            Constraint::Max(max) if number > *max => {
                errors.push(ValidationError::above_max(&field.name, *max));
            }
            _ => {}
        }
    }
}

/// Validator that resolves schemas by name from a registry.
///
/// Validation does not mutate its input and is deterministic.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Outer `Err` is a lookup failure (a wiring bug); inner `Err` is the
    /// list of payload violations.
    pub fn validate(
        &self,
        schema: SchemaRef,
        payload: &Value,
    ) -> SchemaResult<Result<ValidatedPayload, Vec<ValidationError>>> {
        let schema = self.registry.require(schema)?;
        Ok(validate(schema, payload))
    }
}
