//! Schema type definitions
//!
//! Supported field types:
//! - string
//! - number: any JSON number
//! - integer: a JSON number without a fractional part
//! - boolean
//! - enum: a string drawn from a fixed set
//!
//! Fields are kept in declaration order; validation reports violations in
//! that order.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};

/// Supported field types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// String restricted to the listed values
    Enum(Vec<String>),
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Enum(_) => "string",
        }
    }

    /// Whether `value` has this type (enum membership is a constraint, not a type)
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String | FieldType::Enum(_) => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => fits_i64(value),
            FieldType::Boolean => value.is_boolean(),
        }
    }

    fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Enum(_))
    }

    fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Integer)
    }
}

/// 2^63; `i64::MAX as f64` rounds up to this, so the upper bound is exclusive
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A whole number that converts to `i64` without loss
fn fits_i64(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() => true,
        Value::Number(n) if n.is_u64() => false,
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| is_whole(f) && f >= -I64_BOUND && f < I64_BOUND),
        _ => false,
    }
}

fn is_whole(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

/// Whole number too large for an integer field
pub fn is_out_of_range_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() => false,
        Value::Number(n) if n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(is_whole) && !fits_i64(value),
        _ => false,
    }
}

/// JSON type name of a received value, as reported in type violations
pub fn received_type(value: &Value, expected: &FieldType) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) if *expected == FieldType::Integer => "float",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Regex constraint with an optional custom message
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub source: String,
    pub message: Option<String>,
    compiled: Result<Regex, String>,
}

impl PatternRule {
    fn new(source: &str, message: Option<&str>) -> Self {
        Self {
            source: source.to_string(),
            message: message.map(str::to_string),
            compiled: Regex::new(source).map_err(|e| e.to_string()),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.as_ref().is_ok_and(|re| re.is_match(text))
    }
}

/// Range and format constraints, checked after the type
#[derive(Debug, Clone)]
pub enum Constraint {
    MinLength(usize),
    MaxLength(usize),
    /// Strictly greater than zero
    Positive,
    Min(f64),
    Max(f64),
    Pattern(PatternRule),
}

impl Constraint {
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::MinLength(_) => "min_length",
            Constraint::MaxLength(_) => "max_length",
            Constraint::Positive => "positive",
            Constraint::Min(_) => "min",
            Constraint::Max(_) => "max",
            Constraint::Pattern(_) => "pattern",
        }
    }

    fn applies_to(&self, field_type: &FieldType) -> bool {
        match self {
            Constraint::MinLength(_) | Constraint::MaxLength(_) | Constraint::Pattern(_) => {
                field_type.is_textual()
            }
            Constraint::Positive | Constraint::Min(_) | Constraint::Max(_) => field_type.is_numeric(),
        }
    }
}

/// Declared string normalization, applied before constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    Trim,
    Lowercase,
}

impl Normalization {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Normalization::Trim => text.trim().to_string(),
            Normalization::Lowercase => text.to_lowercase(),
        }
    }
}

/// Field definition
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub constraints: Vec<Constraint>,
    pub normalizations: Vec<Normalization>,
}

impl FieldDef {
    fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            constraints: Vec::new(),
            normalizations: Vec::new(),
        }
    }

    /// Create a required string field
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Create a required number field
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    /// Create a required integer field
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    /// Create a required boolean field
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Create a required enum field
    pub fn one_of(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(
            name,
            FieldType::Enum(values.iter().map(|v| v.to_string()).collect()),
        )
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.constraints.push(Constraint::MinLength(n));
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.constraints.push(Constraint::MaxLength(n));
        self
    }

    pub fn positive(mut self) -> Self {
        self.constraints.push(Constraint::Positive);
        self
    }

    pub fn min(mut self, n: f64) -> Self {
        self.constraints.push(Constraint::Min(n));
        self
    }

    pub fn max(mut self, n: f64) -> Self {
        self.constraints.push(Constraint::Max(n));
        self
    }

    /// Regex constraint; `message` replaces the generic "is invalid" text
    pub fn pattern(mut self, regex: &str, message: Option<&str>) -> Self {
        self.constraints.push(Constraint::Pattern(PatternRule::new(regex, message)));
        self
    }

    pub fn trim(mut self) -> Self {
        self.normalizations.push(Normalization::Trim);
        self
    }

    pub fn lowercase(mut self) -> Self {
        self.normalizations.push(Normalization::Lowercase);
        self
    }
}

/// Named reference to a registered schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaRef(&'static str);

impl SchemaRef {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Complete, structurally checked schema
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Build a schema, rejecting malformed declarations.
    ///
    /// Meant to run at startup: an error here is a programming mistake.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> SchemaResult<Self> {
        let schema = Self {
            name: name.into(),
            fields,
        };
        schema.validate_structure()?;
        Ok(schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Validates the schema structure itself (not a document)
    fn validate_structure(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();

        for field in &self.fields {
            let malformed = |reason: String| SchemaError::malformed(&self.name, &field.name, reason);

            if !seen.insert(field.name.as_str()) {
                return Err(malformed("declared twice".to_string()));
            }

            if let FieldType::Enum(values) = &field.field_type {
                if values.is_empty() {
                    return Err(malformed("enum has no allowed values".to_string()));
                }
            }

            if !field.normalizations.is_empty() && !field.field_type.is_textual() {
                return Err(malformed(format!(
                    "normalization declared on a {} field",
                    field.field_type.type_name()
                )));
            }

            for constraint in &field.constraints {
                if !constraint.applies_to(&field.field_type) {
                    return Err(malformed(format!(
                        "constraint '{}' does not apply to a {} field",
                        constraint.kind(),
                        field.field_type.type_name()
                    )));
                }
                if let Constraint::Pattern(rule) = constraint {
                    if let Err(reason) = &rule.compiled {
                        return Err(malformed(format!("invalid pattern: {}", reason)));
                    }
                }
            }

            let (min_len, max_len) = length_bounds(&field.constraints);
            if let (Some(min), Some(max)) = (min_len, max_len) {
                if min > max {
                    return Err(malformed(format!("min length {} exceeds max length {}", min, max)));
                }
            }
        }

        Ok(())
    }
}

fn length_bounds(constraints: &[Constraint]) -> (Option<usize>, Option<usize>) {
    let mut min = None;
    let mut max = None;
    for c in constraints {
        match c {
            Constraint::MinLength(n) => min = Some(*n),
            Constraint::MaxLength(n) => max = Some(*n),
            _ => {}
        }
    }
    (min, max)
}
