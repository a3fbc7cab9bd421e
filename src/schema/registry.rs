//! Schema registry
//!
//! Holds every schema a route may reference. Built once at startup and
//! read-only afterwards.

use std::collections::HashMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Schema, SchemaRef};

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema. Names are unique.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        if self.schemas.contains_key(schema.name()) {
            return Err(SchemaError::DuplicateSchema(schema.name().to_string()));
        }
        self.schemas.insert(schema.name().to_string(), schema);
        Ok(())
    }

    pub fn get(&self, schema: SchemaRef) -> Option<&Schema> {
        self.schemas.get(schema.name())
    }

    pub fn require(&self, schema: SchemaRef) -> SchemaResult<&Schema> {
        self.get(schema)
            .ok_or_else(|| SchemaError::UnknownSchema(schema.name().to_string()))
    }

    /// Fail if any of `refs` is missing
    pub fn ensure_registered<'r>(&self, refs: impl IntoIterator<Item = &'r SchemaRef>) -> SchemaResult<()> {
        for schema in refs {
            self.require(*schema)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
