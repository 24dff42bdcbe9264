//! # In-Memory Registry
//!
//! A map-backed registry for tests and embedded use. Built up front with
//! [`InMemoryRegistry::with_schema`], then shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use shred_core::SchemaKey;

use crate::error::RegistryError;
use crate::SchemaRepository;

/// A schema registry held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    schemas: HashMap<SchemaKey, Arc<Value>>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, builder-style.
    pub fn with_schema(mut self, key: SchemaKey, schema: Value) -> Self {
        self.insert(key, schema);
        self
    }

    /// Register a schema, replacing any previous document for the key.
    pub fn insert(&mut self, key: SchemaKey, schema: Value) {
        self.schemas.insert(key, Arc::new(schema));
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaRepository for InMemoryRegistry {
    fn resolve(&self, key: &SchemaKey) -> Result<Arc<Value>, RegistryError> {
        self.schemas
            .get(key)
            .map(Arc::clone)
            .ok_or_else(|| RegistryError::NotFound { key: key.clone() })
    }
}
