//! # Tabular Projection — Flat Rows for Per-Schema Tables
//!
//! Each shredded document is routed to the table of its schema key, keyed
//! by `(schema_vendor, schema_name, schema_format, schema_version)` and
//! distributed on `root_id` with a sort key on `root_tstamp`. The flat row
//! carries the engine-owned columns plus one column per top-level property
//! of the validated payload: the column set is driven by the schema's own
//! declared properties, never copied from any particular table.
//!
//! Rows serialize through JCS (RFC 8785), so the same document always
//! produces the same bytes regardless of payload key order.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::lineage::ShreddedDocument;

/// Engine-owned columns present on every flat row. A payload property with
/// one of these names cannot be projected; lineage columns must stay
/// authoritative or downstream joins silently corrupt.
pub const RESERVED_COLUMNS: [&str; 9] = [
    "schema_vendor",
    "schema_name",
    "schema_format",
    "schema_version",
    "root_id",
    "root_tstamp",
    "ref_root",
    "ref_tree",
    "ref_parent",
];

/// Error projecting a shredded document to its flat row.
#[derive(Error, Debug)]
pub enum TabularError {
    /// A payload property collides with an engine-owned column.
    #[error("payload property {column:?} collides with an engine-owned column")]
    ReservedColumn {
        /// The colliding property name.
        column: String,
    },

    /// The validated payload is not a JSON object, so it has no columns.
    #[error("payload for {schema} is not a JSON object and has no columns")]
    NonObjectPayload {
        /// The schema whose payload cannot be projected.
        schema: String,
    },

    /// Canonical serialization failed.
    #[error("canonical serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShreddedDocument {
    /// Project this document to the flat row of its per-schema table.
    ///
    /// # Errors
    ///
    /// Returns `TabularError::NonObjectPayload` if the schema validated a
    /// non-object payload, and `TabularError::ReservedColumn` if a payload
    /// property collides with an engine-owned column.
    pub fn flat_row(&self) -> Result<Map<String, Value>, TabularError> {
        let Some(payload) = self.data.as_object() else {
            return Err(TabularError::NonObjectPayload {
                schema: self.schema.to_string(),
            });
        };

        let mut row = Map::new();
        row.insert(
            "schema_vendor".to_string(),
            Value::String(self.schema.vendor().to_string()),
        );
        row.insert(
            "schema_name".to_string(),
            Value::String(self.schema.name().to_string()),
        );
        row.insert(
            "schema_format".to_string(),
            Value::String(self.schema.format().to_string()),
        );
        row.insert(
            "schema_version".to_string(),
            Value::String(self.schema.version().to_string()),
        );
        row.insert(
            "root_id".to_string(),
            Value::String(self.root_id.as_str().to_string()),
        );
        row.insert(
            "root_tstamp".to_string(),
            Value::String(self.root_tstamp.to_iso8601()),
        );
        row.insert("ref_root".to_string(), Value::String(self.ref_root.clone()));
        row.insert(
            "ref_tree".to_string(),
            Value::Array(
                self.ref_tree
                    .iter()
                    .map(|node| Value::String(node.clone()))
                    .collect(),
            ),
        );
        row.insert(
            "ref_parent".to_string(),
            Value::String(self.ref_parent.clone()),
        );

        for (property, value) in payload {
            if RESERVED_COLUMNS.contains(&property.as_str()) {
                return Err(TabularError::ReservedColumn {
                    column: property.clone(),
                });
            }
            row.insert(property.clone(), value.clone());
        }

        Ok(row)
    }

    /// Serialize the flat row canonically (RFC 8785): sorted keys, compact
    /// separators, deterministic bytes.
    pub fn to_canonical_row(&self) -> Result<String, TabularError> {
        let row = self.flat_row()?;
        Ok(serde_jcs::to_string(&Value::Object(row))?)
    }
}
