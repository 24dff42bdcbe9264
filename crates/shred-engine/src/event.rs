//! # Canonical Event — Upstream Input Record
//!
//! The fully-enriched event record produced upstream. The engine only
//! reads it: `root_id` and `root_tstamp` become lineage columns on every
//! shredded document, and the two optional string fields carry the
//! embedded JSON to shred. Unknown upstream fields are ignored on
//! deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};

use shred_core::Timestamp;

/// Opaque upstream event identifier.
///
/// No format is assumed: the identifier is whatever the upstream pipeline
/// assigned, compared and copied verbatim into lineage columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Wrap an upstream identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One canonical event, as handed over by the execution framework.
///
/// `ue_properties` holds a JSON object with a schema envelope (the
/// unstructured event); `contexts` holds a JSON array of schema-enveloped
/// objects. Both are optional, and an explicit JSON `null` or empty string
/// counts as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct CanonicalEvent {
    /// Upstream event identifier, copied into every shredded document.
    pub root_id: EventId,
    /// Event timestamp, copied into every shredded document.
    pub root_tstamp: Timestamp,
    /// Embedded unstructured-event JSON, if any.
    #[serde(default)]
    pub ue_properties: Option<String>,
    /// Embedded context-array JSON, if any.
    #[serde(default)]
    pub contexts: Option<String>,
}
