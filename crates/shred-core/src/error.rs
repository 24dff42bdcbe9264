//! # Error Types — Failures as Data
//!
//! The shredder's central error-handling rule is that validation failures
//! are accumulated and returned, never thrown. [`ShredError`] is the unit
//! of that accumulation: a field-attributed, human-readable message that
//! survives all the way to the failed-events sink.
//!
//! Construction-time failures of the core value types ([`SchemaKeyError`],
//! [`TimestampError`]) use `thiserror` for derive-based `Display` and
//! `Error` implementations; they convert into `ShredError` messages at the
//! validation boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single shredding failure, attributed to the input field that caused it.
///
/// `field` names the offending input: `"ue_properties"`, `"context"`, or
/// `"context[<i>]"` for an individual context element. `message` carries the
/// parse, shape, resolution, or constraint detail an operator needs to
/// locate the defect without re-parsing the event.
///
/// This is deliberately not a `std::error::Error`: it is the unit of
/// accumulated validation output, serialized into the failed-events sink,
/// not a propagated failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShredError {
    /// Name of the input field the failure is attributed to.
    pub field: String,
    /// Human-readable failure detail.
    pub message: String,
}

impl ShredError {
    /// Create a new field-attributed error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ShredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error constructing a [`SchemaKey`](crate::SchemaKey) from a URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaKeyError {
    /// The reference does not start with the `iglu:` scheme.
    #[error("schema reference {uri:?} is missing the iglu: scheme")]
    MissingScheme {
        /// The offending reference.
        uri: String,
    },

    /// The reference path is not exactly vendor/name/format/version.
    #[error("schema reference {uri:?} must be iglu:<vendor>/<name>/<format>/<version>")]
    MalformedPath {
        /// The offending reference.
        uri: String,
    },

    /// A path segment is empty.
    #[error("schema reference {uri:?} has an empty {segment} segment")]
    EmptySegment {
        /// The offending reference.
        uri: String,
        /// Which segment was empty.
        segment: &'static str,
    },

    /// The version is not a SchemaVer triple.
    #[error("schema version {version:?} is not a SchemaVer triple (MODEL-REVISION-ADDITION)")]
    InvalidVersion {
        /// The offending version string.
        version: String,
    },
}

/// Error constructing a [`Timestamp`](crate::Timestamp) from a string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The timestamp carries a non-Z timezone offset.
    #[error("timestamp must use Z suffix (UTC only), got {raw:?}")]
    NonUtc {
        /// The offending timestamp string.
        raw: String,
    },

    /// The timestamp is not valid RFC 3339.
    #[error("invalid RFC 3339 timestamp {raw:?}: {reason}")]
    Invalid {
        /// The offending timestamp string.
        raw: String,
        /// Parser detail.
        reason: String,
    },
}
