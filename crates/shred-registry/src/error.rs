//! # Registry Errors
//!
//! Failures of the schema-resolution path. At the validation boundary all
//! of these collapse into a single "unresolvable schema" message naming
//! the key; the distinction between variants exists for operators reading
//! registry logs, not for the shredder's control flow.

use thiserror::Error;

use shred_core::SchemaKey;

/// Error resolving a schema key against a repository.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The key does not exist in the registry.
    #[error("{key} not found in registry")]
    NotFound {
        /// The key that failed to resolve.
        key: SchemaKey,
    },

    /// The registry knows the key but could not produce its document.
    #[error("{key} could not be read: {reason}")]
    Unreachable {
        /// The key that failed to resolve.
        key: SchemaKey,
        /// Backing-store detail.
        reason: String,
    },

    /// The stored schema document is not valid JSON.
    #[error("{key} is not a valid JSON document: {reason}")]
    Malformed {
        /// The key that failed to resolve.
        key: SchemaKey,
        /// Parser detail.
        reason: String,
    },

    /// The registry itself could not be enumerated.
    #[error("schema registry at {root} is unavailable: {reason}")]
    Unavailable {
        /// The registry root that failed, rendered for display.
        root: String,
        /// Filesystem detail.
        reason: String,
    },
}
