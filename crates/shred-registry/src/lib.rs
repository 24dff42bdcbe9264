//! # shred-registry — Schema Repository
//!
//! The shredder resolves every schema reference through one interface,
//! [`SchemaRepository`]: a [`SchemaKey`] in, a schema document out, or a
//! [`RegistryError`] explaining why not. The shredder itself performs no
//! retries and holds no registry state; timeouts and retry policy belong
//! to the repository implementation behind this trait.
//!
//! ## Implementations
//!
//! - [`DirRegistry`] — a static registry tree on disk, laid out as
//!   `<root>/<vendor>/<name>/<format>/<version>`.
//! - [`InMemoryRegistry`] — a builder-style map registry for tests and
//!   embedded use.
//! - [`CachingRegistry`] — a read-through cache over any repository, safe
//!   for concurrent readers.
//!
//! ## Crate Policy
//!
//! - Depends only on `shred-core` internally.
//! - All implementations are `Send + Sync`; one repository instance may be
//!   shared read-only across concurrent shredding calls.

pub mod cache;
pub mod dir;
pub mod error;
pub mod memory;

pub use cache::CachingRegistry;
pub use dir::DirRegistry;
pub use error::RegistryError;
pub use memory::InMemoryRegistry;

use std::sync::Arc;

use serde_json::Value;
use shred_core::SchemaKey;

/// Resolves a schema key to its schema document.
///
/// Implementations must be safe to share read-only across threads; the
/// shredder treats any resolve failure as terminal for the current event.
pub trait SchemaRepository: Send + Sync {
    /// Fetch the schema document for `key`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for unknown keys, and
    /// `Unreachable`/`Malformed` when the backing store cannot produce a
    /// JSON document for a key it should know.
    fn resolve(&self, key: &SchemaKey) -> Result<Arc<Value>, RegistryError>;
}
