//! # Directory Registry
//!
//! A static schema registry laid out on disk:
//!
//! ```text
//! <root>/com.acme/click/jsonschema/1-0-0
//! <root>/com.acme/click/jsonschema/1-0-1
//! <root>/org.example/page_view/jsonschema/2-0-0
//! ```
//!
//! The version file holds the JSON Schema document; a `.json` extension on
//! the version file is also accepted. Documents are read on every resolve;
//! wrap a [`DirRegistry`] in a
//! [`CachingRegistry`](crate::CachingRegistry) when the same schemas are
//! resolved repeatedly.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use shred_core::SchemaKey;

use crate::error::RegistryError;
use crate::SchemaRepository;

/// A schema registry backed by a directory tree.
#[derive(Debug, Clone)]
pub struct DirRegistry {
    root: PathBuf,
}

impl DirRegistry {
    /// Create a registry rooted at `root`. The directory is not touched
    /// until the first resolve or enumeration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The registry root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The on-disk path for a key, without extension fallback.
    fn schema_path(&self, key: &SchemaKey) -> PathBuf {
        self.root
            .join(key.vendor())
            .join(key.name())
            .join(key.format())
            .join(key.version())
    }

    /// Enumerate every key resolvable in this registry, sorted.
    ///
    /// Walks the `<vendor>/<name>/<format>/<version>` tree; entries that do
    /// not form a well-formed key (stray files, editor droppings) are
    /// skipped rather than reported.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Unavailable` if the tree cannot be walked.
    pub fn schema_keys(&self) -> Result<Vec<SchemaKey>, RegistryError> {
        let mut keys = Vec::new();
        for vendor in subdirs(&self.root)? {
            for name in subdirs(&vendor.path)? {
                for format in subdirs(&name.path)? {
                    for version in entries(&format.path)? {
                        if !version.path.is_file() {
                            continue;
                        }
                        let version_name = match version.path.file_stem().and_then(|s| s.to_str())
                        {
                            Some(stem) => stem.to_string(),
                            None => continue,
                        };
                        if let Ok(key) = SchemaKey::new(
                            &vendor.name,
                            &name.name,
                            &format.name,
                            version_name,
                        ) {
                            keys.push(key);
                        }
                    }
                }
            }
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

impl SchemaRepository for DirRegistry {
    fn resolve(&self, key: &SchemaKey) -> Result<Arc<Value>, RegistryError> {
        let bare = self.schema_path(key);
        let path = if bare.is_file() {
            bare
        } else {
            let with_ext = bare.with_extension("json");
            if with_ext.is_file() {
                with_ext
            } else {
                return Err(RegistryError::NotFound { key: key.clone() });
            }
        };

        let content = fs::read_to_string(&path).map_err(|e| RegistryError::Unreachable {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        let schema: Value =
            serde_json::from_str(&content).map_err(|e| RegistryError::Malformed {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        Ok(Arc::new(schema))
    }
}

/// A directory entry with its UTF-8 file name.
struct NamedEntry {
    name: String,
    path: PathBuf,
}

fn entries(dir: &Path) -> Result<Vec<NamedEntry>, RegistryError> {
    let unavailable = |reason: String| RegistryError::Unavailable {
        root: dir.display().to_string(),
        reason,
    };
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| unavailable(e.to_string()))? {
        let entry = entry.map_err(|e| unavailable(e.to_string()))?;
        if let Some(name) = entry.file_name().to_str() {
            out.push(NamedEntry {
                name: name.to_string(),
                path: entry.path(),
            });
        }
    }
    Ok(out)
}

fn subdirs(dir: &Path) -> Result<Vec<NamedEntry>, RegistryError> {
    Ok(entries(dir)?
        .into_iter()
        .filter(|e| e.path.is_dir())
        .collect())
}
