//! # Caching Registry
//!
//! A read-through cache over any [`SchemaRepository`]. One shredding batch
//! resolves the same handful of keys thousands of times; the cache turns
//! every hit after the first into a map lookup.
//!
//! ## Concurrency
//!
//! The cache is `RwLock`-guarded and safe for concurrent readers; shredding
//! calls running in parallel across worker threads may share one instance.
//! Only successful resolutions are cached: a key that is absent now may be
//! registered before the next batch, and a transient read failure must not
//! be pinned for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use shred_core::SchemaKey;

use crate::error::RegistryError;
use crate::SchemaRepository;

/// A read-through cache wrapping another repository.
#[derive(Debug)]
pub struct CachingRegistry<R> {
    inner: R,
    cache: RwLock<HashMap<SchemaKey, Arc<Value>>>,
}

impl<R: SchemaRepository> CachingRegistry<R> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of schemas currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<R: SchemaRepository> SchemaRepository for CachingRegistry<R> {
    fn resolve(&self, key: &SchemaKey) -> Result<Arc<Value>, RegistryError> {
        if let Some(schema) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(Arc::clone(schema));
        }

        let schema = self.inner.resolve(key)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), Arc::clone(&schema));
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Repository that counts how many times it is hit.
    struct CountingRepository {
        inner: crate::InMemoryRegistry,
        hits: AtomicUsize,
    }

    impl SchemaRepository for CountingRepository {
        fn resolve(&self, key: &SchemaKey) -> Result<Arc<Value>, RegistryError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.inner.resolve(key)
        }
    }

    fn click_key() -> SchemaKey {
        SchemaKey::parse("iglu:com.acme/click/jsonschema/1-0-0").unwrap()
    }

    #[test]
    fn test_second_resolve_hits_cache() {
        let counting = CountingRepository {
            inner: crate::InMemoryRegistry::new().with_schema(click_key(), json!({"a": 1})),
            hits: AtomicUsize::new(0),
        };
        let registry = CachingRegistry::new(counting);

        registry.resolve(&click_key()).unwrap();
        registry.resolve(&click_key()).unwrap();

        assert_eq!(registry.inner.hits.load(Ordering::SeqCst), 1);
        assert_eq!(registry.cached_count(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let counting = CountingRepository {
            inner: crate::InMemoryRegistry::new(),
            hits: AtomicUsize::new(0),
        };
        let registry = CachingRegistry::new(counting);

        assert!(registry.resolve(&click_key()).is_err());
        assert!(registry.resolve(&click_key()).is_err());

        assert_eq!(registry.inner.hits.load(Ordering::SeqCst), 2);
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let registry = Arc::new(CachingRegistry::new(
            crate::InMemoryRegistry::new().with_schema(click_key(), json!({"a": 1})),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve(&click_key()).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(registry.cached_count(), 1);
    }
}
