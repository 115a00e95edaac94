//! Backing Store Module
//!
//! The persistence seam behind the cache, plus a HashMap-backed adapter.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{CacheError, Result};

// == Backing Store ==
/// Key/value persistence used by [`LruCacher`](crate::cache::LruCacher).
///
/// Keys arrive already derived and namespaced by the cache. Values are
/// opaque to the cache; the store alone decides how they are kept.
pub trait BackingStore<V>: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: V) -> Result<()>;

    /// Returns the value under `key`, or [`CacheError::NotFound`] on a miss.
    fn get(&self, key: &str) -> Result<V>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

// == Memory Store ==
/// In-memory [`BackingStore`] over a `HashMap`.
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> MemoryStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> BackingStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn put(&self, key: &str, value: V) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<V> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
