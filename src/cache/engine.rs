//! Cache Engine Module
//!
//! LRU cache with idle-time expiry in front of a [`BackingStore`].
//!
//! The recency index and statistics sit behind one mutex. Every public
//! operation holds it for its whole duration, including the calls it makes
//! into the backing store, so operations are linearizable.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{derive_key, BackingStore, CacheStats, Clock, RecencyIndex, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;

/// State guarded by the engine lock.
#[derive(Debug, Default)]
struct CacheState {
    index: RecencyIndex,
    stats: CacheStats,
}

// == LRU Cacher ==
/// Size-bounded, expiring cache over a backing store.
pub struct LruCacher<V, S> {
    store: S,
    state: Mutex<CacheState>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    _value: PhantomData<fn() -> V>,
}

impl<V, S> LruCacher<V, S>
where
    S: BackingStore<V>,
{
    // == Constructors ==
    /// Creates a cache with the given expiry and capacity and default GC knobs.
    ///
    /// # Arguments
    /// * `store` - Backing store holding the values
    /// * `expired` - Idle time after which an entry expires
    /// * `max_element_size` - Maximum number of entries kept
    pub fn new(store: S, expired: Duration, max_element_size: usize) -> Self {
        Self::with_config(store, CacheConfig::new(expired, max_element_size))
    }

    /// Creates a cache from a full configuration.
    pub fn with_config(store: S, config: CacheConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(store: S, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            state: Mutex::new(CacheState::default()),
            config,
            clock,
            _value: PhantomData,
        }
    }

    // == Get ==
    /// Returns the value cached under `key`, or `None` on a miss.
    ///
    /// A hit moves the entry to the most recently used position. An entry
    /// idle for longer than the expiry is removed and reported as a miss.
    /// Store errors count as misses.
    pub fn get(&self, key: &str) -> Option<V> {
        let store_key = derive_key(key);
        let mut state = self.lock();
        let now = self.clock.now();

        let value = match self.store.get(&store_key) {
            Ok(value) => value,
            Err(_) => {
                // The store lost the value; drop any index entry left behind
                self.remove_entry(&mut state, &store_key);
                state.stats.record_miss();
                return None;
            }
        };

        let expired = state
            .index
            .get(&store_key)
            .map(|node| node.is_expired(now, self.config.expired));
        match expired {
            Some(true) => {
                debug!(key = %store_key, "Lazily expired entry");
                self.remove_entry(&mut state, &store_key);
                state.stats.record_expiration();
                state.stats.record_miss();
                return None;
            }
            Some(false) => state.index.touch(&store_key, now),
            None => {
                debug!(key = %store_key, "Repaired index entry for stored value");
                state.index.touch(&store_key, now);
            }
        }

        state.stats.record_hit();
        Some(value)
    }

    // == Put ==
    /// Stores `value` under `key` and marks it most recently used.
    ///
    /// When the cache grows past its capacity the single least recently
    /// used entry is evicted. Store write errors are returned.
    pub fn put(&self, key: &str, value: V) -> Result<()> {
        let store_key = derive_key(key);
        let mut state = self.lock();
        let now = self.clock.now();

        let is_new = !state.index.contains(&store_key);
        state.index.touch(&store_key, now);

        if let Err(err) = self.store.put(&store_key, value) {
            warn!(key = %store_key, error = %err, "Backing store rejected write");
            if is_new {
                state.index.remove(&store_key);
            }
            return Err(err);
        }

        if state.index.len() > self.config.max_element_size {
            if let Some(oldest) = state.index.peek_oldest().map(|node| node.key.clone()) {
                debug!(key = %oldest, "Evicting least recently used entry");
                self.remove_entry(&mut state, &oldest);
                state.stats.record_eviction();
            }
        }

        Ok(())
    }

    // == Delete ==
    /// Removes `key` from the cache. Deleting a missing key is a no-op.
    pub fn delete(&self, key: &str) {
        let store_key = derive_key(key);
        let mut state = self.lock();
        self.remove_entry(&mut state, &store_key);
    }

    // == Clear ==
    /// Removes every tracked entry from the index and the store.
    pub fn clear(&self) {
        let mut state = self.lock();
        let keys = state.index.clear();
        for key in &keys {
            self.delete_from_store(key);
        }
        debug!(removed = keys.len(), "Cleared cache");
    }

    // == Sweep ==
    /// Runs one GC pass and returns the number of expired entries removed.
    ///
    /// Walks from the oldest entry and stops after `gc_max_removed`
    /// removals, so expired entries past the cap wait for the next sweep or
    /// a lazy check in [`get`](Self::get).
    pub fn sweep(&self) -> usize {
        let mut state = self.lock();
        let now = self.clock.now();

        let expired: Vec<String> = state
            .index
            .iter()
            .filter(|node| node.is_expired(now, self.config.expired))
            .take(self.config.gc_max_removed)
            .map(|node| node.key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(&mut state, key);
            state.stats.record_expiration();
        }
        state.stats.record_sweep(now);

        if expired.is_empty() {
            debug!("GC sweep: no expired entries found");
        } else {
            info!(
                removed = expired.len(),
                remaining = state.index.len(),
                "GC sweep removed expired entries"
            );
        }
        expired.len()
    }

    // == Accessors ==
    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.index.len());
        stats
    }

    /// Returns the number of tracked entries.
    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the backing store. Writing to it directly bypasses the index.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_entry(&self, state: &mut CacheState, store_key: &str) {
        state.index.remove(store_key);
        self.delete_from_store(store_key);
    }

    fn delete_from_store(&self, store_key: &str) {
        if let Err(err) = self.store.delete(store_key) {
            debug!(key = %store_key, error = %err, "Ignoring backing store delete failure");
        }
    }
}

impl<V, S> std::fmt::Debug for LruCacher<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCacher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
