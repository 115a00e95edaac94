//! LRU Cacher - An in-process LRU cache with time-based expiry
//!
//! Bounds a pluggable key/value store by size and idle time, with lazy
//! expiry on reads and a periodic background sweep.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{BackingStore, LruCacher, MemoryStore};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::{spawn_gc_task, GcHandle};
