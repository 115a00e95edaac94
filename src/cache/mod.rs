//! Cache Module
//!
//! LRU cache with idle-time expiry over a pluggable backing store.

mod clock;
mod engine;
mod index;
mod key;
mod node;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::LruCacher;
pub use index::RecencyIndex;
pub use key::{derive_key, KEY_PREFIX};
pub use node::Node;
pub use stats::CacheStats;
pub use store::{BackingStore, MemoryStore};
