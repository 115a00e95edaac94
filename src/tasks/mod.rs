//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a cache.
//!
//! # Tasks
//! - GC: Sweeps expired cache entries at the configured interval

mod gc;

pub use gc::{spawn_gc_task, GcHandle, MIN_GC_INTERVAL};
