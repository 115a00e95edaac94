//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its backing stores.
///
/// Misses never reach callers of [`LruCacher::get`](crate::cache::LruCacher::get)
/// as errors; `NotFound` is the signal a [`BackingStore`](crate::cache::BackingStore)
/// uses to report one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in the backing store
    #[error("cache: key not found: {0}")]
    NotFound(String),

    /// The backing store refused to store a value
    #[error("cache: not stored: {0}")]
    NotStored(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::NotFound("abc".to_string()).to_string(),
            "cache: key not found: abc"
        );
        assert_eq!(
            CacheError::NotStored("abc".to_string()).to_string(),
            "cache: not stored: abc"
        );
        assert!(CacheError::InvalidConfig("zero".to_string())
            .to_string()
            .contains("zero"));
    }
}
