//! Configuration Module
//!
//! Holds the knobs of a single cache instance. Nothing here is global, so
//! several caches in one process never interfere.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default entry lifetime since last visit
pub const DEFAULT_EXPIRED: Duration = Duration::from_secs(60 * 60);
/// Default maximum number of tracked entries
pub const DEFAULT_MAX_ELEMENT_SIZE: usize = 1024;
/// Default pause between two GC sweeps
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10 * 60);
/// Default cap on removals performed by one sweep
pub const DEFAULT_GC_MAX_REMOVED: usize = 100;

/// Cache configuration parameters.
///
/// All values are fixed once the cache is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries idle for longer than this are expired
    pub expired: Duration,
    /// Maximum number of entries the cache keeps
    pub max_element_size: usize,
    /// Interval between background sweeps
    pub gc_interval: Duration,
    /// Maximum number of entries one sweep may remove
    pub gc_max_removed: usize,
}

impl CacheConfig {
    /// Creates a config with the given expiry and capacity and default GC knobs.
    pub fn new(expired: Duration, max_element_size: usize) -> Self {
        Self {
            expired,
            max_element_size,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_EXPIRED_SECS` - Entry lifetime in seconds (default: 3600)
    /// - `CACHE_MAX_ELEMENTS` - Maximum cache entries (default: 1024)
    /// - `CACHE_GC_INTERVAL_SECS` - Sweep frequency in seconds (default: 600)
    /// - `CACHE_GC_MAX_REMOVED` - Removals per sweep (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            expired: env_parse("CACHE_EXPIRED_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.expired),
            max_element_size: env_parse("CACHE_MAX_ELEMENTS")
                .unwrap_or(defaults.max_element_size),
            gc_interval: env_parse("CACHE_GC_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.gc_interval),
            gc_max_removed: env_parse("CACHE_GC_MAX_REMOVED")
                .unwrap_or(defaults.gc_max_removed),
        }
    }

    // == Validate ==
    /// Rejects values the cache cannot work with.
    ///
    /// A zero `gc_max_removed` is allowed and turns sweeps into no-ops.
    pub fn validate(&self) -> Result<()> {
        if self.expired.is_zero() {
            return Err(CacheError::InvalidConfig(
                "expiry duration must be positive".to_string(),
            ));
        }
        if self.max_element_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max element size must be positive".to_string(),
            ));
        }
        if self.gc_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "gc interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expired: DEFAULT_EXPIRED,
            max_element_size: DEFAULT_MAX_ELEMENT_SIZE,
            gc_interval: DEFAULT_GC_INTERVAL,
            gc_max_removed: DEFAULT_GC_MAX_REMOVED,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.expired, Duration::from_secs(3600));
        assert_eq!(config.max_element_size, 1024);
        assert_eq!(config.gc_interval, Duration::from_secs(600));
        assert_eq!(config.gc_max_removed, 100);
    }

    #[test]
    fn test_config_new_keeps_gc_defaults() {
        let config = CacheConfig::new(Duration::from_secs(2), 10);
        assert_eq!(config.expired, Duration::from_secs(2));
        assert_eq!(config.max_element_size, 10);
        assert_eq!(config.gc_interval, DEFAULT_GC_INTERVAL);
        assert_eq!(config.gc_max_removed, DEFAULT_GC_MAX_REMOVED);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_EXPIRED_SECS");
        env::remove_var("CACHE_MAX_ELEMENTS");
        env::remove_var("CACHE_GC_INTERVAL_SECS");
        env::remove_var("CACHE_GC_MAX_REMOVED");

        assert_eq!(CacheConfig::from_env(), CacheConfig::default());
    }

    #[test]
    fn test_config_validate() {
        assert!(CacheConfig::default().validate().is_ok());

        let mut config = CacheConfig::default();
        config.max_element_size = 0;
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));

        let mut config = CacheConfig::default();
        config.expired = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = CacheConfig::default();
        config.gc_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = CacheConfig::default();
        config.gc_max_removed = 0;
        assert!(config.validate().is_ok());
    }
}
