//! Key Derivation Module
//!
//! Maps caller keys to the fixed-length keys used by the recency index and
//! the backing store.

use sha2::{Digest, Sha256};

/// Namespace prefix mixed into every derived key
pub const KEY_PREFIX: &str = "CACHE_PREFIX";

// == Derive Key ==
/// Derives the store key for a logical key.
///
/// Returns the lowercase hex SHA-256 digest of `KEY_PREFIX + key`, always
/// 64 characters long.
pub fn derive_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(KEY_PREFIX.as_bytes());
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}
