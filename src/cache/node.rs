//! Cache Node Module
//!
//! A node records which store key is live and when it was last visited.
//! Values never live here; they stay in the backing store.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == Node ==
/// One live slot of the recency index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Derived store key
    pub key: String,
    /// Time of creation or last successful access
    pub last_visit: DateTime<Utc>,
}

impl Node {
    // == Constructor ==
    /// Creates a node visited at `now`.
    pub fn new(key: String, now: DateTime<Utc>) -> Self {
        Self {
            key,
            last_visit: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the node has been idle for longer than `expired`.
    ///
    /// Boundary condition: idle time exactly equal to `expired` is still live.
    /// If the clock went backwards since the last visit the node is live.
    pub fn is_expired(&self, now: DateTime<Utc>, expired: Duration) -> bool {
        match (now - self.last_visit).to_std() {
            Ok(idle) => idle > expired,
            Err(_) => false,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_node_fresh_is_live() {
        let node = Node::new("k".to_string(), at(0));
        assert!(!node.is_expired(at(0), Duration::from_secs(2)));
        assert!(!node.is_expired(at(1), Duration::from_secs(2)));
    }

    #[test]
    fn test_node_expiration_boundary_condition() {
        let node = Node::new("k".to_string(), at(0));

        // Exactly at the boundary the node is still live
        assert!(!node.is_expired(at(2), Duration::from_secs(2)));
        assert!(node.is_expired(at(2) + chrono::Duration::milliseconds(1), Duration::from_secs(2)));
        assert!(node.is_expired(at(3), Duration::from_secs(2)));
    }

    #[test]
    fn test_node_clock_went_backwards() {
        let node = Node::new("k".to_string(), at(100));
        assert!(!node.is_expired(at(0), Duration::from_secs(2)));
    }
}
