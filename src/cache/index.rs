//! Recency Index Module
//!
//! Tracks live store keys in access order for LRU eviction and expiry sweeps.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::cache::Node;

/// Null link marker.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot {
    node: Node,
    prev: usize,
    next: usize,
}

// == Recency Index ==
/// Ordered set of nodes, oldest at the head and newest at the tail.
///
/// Nodes live in a slot arena linked by index; `positions` maps each key to
/// its slot. Every key in `positions` owns exactly one occupied slot reachable
/// from `head`, and no key appears twice.
#[derive(Debug)]
pub struct RecencyIndex {
    /// Key to slot lookup
    positions: HashMap<String, usize>,
    /// Slot arena; `None` marks a free slot
    slots: Vec<Option<Slot>>,
    /// Free slot indices available for reuse
    free: Vec<usize>,
    /// Oldest node
    head: usize,
    /// Newest node
    tail: usize,
}

impl Default for RecencyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    // == Touch ==
    /// Marks a key as visited at `now` and moves it to the tail.
    ///
    /// Unknown keys are inserted at the tail.
    pub fn touch(&mut self, key: &str, now: DateTime<Utc>) {
        if let Some(&idx) = self.positions.get(key) {
            self.unlink(idx);
            self.slot_mut(idx).node.last_visit = now;
            self.push_tail(idx);
            return;
        }

        let slot = Slot {
            node: Node::new(key.to_string(), now),
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.push_tail(idx);
        self.positions.insert(key.to_string(), idx);
    }

    // == Remove ==
    /// Removes a key, returning its node if it was tracked.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let idx = self.positions.remove(key)?;
        self.unlink(idx);
        self.free.push(idx);
        self.slots[idx].take().map(|slot| slot.node)
    }

    // == Peek Oldest ==
    /// Returns the least recently visited node without removing it.
    pub fn peek_oldest(&self) -> Option<&Node> {
        self.slot(self.head).map(|slot| &slot.node)
    }

    // == Get ==
    /// Returns the node tracked for `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.positions
            .get(key)
            .and_then(|&idx| self.slot(idx))
            .map(|slot| &slot.node)
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    // == Iter ==
    /// Iterates nodes from oldest to newest.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    // == Clear ==
    /// Empties the index, returning the removed keys oldest first.
    pub fn clear(&mut self) -> Vec<String> {
        let keys = self.iter().map(|node| node.key.clone()).collect();
        self.positions.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        keys
    }

    fn slot(&self, idx: usize) -> Option<&Slot> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, idx: usize) -> &mut Slot {
        self.slots[idx]
            .as_mut()
            .expect("linked index points at an occupied slot")
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slot_mut(idx);
            let links = (slot.prev, slot.next);
            slot.prev = NIL;
            slot.next = NIL;
            links
        };
        if prev == NIL {
            self.head = next;
        } else {
            self.slot_mut(prev).next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slot_mut(next).prev = prev;
        }
    }

    fn push_tail(&mut self, idx: usize) {
        let old_tail = self.tail;
        {
            let slot = self.slot_mut(idx);
            slot.prev = old_tail;
            slot.next = NIL;
        }
        if old_tail == NIL {
            self.head = idx;
        } else {
            self.slot_mut(old_tail).next = idx;
        }
        self.tail = idx;
    }
}

// == Iterator ==
/// Oldest-to-newest iterator over a [`RecencyIndex`].
pub struct Iter<'a> {
    index: &'a RecencyIndex,
    cursor: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.index.slot(self.cursor)?;
        self.cursor = slot.next;
        Some(&slot.node)
    }
}
