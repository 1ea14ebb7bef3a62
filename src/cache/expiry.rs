//! Expiry Queue Module
//!
//! Insertion-ordered record of cache insertions used for head eviction.

use std::collections::VecDeque;

// == Queue Node ==
/// One insertion into a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNode<K> {
    /// Key that was inserted
    pub key: K,
    /// Generation of the entry this node was created for
    pub generation: u64,
    /// Tick at which the insertion happened
    pub created_at: i64,
}

// == Expiry Queue ==
/// Tracks insertion order for oldest-first expiry.
///
/// Nodes are stored in a VecDeque where:
/// - Front = Oldest insertion (first to expire)
/// - Back = Newest insertion
///
/// All entries of a cache share one TTL and are inserted with
/// non-decreasing ticks, so insertion order is expiry order. Re-inserting a
/// key does not remove its earlier node; the cache recognises such orphans
/// by comparing generations and drops them when they reach the front.
#[derive(Debug)]
pub struct ExpiryQueue<K> {
    order: VecDeque<QueueNode<K>>,
}

impl<K> Default for ExpiryQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ExpiryQueue<K> {
    // == Constructor ==
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records an insertion at the back of the queue.
    pub fn push(&mut self, key: K, generation: u64, created_at: i64) {
        self.order.push_back(QueueNode {
            key,
            generation,
            created_at,
        });
    }

    // == Peek Oldest ==
    /// Returns the oldest node without removing it.
    pub fn peek_oldest(&self) -> Option<&QueueNode<K>> {
        self.order.front()
    }

    // == Pop Oldest ==
    /// Removes and returns the oldest node.
    pub fn pop_oldest(&mut self) -> Option<QueueNode<K>> {
        self.order.pop_front()
    }

    // == Retain ==
    /// Keeps only the nodes matching `keep`, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&QueueNode<K>) -> bool,
    {
        self.order.retain(keep);
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of nodes, orphans included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
