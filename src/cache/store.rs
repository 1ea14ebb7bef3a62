//! Cache Store Module
//!
//! Tick-expiring keyed cache combining HashMap storage with an insertion-order queue.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, ExpiryQueue};
use crate::clock::TickSource;

// == Expiring Cache ==
/// Keyed cache whose entries expire a fixed number of ticks after insertion.
///
/// Expiry is lazy. A lookup only checks the entry it touches, and each
/// insert inspects only the oldest live entry and evicts it if stale. Work
/// per operation is therefore amortised O(1), but a pattern of many keys
/// inserted once and never touched again, followed by no further inserts,
/// leaves expired entries resident until [`ExpiringCache::purge_expired`]
/// runs. This is a deliberate size/latency trade-off.
///
/// The cache does no locking; it expects a single owner mutating it from
/// one thread. Wrap it in a lock to share it.
pub struct ExpiringCache<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<K, V>>,
    /// Insertion order, oldest first
    order: ExpiryQueue<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Time-to-live in ticks, shared by every entry
    ttl: i64,
    /// Host tick counter, read lazily on every operation
    ticks: Arc<dyn TickSource>,
    /// Generation assigned to the next insertion
    next_generation: u64,
}

impl<K, V> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.len())
            .field("queued", &self.order.len())
            .finish()
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty cache with the given TTL in ticks.
    ///
    /// The tick source is not read here.
    pub fn new(ttl: i64, ticks: Arc<dyn TickSource>) -> Self {
        Self {
            entries: HashMap::new(),
            order: ExpiryQueue::new(),
            stats: CacheStats::new(),
            ttl,
            ticks,
            next_generation: 0,
        }
    }

    // == Set ==
    /// Stores a value for `key`, superseding any earlier entry.
    ///
    /// Before inserting, the oldest live entry is evicted if it has expired.
    /// The new entry's age starts at zero.
    pub fn set(&mut self, key: K, value: V) {
        let now = self.ticks.current_tick();
        self.check_first_expiry(now);

        let generation = self.next_generation;
        self.next_generation += 1;

        self.order.push(key.clone(), generation, now);
        self.entries
            .insert(key.clone(), CacheEntry::new(key, value, now, generation));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Set And Get ==
    /// Stores a value and returns a reference to the stored copy.
    pub fn set_and_get(&mut self, key: K, value: V) -> &V {
        self.set(key.clone(), value);
        &self.entries[&key].value
    }

    // == Get ==
    /// Retrieves a fresh value by key.
    ///
    /// An expired entry is removed and reported as absent. Its queue node is
    /// left behind and discarded when it reaches the front.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.ticks.current_tick();
        if !self.evict_if_expired(key, now) {
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Get Or Default ==
    /// Retrieves a fresh value, or `V::default()` when absent or expired.
    ///
    /// A stored default is indistinguishable from a miss; use
    /// [`ExpiringCache::get`] when that matters.
    pub fn get_or_default(&mut self, key: &K) -> V
    where
        V: Default + Clone,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    // == Contains ==
    /// Returns true if a fresh entry exists for `key`.
    ///
    /// Applies the same expiry check as `get` but leaves hit/miss counters alone.
    pub fn contains(&mut self, key: &K) -> bool {
        let now = self.ticks.current_tick();
        self.evict_if_expired(key, now)
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if one was present.
    ///
    /// Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key).map(|entry| entry.value);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Removes every expired entry and every orphaned queue node.
    ///
    /// Returns the number of entries removed. This is a full sweep and is
    /// meant for periodic maintenance, not the per-tick path.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.ticks.current_tick();
        let ttl = self.ttl;
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired(now, ttl));

        let entries = &self.entries;
        self.order.retain(|node| is_live(entries, &node.key, node.generation));

        let removed = before - self.entries.len();
        if removed > 0 {
            trace!(removed, "purged expired cache entries");
        }
        self.stats.record_evictions(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Length ==
    /// Returns the number of resident entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of queued insertion records, orphans included.
    pub fn queued(&self) -> usize {
        self.order.len()
    }

    /// Returns the TTL in ticks.
    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns true if `key` is present and fresh, evicting it if stale.
    fn evict_if_expired(&mut self, key: &K, now: i64) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now, self.ttl),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_evictions(1);
            self.stats.set_total_entries(self.entries.len());
            return false;
        }
        true
    }

    // == First Expiry Check ==
    /// Drops orphaned nodes from the front of the queue, then evicts the
    /// oldest live entry if it has expired.
    ///
    /// Each queue node is popped at most once, so the cost is amortised O(1).
    fn check_first_expiry(&mut self, now: i64) {
        while let Some(node) = self.order.peek_oldest() {
            if !is_live(&self.entries, &node.key, node.generation) {
                self.order.pop_oldest();
                continue;
            }

            if now.saturating_sub(node.created_at) > self.ttl {
                if let Some(node) = self.order.pop_oldest() {
                    self.entries.remove(&node.key);
                    self.stats.record_evictions(1);
                }
            }
            break;
        }
    }
}

/// A queue node is live when the map still holds the entry it was created for.
fn is_live<K, V>(entries: &HashMap<K, CacheEntry<K, V>>, key: &K, generation: u64) -> bool
where
    K: Eq + Hash,
{
    entries
        .get(key)
        .is_some_and(|entry| entry.generation == generation)
}
