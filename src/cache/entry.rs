//! Cache Entry Module
//!
//! Defines the immutable record stored for each cached entity value.

// == Cache Entry ==
/// A cached value together with its owner and creation tick.
///
/// Entries are never mutated after insertion; re-inserting a key creates a
/// new entry with a fresh generation.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The stored value
    pub value: V,
    /// Key of the entity that owns this entry
    pub owner: K,
    /// Logical tick at which the entry was inserted
    pub created_at: i64,
    /// Insertion sequence number, unique per cache instance
    pub generation: u64,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new entry stamped with the given tick and generation.
    pub fn new(owner: K, value: V, created_at: i64, generation: u64) -> Self {
        Self {
            value,
            owner,
            created_at,
            generation,
        }
    }

    // == Age ==
    /// Returns how many ticks have elapsed since insertion.
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.created_at)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry read at exactly `created_at + ttl` is
    /// still fresh; it expires only once its age is strictly greater than
    /// the TTL.
    pub fn is_expired(&self, now: i64, ttl: i64) -> bool {
        self.age(now) > ttl
    }
}
