//! Cache Module
//!
//! Provides per-entity caching with tick-based expiry and lazy head eviction.

mod entry;
mod expiry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use expiry::{ExpiryQueue, QueueNode};
pub use stats::CacheStats;
pub use store::ExpiringCache;
