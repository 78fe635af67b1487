//! Cache Module
//!
//! Provides a bounded in-memory cache with per-entry TTL, lazy expiry and
//! insertion-order eviction.

mod entry;
mod order;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::CacheStore;
