//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with per-entry TTL.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Time to live in milliseconds
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stored at `stored_at` (Unix milliseconds).
    pub fn stored_at(value: V, ttl_ms: u64, stored_at: u64) -> Self {
        Self {
            value,
            stored_at,
            ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given timestamp.
    ///
    /// An entry is expired once strictly more than `ttl_ms` has elapsed since
    /// it was stored. A TTL of 0 is always expired. A clock reading earlier
    /// than `stored_at` counts as zero elapsed time.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.ttl_ms == 0 || now.saturating_sub(self.stored_at) > self.ttl_ms
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::stored_at("test_value", 60_000, 1_000);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.ttl_ms, 60_000);
        assert!(!entry.is_expired_at(1_000));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::stored_at("test_value", 1, 1_000);

        assert!(entry.is_expired_at(1_005));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::stored_at("test", 1_000, 10_000);

        // Exactly ttl elapsed is still fresh, one more millisecond is not
        assert!(!entry.is_expired_at(11_000));
        assert!(entry.is_expired_at(11_001));
    }

    #[test]
    fn test_zero_ttl_is_always_expired() {
        let entry = CacheEntry::stored_at("test", 0, 10_000);
        assert!(entry.is_expired_at(10_000));
    }

    #[test]
    fn test_clock_skew_does_not_expire() {
        let entry = CacheEntry::stored_at("test", 1_000, 10_000);
        assert!(!entry.is_expired_at(5_000));
        assert!(!entry.is_expired_at(11_000));
    }
}
