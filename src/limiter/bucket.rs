//! Token Bucket Module
//!
//! Continuous-refill token bucket. Denial is signalled by a boolean and never
//! consumes tokens.

use std::time::Instant;

use tracing::warn;

// == Rate State ==
/// Observable state of a token bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateState {
    /// Tokens currently available, always within `0..=capacity`
    pub tokens: f64,
    /// Maximum number of tokens
    pub capacity: f64,
    /// Tokens added per second of elapsed time
    pub refill_rate_per_second: f64,
}

// == Token Bucket ==
/// Capacity-bounded counter that refills continuously.
#[derive(Debug)]
pub struct TokenBucket {
    tokens: f64,
    last_refill_at: Instant,
    capacity: f64,
    refill_rate_per_second: f64,
}

impl TokenBucket {
    // == Constructor ==
    /// Creates a full bucket.
    ///
    /// # Arguments
    /// * `capacity` - Maximum tokens, also the initial fill
    /// * `refill_rate_per_second` - Continuous refill rate
    pub fn new(capacity: f64, refill_rate_per_second: f64) -> Self {
        Self::new_at(capacity, refill_rate_per_second, Instant::now())
    }

    /// Creates a full bucket whose refill clock starts at `now`.
    pub fn new_at(capacity: f64, refill_rate_per_second: f64, now: Instant) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            tokens: capacity,
            last_refill_at: now,
            capacity,
            refill_rate_per_second: refill_rate_per_second.max(0.0),
        }
    }

    // == Consume ==
    /// Tries to take `cost` tokens. Returns false without consuming anything
    /// when fewer than `cost` tokens are available.
    pub fn consume(&mut self, cost: f64) -> bool {
        self.consume_at(cost, Instant::now())
    }

    /// Same as [`TokenBucket::consume`] with an explicit clock reading.
    pub fn consume_at(&mut self, cost: f64, now: Instant) -> bool {
        self.refill_at(now);

        // Negative or NaN costs would push tokens past capacity
        if cost >= 0.0 && self.tokens >= cost {
            self.tokens -= cost;
            return true;
        }

        warn!(
            tokens = self.tokens,
            requested = cost,
            "Rate limit exceeded"
        );
        false
    }

    // == Available ==
    /// Returns the current token count after refilling, without consuming.
    pub fn available(&mut self) -> f64 {
        self.available_at(Instant::now())
    }

    /// Same as [`TokenBucket::available`] with an explicit clock reading.
    pub fn available_at(&mut self, now: Instant) -> f64 {
        self.refill_at(now);
        self.tokens
    }

    // == State ==
    /// Refills and returns a snapshot of the bucket.
    pub fn state(&mut self) -> RateState {
        RateState {
            tokens: self.available(),
            capacity: self.capacity,
            refill_rate_per_second: self.refill_rate_per_second,
        }
    }

    // == Refill ==
    /// Adds tokens for the time elapsed since the last refill.
    ///
    /// A clock reading older than the last refill adds nothing and does not
    /// move the refill clock backwards.
    fn refill_at(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill_at);
        self.tokens = compute_refilled(
            self.tokens,
            elapsed.as_secs_f64(),
            self.refill_rate_per_second,
            self.capacity,
        );
        if now > self.last_refill_at {
            self.last_refill_at = now;
        }
    }
}

/// Computes the token count after `elapsed_secs`, capped at `capacity`.
fn compute_refilled(tokens: f64, elapsed_secs: f64, rate: f64, capacity: f64) -> f64 {
    (tokens + elapsed_secs.max(0.0) * rate).min(capacity)
}
