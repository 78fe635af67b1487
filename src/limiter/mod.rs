//! Limiter Module
//!
//! Token-bucket admission control for outbound tool invocations.

mod bucket;


pub use bucket::{RateState, TokenBucket};
