//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::CacheStats;
use crate::limiter::RateState;

/// Tag of a tool outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Tagged outcome of a tool invocation (POST /mcp)
///
/// Success carries `data` and a `timestamp`; error carries a `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ToolResponse {
    /// Creates a success outcome stamped with the current time
    pub fn success(data: Value) -> Self {
        Self {
            status: ToolStatus::Success,
            data: Some(data),
            message: None,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    /// Creates an error outcome
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            data: None,
            message: Some(message.into()),
            timestamp: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

/// Per-cache section of the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            size: stats.size,
            max_size: stats.max_size,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
        }
    }
}

/// Admission section of the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitResponse {
    pub enabled: bool,
    /// Tokens currently available (rounded down)
    pub tokens: u64,
    pub capacity: f64,
    pub refill_rate_per_second: f64,
}

impl RateLimitResponse {
    pub fn new(state: RateState, enabled: bool) -> Self {
        Self {
            enabled,
            tokens: state.tokens.floor() as u64,
            capacity: state.capacity,
            refill_rate_per_second: state.refill_rate_per_second,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub status: String,
    /// Seconds since the server started
    pub uptime: f64,
    pub rate_limit: RateLimitResponse,
    pub search_cache: CacheStatsResponse,
    pub recommend_cache: CacheStatsResponse,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
