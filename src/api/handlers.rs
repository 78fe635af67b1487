//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::config::Config;
use crate::dispatch::Gateway;
use crate::error::{GatewayError, Result};
use crate::models::{
    HealthResponse, RateLimitResponse, StatsResponse, ToolRequest, ToolResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Mediation layer owning the bucket, caches and credentials
    pub gateway: Arc<Gateway>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around the given gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            started_at: Instant::now(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Gateway::from_config(config)?))
    }
}

/// Handler for POST /mcp
///
/// Admission denial maps to 429, unknown tools and malformed input to 400.
/// Tool failures are reported as `{"status":"error"}` with 200.
pub async fn mcp_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ToolRequest>, JsonRejection>,
) -> Result<Json<ToolResponse>> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            // Unreadable bodies are charged like any other invocation
            state.gateway.admit().await?;
            return Err(GatewayError::InvalidRequest(rejection.body_text()));
        }
    };

    let response = state.gateway.invoke(req).await?;
    Ok(Json(response))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let gateway = &state.gateway;

    Json(StatsResponse {
        status: "running".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        rate_limit: RateLimitResponse::new(
            gateway.rate_state().await,
            gateway.settings().enable_rate_limiting,
        ),
        search_cache: gateway.search_cache_stats().await.into(),
        recommend_cache: gateway.recommend_cache_stats().await.into(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
