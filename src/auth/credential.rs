//! Credential Cache Module
//!
//! Two-state lazy refresher: a token is Valid while `now < expires_at - skew`
//! and Stale otherwise. Stale tokens are refreshed by the next caller.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::auth::TokenExchange;
use crate::clock::current_timestamp_ms;
use crate::error::Result;

/// Guard window before expiry inside which a token counts as stale
pub const REFRESH_SKEW_MS: u64 = 60_000;

/// Millisecond clock used for validity checks.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

// == Credential State ==
/// Cached access token and its absolute expiry (Unix milliseconds).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialState {
    pub access_token: Option<String>,
    pub expires_at: u64,
}

impl CredentialState {
    /// Returns the token if it is outside the skew window at `now`.
    pub fn valid_token(&self, now: u64) -> Option<&str> {
        match &self.access_token {
            Some(token) if now.saturating_add(REFRESH_SKEW_MS) < self.expires_at => Some(token),
            _ => None,
        }
    }
}

// == Credential Cache ==
/// Lazily refreshed bearer token shared by all requests.
///
/// Refreshes are single-flight: concurrent callers that observe a stale
/// token wait for one exchange and then reuse its result.
pub struct CredentialCache {
    exchange: Arc<dyn TokenExchange>,
    state: RwLock<CredentialState>,
    refresh_guard: Mutex<()>,
    clock: Clock,
}

impl CredentialCache {
    /// Creates an empty (stale) cache backed by the given exchange.
    pub fn new(exchange: Arc<dyn TokenExchange>) -> Self {
        Self::with_clock(exchange, Arc::new(current_timestamp_ms))
    }

    /// Creates an empty cache with a custom millisecond clock.
    pub fn with_clock(exchange: Arc<dyn TokenExchange>, clock: Clock) -> Self {
        Self {
            exchange,
            state: RwLock::new(CredentialState::default()),
            refresh_guard: Mutex::new(()),
            clock,
        }
    }

    // == Ensure Token ==
    /// Returns a valid access token, refreshing it first when stale.
    ///
    /// # Errors
    /// `GatewayError::Authentication` when the refresh exchange fails. The
    /// cached state is left untouched so the next call retries.
    pub async fn ensure_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token().await {
            debug!("Using cached access token");
            return Ok(token);
        }

        let _singleflight = self.refresh_guard.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let grant = self.exchange.refresh().await.inspect_err(|err| {
            error!(error = %err, "Failed to refresh access token");
        })?;

        let expires_in = grant.expires_in.unwrap_or(super::DEFAULT_EXPIRES_IN_SECS);
        let expires_at = (self.clock)().saturating_add(expires_in.saturating_mul(1000));

        let mut state = self.state.write().await;
        state.access_token = Some(grant.access_token.clone());
        state.expires_at = expires_at;

        info!(expires_in, "Access token refreshed");
        Ok(grant.access_token)
    }

    async fn cached_token(&self) -> Option<String> {
        let now = (self.clock)();
        self.state
            .read()
            .await
            .valid_token(now)
            .map(str::to_string)
    }
}
