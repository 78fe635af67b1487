//! Configuration Module
//!
//! Handles loading and validating gateway configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{GatewayError, Result};

/// Default Spotify Web API base URL
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
/// Default Spotify accounts service base URL
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Client credentials and refresh token, injected once at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &redact(&self.client_id))
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn redact(value: &str) -> String {
    match value.get(..4) {
        Some(prefix) if value.len() > 8 => format!("{prefix}…"),
        _ => "<redacted>".to_string(),
    }
}

/// Gateway configuration parameters.
///
/// All values except the credentials have sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spotify client credentials
    pub credentials: Credentials,
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries per response cache
    pub cache_max_size: usize,
    /// TTL in milliseconds for search results
    pub search_ttl_ms: u64,
    /// TTL in milliseconds for recommendation results
    pub recommend_ttl_ms: u64,
    /// Admission bucket capacity
    pub rate_limit_capacity: f64,
    /// Admission bucket refill rate in tokens per second
    pub rate_limit_refill_rate: f64,
    /// Serve every call from upstream when false
    pub enable_cache: bool,
    /// Admit every call when false
    pub enable_rate_limiting: bool,
    /// Deadline in seconds for a single upstream request
    pub upstream_timeout_secs: u64,
    /// Catalog API base URL
    pub api_base: String,
    /// Accounts service base URL (token exchange)
    pub accounts_base: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `SPOTIFY_REFRESH_TOKEN` - credentials
    /// - `SERVER_PORT` or `PORT` - HTTP server port (default: 3001)
    /// - `CACHE_MAX_SIZE` - Entries per cache (default: 50)
    /// - `CACHE_SEARCH_TTL` - Search TTL in ms (default: 300000)
    /// - `CACHE_RECOMMEND_TTL` - Recommendation TTL in ms (default: 600000)
    /// - `RATE_LIMIT_MAX_TOKENS` - Bucket capacity (default: 100)
    /// - `RATE_LIMIT_REFILL_RATE` - Tokens per second (default: 100/60)
    /// - `ENABLE_CACHE`, `ENABLE_RATE_LIMITING` - set to `false` to disable
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream deadline (default: 10)
    /// - `SPOTIFY_API_BASE`, `SPOTIFY_ACCOUNTS_BASE` - endpoint overrides
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| match lookup(name) {
            Some(v) => !v.eq_ignore_ascii_case("false"),
            None => default,
        };

        Self {
            credentials: Credentials {
                client_id: lookup("SPOTIFY_CLIENT_ID").unwrap_or_default(),
                client_secret: lookup("SPOTIFY_CLIENT_SECRET").unwrap_or_default(),
                refresh_token: lookup("SPOTIFY_REFRESH_TOKEN").unwrap_or_default(),
            },
            server_port: parse_var(&lookup, "SERVER_PORT")
                .or_else(|| parse_var(&lookup, "PORT"))
                .unwrap_or(defaults.server_port),
            cache_max_size: parse_var(&lookup, "CACHE_MAX_SIZE").unwrap_or(defaults.cache_max_size),
            search_ttl_ms: parse_var(&lookup, "CACHE_SEARCH_TTL").unwrap_or(defaults.search_ttl_ms),
            recommend_ttl_ms: parse_var(&lookup, "CACHE_RECOMMEND_TTL").unwrap_or(defaults.recommend_ttl_ms),
            rate_limit_capacity: parse_var(&lookup, "RATE_LIMIT_MAX_TOKENS")
                .unwrap_or(defaults.rate_limit_capacity),
            rate_limit_refill_rate: parse_var(&lookup, "RATE_LIMIT_REFILL_RATE")
                .unwrap_or(defaults.rate_limit_refill_rate),
            enable_cache: flag("ENABLE_CACHE", defaults.enable_cache),
            enable_rate_limiting: flag("ENABLE_RATE_LIMITING", defaults.enable_rate_limiting),
            upstream_timeout_secs: parse_var(&lookup, "UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout_secs),
            api_base: lookup("SPOTIFY_API_BASE").unwrap_or(defaults.api_base),
            accounts_base: lookup("SPOTIFY_ACCOUNTS_BASE").unwrap_or(defaults.accounts_base),
        }
    }

    /// Checks the configuration for problems that must stop the process.
    ///
    /// All problems are reported together; secret values are never echoed.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.credentials.client_id.is_empty() {
            errors.push("SPOTIFY_CLIENT_ID is required");
        }
        if self.credentials.client_secret.is_empty() {
            errors.push("SPOTIFY_CLIENT_SECRET is required");
        }
        if self.credentials.refresh_token.is_empty() {
            errors.push("SPOTIFY_REFRESH_TOKEN is required");
        }
        if self.server_port == 0 {
            errors.push("PORT must be between 1 and 65535");
        }
        if self.cache_max_size < 1 {
            errors.push("CACHE_MAX_SIZE must be at least 1");
        }
        if self.rate_limit_capacity.is_nan() || self.rate_limit_capacity < 1.0 {
            errors.push("RATE_LIMIT_MAX_TOKENS must be at least 1");
        }
        if self.rate_limit_refill_rate.is_nan() || self.rate_limit_refill_rate <= 0.0 {
            errors.push("RATE_LIMIT_REFILL_RATE must be positive");
        }
        if self.upstream_timeout_secs == 0 {
            errors.push("UPSTREAM_TIMEOUT_SECS must be at least 1");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Configuration(errors.join("; ")))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            server_port: 3001,
            cache_max_size: 50,
            search_ttl_ms: 300_000,
            recommend_ttl_ms: 600_000,
            rate_limit_capacity: 100.0,
            rate_limit_refill_rate: 100.0 / 60.0,
            enable_cache: true,
            enable_rate_limiting: true,
            upstream_timeout_secs: 10,
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
        }
    }
}
