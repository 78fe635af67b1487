//! Gateway Module
//!
//! Per invocation, in fixed order: admission, cache lookup, credential
//! ensure, upstream call, cache store. Locks are never held across
//! upstream I/O.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::auth::{CredentialCache, SpotifyTokenExchange};
use crate::cache::{CacheStats, CacheStore};
use crate::catalog::{CatalogApi, PlaylistRequest, SpotifyClient};
use crate::config::Config;
use crate::dispatch::ToolCall;
use crate::error::{GatewayError, Result};
use crate::limiter::{RateState, TokenBucket};
use crate::models::{CreatePlaylistInput, SearchTrackInput, ToolRequest, ToolResponse};

/// Cost of one tool invocation in admission tokens
const INVOCATION_COST: f64 = 1.0;

/// Tunables of the mediation layer.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub cache_max_size: usize,
    pub search_ttl_ms: u64,
    pub recommend_ttl_ms: u64,
    pub rate_limit_capacity: f64,
    pub rate_limit_refill_rate: f64,
    pub enable_cache: bool,
    pub enable_rate_limiting: bool,
    pub upstream_timeout: Duration,
}

impl From<&Config> for GatewaySettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_max_size: config.cache_max_size,
            search_ttl_ms: config.search_ttl_ms,
            recommend_ttl_ms: config.recommend_ttl_ms,
            rate_limit_capacity: config.rate_limit_capacity,
            rate_limit_refill_rate: config.rate_limit_refill_rate,
            enable_cache: config.enable_cache,
            enable_rate_limiting: config.enable_rate_limiting,
            upstream_timeout: Duration::from_secs(config.upstream_timeout_secs),
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

// == Gateway ==
/// Owns the admission bucket, both response caches and the credential cache.
pub struct Gateway {
    settings: GatewaySettings,
    limiter: Mutex<TokenBucket>,
    search_cache: RwLock<CacheStore<ToolResponse>>,
    recommend_cache: RwLock<CacheStore<ToolResponse>>,
    credentials: CredentialCache,
    catalog: Arc<dyn CatalogApi>,
}

impl Gateway {
    // == Constructor ==
    /// Creates a gateway from explicitly constructed collaborators.
    pub fn new(
        settings: GatewaySettings,
        credentials: CredentialCache,
        catalog: Arc<dyn CatalogApi>,
    ) -> Self {
        Self {
            limiter: Mutex::new(TokenBucket::new(
                settings.rate_limit_capacity,
                settings.rate_limit_refill_rate,
            )),
            search_cache: RwLock::new(CacheStore::new(
                settings.cache_max_size,
                settings.search_ttl_ms,
            )),
            recommend_cache: RwLock::new(CacheStore::new(
                settings.cache_max_size,
                settings.recommend_ttl_ms,
            )),
            credentials,
            catalog,
            settings,
        }
    }

    /// Creates a gateway talking to Spotify with the configured credentials.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = GatewaySettings::from(config);
        let exchange = SpotifyTokenExchange::new(
            &config.accounts_base,
            config.credentials.clone(),
            settings.upstream_timeout,
        )?;
        let catalog = SpotifyClient::new(&config.api_base, settings.upstream_timeout)?;

        Ok(Self::new(
            settings,
            CredentialCache::new(Arc::new(exchange)),
            Arc::new(catalog),
        ))
    }

    // == Invoke ==
    /// Runs one tool invocation.
    ///
    /// # Errors
    /// `RateLimited` when admission is denied, before any other work.
    /// `UnknownTool` / `InvalidRequest` for requests that cannot be parsed.
    /// Upstream and authentication failures are returned as error outcomes.
    pub async fn invoke(&self, request: ToolRequest) -> Result<ToolResponse> {
        self.admit().await?;

        let call = ToolCall::parse(request)?;
        info!(tool = call.name(), "Tool invocation");
        let key = call.cache_key();

        let response = match call {
            ToolCall::SearchTrack(input) => self.search(input, key).await,
            ToolCall::Recommend(params) => {
                let fetch = async {
                    let token = self.credentials.ensure_token().await?;
                    let tracks = self
                        .with_deadline(self.catalog.recommendations(&token, &params))
                        .await?;
                    Ok::<_, GatewayError>(json!({ "count": tracks.len(), "tracks": tracks, "seeds": params }))
                };
                self.run_cached(&self.recommend_cache, key, "Recommendations failed", fetch)
                    .await
            }
            ToolCall::CreatePlaylist(input) => self.create_playlist(input).await,
        };

        Ok(response)
    }

    async fn search(&self, input: SearchTrackInput, key: Option<String>) -> ToolResponse {
        if let Some(message) = input.validate() {
            return ToolResponse::error(message);
        }

        let fetch = async {
            let token = self.credentials.ensure_token().await?;
            let tracks = self
                .with_deadline(self.catalog.search_tracks(
                    &token,
                    input.query.trim(),
                    input.limit(),
                ))
                .await?;
            Ok::<_, GatewayError>(json!({ "count": tracks.len(), "tracks": tracks }))
        };
        self.run_cached(&self.search_cache, key, "Search failed", fetch)
            .await
    }

    async fn create_playlist(&self, input: CreatePlaylistInput) -> ToolResponse {
        if let Some(message) = input.validate() {
            return ToolResponse::error(message);
        }

        let request = PlaylistRequest {
            description: input
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| {
                    format!("Created via MCP on {}", chrono::Utc::now().format("%Y-%m-%d"))
                }),
            user_id: input.user_id,
            name: input.name,
            public: input.public,
            track_uris: input.track_uris,
        };

        let fetch = async {
            let token = self.credentials.ensure_token().await?;
            let playlist = self
                .with_deadline(self.catalog.create_playlist(&token, &request))
                .await?;
            Ok::<_, GatewayError>(json!({
                "playlist": {
                    "id": playlist.id,
                    "name": playlist.name,
                    "description": playlist.description,
                    "uri": playlist.uri,
                    "external_urls": playlist.external_urls,
                    "trackCount": request.track_uris.len(),
                }
            }))
        };
        Self::outcome_from("Create playlist failed", fetch.await)
    }

    // == Cache Orchestration ==
    /// Returns a cached outcome for `key`, or runs `fetch` and caches its
    /// result when it succeeds. A hit never touches credentials or upstream.
    async fn run_cached<F>(
        &self,
        cache: &RwLock<CacheStore<ToolResponse>>,
        key: Option<String>,
        failure_prefix: &str,
        fetch: F,
    ) -> ToolResponse
    where
        F: Future<Output = Result<Value>>,
    {
        let key = key.filter(|_| self.settings.enable_cache);

        if let Some(key) = &key {
            if let Some(hit) = cache.write().await.get(key) {
                debug!(key = %key, "Returning cached result");
                return hit;
            }
            debug!(key = %key, "Cache miss");
        }

        let response = Self::outcome_from(failure_prefix, fetch.await);

        if let Some(key) = key {
            if response.is_success() {
                cache.write().await.set(key, response.clone(), None);
            }
        }

        response
    }

    fn outcome_from(failure_prefix: &str, result: Result<Value>) -> ToolResponse {
        match result {
            Ok(data) => ToolResponse::success(data),
            Err(err) => {
                warn!(error = %err, "{}", failure_prefix);
                ToolResponse::error(format!("{}: {}", failure_prefix, err))
            }
        }
    }

    async fn with_deadline<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let timeout = self.settings.upstream_timeout;
        tokio::time::timeout(timeout, call).await.map_err(|_| {
            GatewayError::Upstream(format!("upstream call timed out after {:?}", timeout))
        })?
    }

    // == Admission ==
    /// Charges one invocation against the admission bucket.
    ///
    /// # Errors
    /// `RateLimited` when the bucket cannot cover the cost.
    pub async fn admit(&self) -> Result<()> {
        if !self.settings.enable_rate_limiting || self.consume(INVOCATION_COST).await {
            Ok(())
        } else {
            Err(GatewayError::RateLimited)
        }
    }

    /// Draws `cost` tokens from the admission bucket.
    pub async fn consume(&self, cost: f64) -> bool {
        self.limiter.lock().await.consume(cost)
    }

    /// Refilled snapshot of the admission bucket.
    pub async fn rate_state(&self) -> RateState {
        self.limiter.lock().await.state()
    }

    // == Observability ==
    pub async fn search_cache_stats(&self) -> CacheStats {
        self.search_cache.read().await.stats()
    }

    pub async fn recommend_cache_stats(&self) -> CacheStats {
        self.recommend_cache.read().await.stats()
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }
}
