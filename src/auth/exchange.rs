//! Token Exchange Module
//!
//! The upstream `grant_type=refresh_token` call, behind a trait so the
//! credential cache can be driven by fakes in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Credentials;
use crate::error::{GatewayError, Result};

/// Lifetime assumed when the provider omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Result of a successful refresh exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Performs the refresh exchange against the accounts service.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn refresh(&self) -> Result<TokenGrant>;
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

// == Spotify Token Exchange ==
/// Refresh-token exchange against `POST {accounts_base}/api/token`.
#[derive(Debug, Clone)]
pub struct SpotifyTokenExchange {
    client: Client,
    token_url: String,
    credentials: Credentials,
}

impl SpotifyTokenExchange {
    /// Builds an exchange with its own HTTP client bounded by `timeout`.
    pub fn new(accounts_base: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token_url: format!("{}/api/token", accounts_base.trim_end_matches('/')),
            credentials,
        })
    }
}

#[async_trait]
impl TokenExchange for SpotifyTokenExchange {
    async fn refresh(&self) -> Result<TokenGrant> {
        debug!(url = %self.token_url, "Requesting access token refresh");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Authentication(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<OAuthErrorBody>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{} ({})", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(GatewayError::Authentication(reason));
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| GatewayError::Authentication(format!("malformed token response: {}", e)))
    }
}
