//! Auth Module
//!
//! Keeps one valid bearer token per process, refreshed lazily near expiry.

mod credential;
mod exchange;

pub use credential::{Clock, CredentialCache, CredentialState, REFRESH_SKEW_MS};
pub use exchange::{SpotifyTokenExchange, TokenExchange, TokenGrant, DEFAULT_EXPIRES_IN_SECS};
