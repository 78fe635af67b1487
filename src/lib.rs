//! Catalog Gateway - A tool-invocation gateway for a music catalog API
//!
//! Mediates catalog calls through token-bucket admission control, a bounded
//! TTL response cache and a lazily refreshed bearer token.

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod limiter;
pub mod models;

pub use api::AppState;
pub use config::Config;
pub use dispatch::{Gateway, GatewaySettings};
