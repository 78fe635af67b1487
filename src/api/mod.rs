//! API Module
//!
//! HTTP handlers and routing for the tool-invocation endpoint.
//!
//! # Endpoints
//! - `POST /mcp` - Invoke a catalog tool
//! - `GET /stats` - Admission and cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
