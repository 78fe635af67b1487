//! Dispatch Module
//!
//! Composes admission control, response caching and credential refresh
//! around every tool invocation.

mod gateway;
mod tool;

pub use gateway::{Gateway, GatewaySettings};
pub use tool::ToolCall;
