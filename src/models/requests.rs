//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming tool invocation bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::is_valid_path_id;

/// Default number of tracks requested from search and recommendations
pub const DEFAULT_LIMIT: u32 = 20;

/// Request body for POST /mcp
///
/// # Fields
/// - `tool`: Tool name (`search-track`, `recommend`, `create-playlist`)
/// - `input`: Tool-specific parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub input: Value,
}

/// Input of the `search-track` tool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchTrackInput {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl SearchTrackInput {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.query.trim().is_empty() {
            return Some("Query parameter is required and cannot be empty".to_string());
        }
        None
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Input of the `recommend` tool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendInput {
    #[serde(default)]
    pub seed_artists: Option<Vec<String>>,
    #[serde(default)]
    pub seed_genres: Option<Vec<String>>,
    #[serde(default)]
    pub seed_tracks: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Input of the `create-playlist` tool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub track_uris: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub public: bool,
}

impl CreatePlaylistInput {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Playlist name is required and cannot be empty".to_string());
        }
        if let Some(user_id) = &self.user_id {
            if !is_valid_path_id(user_id) {
                return Some(format!("Invalid userId: {:?}", user_id));
            }
        }
        None
    }
}
