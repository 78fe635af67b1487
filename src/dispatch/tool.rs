//! Tool parsing and cache keys.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::catalog::RecommendParams;
use crate::error::{GatewayError, Result};
use crate::models::{CreatePlaylistInput, SearchTrackInput, ToolRequest};

/// A parsed tool invocation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    SearchTrack(SearchTrackInput),
    Recommend(RecommendParams),
    CreatePlaylist(CreatePlaylistInput),
}

impl ToolCall {
    /// Parses a request by tool name.
    ///
    /// # Errors
    /// `UnknownTool` for unrecognized names, `InvalidRequest` when the input
    /// does not match the tool's parameter shape.
    pub fn parse(request: ToolRequest) -> Result<Self> {
        match request.tool.as_str() {
            "search-track" => Ok(Self::SearchTrack(parse_input(request.input)?)),
            "recommend" => Ok(Self::Recommend(RecommendParams::from_input(&parse_input(
                request.input,
            )?))),
            "create-playlist" => Ok(Self::CreatePlaylist(parse_input(request.input)?)),
            _ => Err(GatewayError::UnknownTool(request.tool)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchTrack(_) => "search-track",
            Self::Recommend(_) => "recommend",
            Self::CreatePlaylist(_) => "create-playlist",
        }
    }

    /// Deterministic cache key, or None for tools whose results are not cached.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            Self::SearchTrack(input) => {
                Some(format!("search:{}:{}", input.query.trim(), input.limit()))
            }
            Self::Recommend(params) => serde_json::to_string(params)
                .ok()
                .map(|json| format!("recommend:{}", json)),
            Self::CreatePlaylist(_) => None,
        }
    }
}

/// Missing input is treated as an empty object.
fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T> {
    let input = match input {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(input).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(tool: &str, input: Value) -> ToolRequest {
        ToolRequest {
            tool: tool.to_string(),
            input,
        }
    }

    #[test]
    fn test_search_cache_key() {
        let call = ToolCall::parse(request("search-track", json!({"query": "jazz"}))).unwrap();
        assert_eq!(call.cache_key().as_deref(), Some("search:jazz:20"));
        assert_eq!(call.name(), "search-track");
    }

    #[test]
    fn test_search_cache_key_ignores_surrounding_whitespace() {
        let a = ToolCall::parse(request("search-track", json!({"query": " jazz ", "limit": 5})))
            .unwrap();
        let b = ToolCall::parse(request("search-track", json!({"query": "jazz", "limit": 5})))
            .unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_recommend_cache_key_is_deterministic() {
        let a = ToolCall::parse(request(
            "recommend",
            json!({"seedGenres": ["jazz"], "seedArtists": ["a1"], "limit": 10}),
        ))
        .unwrap();
        let b = ToolCall::parse(request(
            "recommend",
            json!({"limit": 10, "seedArtists": ["a1"], "seedGenres": ["jazz"]}),
        ))
        .unwrap();

        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(
            a.cache_key().as_deref(),
            Some(r#"recommend:{"limit":10,"seed_artists":["a1"],"seed_genres":["jazz"]}"#)
        );
    }

    #[test]
    fn test_recommend_without_input_defaults_to_pop() {
        let call = ToolCall::parse(request("recommend", Value::Null)).unwrap();
        assert_eq!(
            call.cache_key().as_deref(),
            Some(r#"recommend:{"limit":20,"seed_genres":["pop"]}"#)
        );
    }

    #[test]
    fn test_create_playlist_is_not_cached() {
        let call = ToolCall::parse(request("create-playlist", json!({"name": "Focus"}))).unwrap();
        assert!(call.cache_key().is_none());
    }

    #[test]
    fn test_unknown_tool() {
        let result = ToolCall::parse(request("dance", json!({})));
        assert!(matches!(result, Err(GatewayError::UnknownTool(name)) if name == "dance"));
    }

    #[test]
    fn test_malformed_input() {
        let result = ToolCall::parse(request("search-track", json!({"limit": "many"})));
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }
}
