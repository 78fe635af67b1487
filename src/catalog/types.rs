//! Catalog data types, normalized from Spotify payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::MAX_SEEDS_PER_KIND;
use crate::models::RecommendInput;
use crate::models::requests::DEFAULT_LIMIT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: Option<String>,
    pub name: String,
}

/// A track reduced to the fields tools return.
///
/// Unknown upstream fields are dropped on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    pub uri: String,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

/// Normalized recommendation parameters.
///
/// Serializes with a fixed field order so the JSON form is usable as a
/// cache key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendParams {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_artists: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_tracks: Option<Vec<String>>,
}

impl RecommendParams {
    /// Truncates each seed list to five entries, drops empty lists and
    /// falls back to the `pop` genre when no seed is left.
    pub fn from_input(input: &RecommendInput) -> Self {
        let mut params = Self {
            limit: input.limit.unwrap_or(DEFAULT_LIMIT),
            seed_artists: normalize_seeds(input.seed_artists.as_deref()),
            seed_genres: normalize_seeds(input.seed_genres.as_deref()),
            seed_tracks: normalize_seeds(input.seed_tracks.as_deref()),
        };

        if params.seed_artists.is_none()
            && params.seed_genres.is_none()
            && params.seed_tracks.is_none()
        {
            params.seed_genres = Some(vec!["pop".to_string()]);
        }

        params
    }
}

fn normalize_seeds(seeds: Option<&[String]>) -> Option<Vec<String>> {
    match seeds {
        Some(seeds) if !seeds.is_empty() => {
            Some(seeds.iter().take(MAX_SEEDS_PER_KIND).cloned().collect())
        }
        _ => None,
    }
}

/// Parameters of a playlist creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistRequest {
    /// Owner; the token's own user when None
    pub user_id: Option<String>,
    pub name: String,
    pub description: String,
    pub public: bool,
    pub track_uris: Vec<String>,
}
