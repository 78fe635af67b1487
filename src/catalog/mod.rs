//! Catalog Module
//!
//! Upstream music-catalog calls behind the `CatalogApi` trait.

mod spotify;
mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use spotify::SpotifyClient;
pub use types::{AlbumRef, ArtistRef, Playlist, PlaylistRequest, RecommendParams, Track};

/// Maximum seeds of each kind accepted by the recommendations endpoint
pub const MAX_SEEDS_PER_KIND: usize = 5;
/// Maximum track URIs per add-tracks request
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Returns true when `id` can stand alone as one URL path segment.
///
/// Rejects empty ids, dot segments and characters that would end or
/// escape the segment.
pub fn is_valid_path_id(id: &str) -> bool {
    if id.is_empty() || id == "." || id == ".." {
        return false;
    }
    !id.chars().any(|c| {
        matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
    })
}

/// Catalog operations performed with a bearer token.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search_tracks(&self, token: &str, query: &str, limit: u32) -> Result<Vec<Track>>;

    async fn recommendations(&self, token: &str, params: &RecommendParams) -> Result<Vec<Track>>;

    /// Creates the playlist and adds `request.track_uris` to it.
    async fn create_playlist(&self, token: &str, request: &PlaylistRequest) -> Result<Playlist>;
}
