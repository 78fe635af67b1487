//! Spotify Web API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::catalog::{
    is_valid_path_id, CatalogApi, Playlist, PlaylistRequest, RecommendParams, Track,
    MAX_TRACKS_PER_REQUEST,
};
use crate::error::{GatewayError, Result};

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsBody {
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

// == Spotify Client ==
/// `CatalogApi` backed by the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    api_base: String,
}

impl SpotifyClient {
    /// Builds a client whose every request is bounded by `timeout`.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Appends `segments` to the API base, each percent-encoded as a single
    /// path segment.
    fn segment_url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| !is_valid_path_id(s)) {
            return Err(GatewayError::InvalidRequest(format!(
                "invalid path segment {:?}",
                bad
            )));
        }

        let mut url = Url::parse(&self.api_base)
            .map_err(|e| GatewayError::Configuration(format!("SPOTIFY_API_BASE: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Configuration("SPOTIFY_API_BASE cannot take a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(e.without_url().to_string()))?;

        check_status(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Upstream(format!("malformed response: {}", e)))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or_default();

    Err(GatewayError::Upstream(if message.is_empty() {
        format!("Spotify API returned {}", status)
    } else {
        format!("Spotify API returned {}: {}", status, message)
    }))
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn search_tracks(&self, token: &str, query: &str, limit: u32) -> Result<Vec<Track>> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.url("/search"))
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())]);

        let body: SearchBody = self.send_json(request).await?;
        let tracks = body.tracks.map(|page| page.items).unwrap_or_default();
        debug!(query, count = tracks.len(), "Search returned tracks");
        Ok(tracks)
    }

    async fn recommendations(&self, token: &str, params: &RecommendParams) -> Result<Vec<Track>> {
        let mut query = vec![("limit", params.limit.to_string())];
        let seeds = [
            ("seed_artists", &params.seed_artists),
            ("seed_genres", &params.seed_genres),
            ("seed_tracks", &params.seed_tracks),
        ];
        for (name, values) in seeds {
            if let Some(values) = values {
                query.push((name, values.join(",")));
            }
        }

        let request = self
            .client
            .get(self.url("/recommendations"))
            .bearer_auth(token)
            .query(&query);

        let body: RecommendationsBody = self.send_json(request).await?;
        Ok(body.tracks)
    }

    async fn create_playlist(&self, token: &str, request: &PlaylistRequest) -> Result<Playlist> {
        let create_url = match &request.user_id {
            Some(user_id) => self.segment_url(&["users", user_id, "playlists"])?,
            None => self.segment_url(&["me", "playlists"])?,
        };
        let create = self
            .client
            .post(create_url)
            .bearer_auth(token)
            .json(&json!({
                "name": request.name,
                "description": request.description,
                "public": request.public,
            }));

        let playlist: Playlist = self.send_json(create).await?;
        info!(playlist_id = %playlist.id, name = %playlist.name, "Playlist created");

        let tracks_url = self.segment_url(&["playlists", &playlist.id, "tracks"])?;
        for chunk in request.track_uris.chunks(MAX_TRACKS_PER_REQUEST) {
            let add = self
                .client
                .post(tracks_url.clone())
                .bearer_auth(token)
                .json(&json!({ "uris": chunk }));
            let response = add
                .send()
                .await
                .map_err(|e| GatewayError::Upstream(e.without_url().to_string()))?;
            check_status(response).await?;
        }

        if !request.track_uris.is_empty() {
            info!(
                playlist_id = %playlist.id,
                track_count = request.track_uris.len(),
                "Tracks added to playlist"
            );
        }

        Ok(playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const TRACK_JSON: &str = r#"{
        "id": "t1", "name": "So What",
        "artists": [{"id": "a1", "name": "Miles Davis"}],
        "album": {"id": "al1", "name": "Kind of Blue"},
        "uri": "spotify:track:t1",
        "external_urls": {"spotify": "https://open.spotify.com/track/t1"},
        "duration_ms": 562000
    }"#;

    fn client(server: &MockServer) -> SpotifyClient {
        SpotifyClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_tracks() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", "jazz")
                    .query_param("type", "track")
                    .query_param("limit", "5")
                    .header("authorization", "Bearer tok");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(format!(r#"{{"tracks": {{"items": [{}]}}}}"#, TRACK_JSON));
            })
            .await;

        let tracks = client(&server).search_tracks("tok", "jazz", 5).await.unwrap();

        mock.assert_async().await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "So What");
    }

    #[tokio::test]
    async fn test_recommendations_join_seeds() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/recommendations")
                    .query_param("limit", "20")
                    .query_param("seed_genres", "jazz,blues");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(format!(r#"{{"tracks": [{}]}}"#, TRACK_JSON));
            })
            .await;

        let params = RecommendParams {
            limit: 20,
            seed_artists: None,
            seed_genres: Some(vec!["jazz".to_string(), "blues".to_string()]),
            seed_tracks: None,
        };
        let tracks = client(&server).recommendations("tok", &params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_api_error_is_upstream_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(401)
                    .header("content-type", "application/json")
                    .body(r#"{"error": {"status": 401, "message": "The access token expired"}}"#);
            })
            .await;

        let err = client(&server).search_tracks("tok", "jazz", 5).await.unwrap_err();

        assert!(matches!(err, GatewayError::Upstream(_)));
        assert!(err.to_string().contains("The access token expired"));
    }

    #[tokio::test]
    async fn test_create_playlist_adds_tracks_in_chunks() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/me/playlists");
                then.status(201)
                    .header("content-type", "application/json")
                    .body(
                        r#"{"id": "p1", "name": "Focus", "description": "d",
                            "uri": "spotify:playlist:p1",
                            "external_urls": {"spotify": "https://open.spotify.com/playlist/p1"}}"#,
                    );
            })
            .await;
        let add = server
            .mock_async(|when, then| {
                when.method(POST).path("/playlists/p1/tracks");
                then.status(201)
                    .header("content-type", "application/json")
                    .body(r#"{"snapshot_id": "s"}"#);
            })
            .await;

        let request = PlaylistRequest {
            user_id: None,
            name: "Focus".to_string(),
            description: "d".to_string(),
            public: false,
            track_uris: (0..250).map(|i| format!("spotify:track:{}", i)).collect(),
        };
        let playlist = client(&server).create_playlist("tok", &request).await.unwrap();

        create.assert_async().await;
        add.assert_calls_async(3).await;
        assert_eq!(playlist.id, "p1");
    }

    fn playlist_request(user_id: &str) -> PlaylistRequest {
        PlaylistRequest {
            user_id: Some(user_id.to_string()),
            name: "Focus".to_string(),
            description: "d".to_string(),
            public: false,
            track_uris: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_playlist_for_named_user() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/users/jane.doe/playlists");
                then.status(201)
                    .header("content-type", "application/json")
                    .body(r#"{"id": "p2", "name": "Focus", "uri": "spotify:playlist:p2"}"#);
            })
            .await;

        let playlist = client(&server)
            .create_playlist("tok", &playlist_request("jane.doe"))
            .await
            .unwrap();

        create.assert_async().await;
        assert_eq!(playlist.id, "p2");
    }

    #[tokio::test]
    async fn test_create_playlist_user_id_cannot_leave_its_segment() {
        let server = MockServer::start_async().await;
        let own_playlists = server
            .mock_async(|when, then| {
                when.method(POST).path("/me/playlists");
                then.status(201)
                    .header("content-type", "application/json")
                    .body(r#"{"id": "p3", "name": "Focus", "uri": "spotify:playlist:p3"}"#);
            })
            .await;
        let any_post = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500);
            })
            .await;

        for user_id in ["../me", "..", "x/../../me", "me?id=1", "me#x"] {
            let err = client(&server)
                .create_playlist("tok", &playlist_request(user_id))
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::InvalidRequest(_)), "{:?}", user_id);
        }

        own_playlists.assert_calls_async(0).await;
        any_post.assert_calls_async(0).await;
    }

    #[test]
    fn test_segment_url_keeps_base_path() {
        let client = SpotifyClient::new("https://api.spotify.com/v1/", Duration::from_secs(1))
            .unwrap();

        let url = client.segment_url(&["users", "jane.doe", "playlists"]).unwrap();

        assert_eq!(url.as_str(), "https://api.spotify.com/v1/users/jane.doe/playlists");
    }
}
