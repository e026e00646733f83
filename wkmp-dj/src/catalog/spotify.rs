//! Spotify Web API client
//!
//! Uses the OAuth refresh-token grant when a user refresh token is
//! configured (needed for library endpoints), otherwise falls back to the
//! client-credentials grant, which is enough for search and metadata.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{Catalog, Page, TrackDetail};
use crate::config::SpotifyConfig;
use crate::error::{Error, Result};
use crate::registry::{CandidateItem, CandidateKind};

const API_BASE_URL: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this long before the token actually expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Spotify caps page sizes at 50
const MAX_PAGE_SIZE: u32 = 50;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SpArtist {
    name: String,
    #[serde(default)]
    uri: String,
}

#[derive(Debug, Deserialize)]
struct SpAlbumRef {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpTrack {
    #[serde(default)]
    id: Option<String>,
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<SpArtist>,
    #[serde(default)]
    album: Option<SpAlbumRef>,
}

#[derive(Debug, Deserialize)]
struct SpAlbum {
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<SpArtist>,
}

#[derive(Debug, Deserialize)]
struct SpOwner {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpTrackCount {
    total: u32,
}

#[derive(Debug, Deserialize)]
struct SpPlaylist {
    name: String,
    uri: String,
    #[serde(default)]
    owner: Option<SpOwner>,
    #[serde(default)]
    tracks: Option<SpTrackCount>,
}

/// Paging object; Spotify may return `null` entries in playlist listings
#[derive(Debug, Deserialize)]
struct SpPaging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
    #[serde(default)]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<SpPaging<SpTrack>>,
    albums: Option<SpPaging<SpAlbum>>,
    artists: Option<SpPaging<SpArtist>>,
    playlists: Option<SpPaging<SpPlaylist>>,
}

#[derive(Debug, Deserialize)]
struct AlbumResponse {
    name: String,
    tracks: SpPaging<SpTrack>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    tracks: Vec<SpTrack>,
}

#[derive(Debug, Deserialize)]
struct SavedTrack {
    track: Option<SpTrack>,
}

// ============================================================================
// Conversions
// ============================================================================

impl SpTrack {
    fn into_candidate(self) -> CandidateItem {
        let mut item = CandidateItem::new(CandidateKind::Track, self.name, self.uri);
        if let Some(artist) = self.artists.into_iter().next() {
            item = item.with_artist(artist.name);
        }
        if let Some(album) = self.album {
            item = item.with_album(album.name);
        }
        item
    }
}

impl SpAlbum {
    fn into_candidate(self) -> CandidateItem {
        let mut item = CandidateItem::new(CandidateKind::Album, self.name, self.uri);
        if let Some(artist) = self.artists.into_iter().next() {
            item = item.with_artist(artist.name);
        }
        item
    }
}

impl SpArtist {
    fn into_candidate(self) -> CandidateItem {
        CandidateItem::new(CandidateKind::Artist, self.name, self.uri)
    }
}

impl SpPlaylist {
    fn into_candidate(self) -> CandidateItem {
        let mut item = CandidateItem::new(CandidateKind::Playlist, self.name, self.uri);
        if let Some(owner) = self.owner.and_then(|o| o.display_name) {
            item = item.with_artist(owner);
        }
        if let Some(tracks) = self.tracks {
            item = item.with_tracks(tracks.total);
        }
        item
    }
}

fn collect<T>(paging: Option<SpPaging<T>>, convert: fn(T) -> CandidateItem) -> Vec<CandidateItem> {
    paging
        .map(|p| p.items.into_iter().flatten().map(convert).collect())
        .unwrap_or_default()
}

// ============================================================================
// Token cache
// ============================================================================

/// Cached access token with its expiry instant
struct TokenCache {
    token: Mutex<Option<(String, Instant)>>,
}

impl TokenCache {
    fn new() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    refresh_token: Option<String>,
    api_base_url: String,
    token_url: String,
    token_cache: TokenCache,
}

impl SpotifyClient {
    /// Build from the `[spotify]` config section.
    ///
    /// Fails when client credentials are missing; the caller decides
    /// whether that disables catalog features or aborts startup.
    pub fn new(config: &SpotifyConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("spotify.client_id is not set".to_string()))?;
        let client_secret = config
            .client_secret
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("spotify.client_secret is not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Catalog(e.to_string()))?;

        Ok(Self {
            http_client,
            client_id,
            client_secret,
            refresh_token: config.refresh_token.clone().filter(|v| !v.trim().is_empty()),
            api_base_url: API_BASE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            token_cache: TokenCache::new(),
        })
    }

    /// Override API and token endpoints (tests, proxies)
    pub fn with_base_urls(
        mut self,
        api_base_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        self.token_url = token_url.into();
        self
    }

    /// Valid access token, refreshing when absent or about to expire
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token_cache.token.lock().await;

        if let Some((token, expires_at)) = cached.as_ref() {
            if Instant::now() + TOKEN_EXPIRY_MARGIN < *expires_at {
                return Ok(token.clone());
            }
        }

        let form: Vec<(&str, &str)> = match &self.refresh_token {
            Some(refresh) => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh.as_str()),
            ],
            None => vec![("grant_type", "client_credentials")],
        };

        let basic = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));
        let response = self
            .http_client
            .post(&self.token_url)
            .header("Authorization", format!("Basic {}", basic))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Catalog(format!("Token request rejected {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Catalog(format!("Token parse error: {}", e)))?;

        tracing::debug!(expires_in = token.expires_in, "Refreshed Spotify access token");
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in);
        *cached = Some((token.access_token.clone(), expires_at));
        Ok(token.access_token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.api_base_url, path);
        tracing::debug!(url = %url, "Spotify GET");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Catalog(format!("API error {}: {}", status.as_u16(), body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Catalog(format!("Parse error: {}", e)))
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search(
        &self,
        query: &str,
        kind: CandidateKind,
        limit: u32,
    ) -> Result<Vec<CandidateItem>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let response: SearchResponse = self
            .get_json(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", kind.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let items = match kind {
            CandidateKind::Track => collect(response.tracks, SpTrack::into_candidate),
            CandidateKind::Album => collect(response.albums, SpAlbum::into_candidate),
            CandidateKind::Artist => collect(response.artists, SpArtist::into_candidate),
            CandidateKind::Playlist => collect(response.playlists, SpPlaylist::into_candidate),
        };

        tracing::info!(
            query = %query,
            kind = %kind,
            count = items.len(),
            "Spotify search complete"
        );
        Ok(items)
    }

    async fn track(&self, track_id: &str) -> Result<TrackDetail> {
        let track: SpTrack = self.get_json(&format!("/tracks/{}", track_id), &[]).await?;
        Ok(TrackDetail {
            id: track.id.unwrap_or_else(|| track_id.to_string()),
            name: track.name,
            artist: track.artists.into_iter().next().map(|a| a.name),
            album: track.album.as_ref().map(|a| a.name.clone()),
            album_id: track.album.and_then(|a| a.id),
            uri: track.uri,
        })
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CandidateItem>> {
        let album: AlbumResponse = self.get_json(&format!("/albums/{}", album_id), &[]).await?;
        let album_name = album.name;

        Ok(album
            .tracks
            .items
            .into_iter()
            .flatten()
            .map(|t| t.into_candidate().with_album(album_name.clone()))
            .collect())
    }

    async fn recommendations(&self, seed_track_id: &str, limit: u32) -> Result<Vec<CandidateItem>> {
        let response: RecommendationsResponse = self
            .get_json(
                "/recommendations",
                &[
                    ("seed_tracks", seed_track_id.to_string()),
                    ("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
                ],
            )
            .await?;

        Ok(response.tracks.into_iter().map(SpTrack::into_candidate).collect())
    }

    async fn user_playlists(&self, limit: u32, offset: u32) -> Result<Page> {
        let paging: SpPaging<SpPlaylist> = self
            .get_json(
                "/me/playlists",
                &[
                    ("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        Ok(Page {
            total: paging.total,
            items: paging.items.into_iter().flatten().map(SpPlaylist::into_candidate).collect(),
        })
    }

    async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<Page> {
        let paging: SpPaging<SavedTrack> = self
            .get_json(
                "/me/tracks",
                &[
                    ("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        Ok(Page {
            total: paging.total,
            items: paging
                .items
                .into_iter()
                .flatten()
                .filter_map(|saved| saved.track)
                .map(SpTrack::into_candidate)
                .collect(),
        })
    }

    async fn save_tracks(&self, track_ids: &[String]) -> Result<()> {
        let token = self.access_token().await?;
        let url = format!("{}/me/tracks", self.api_base_url);

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "ids": track_ids }))
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Catalog(format!("API error {}: {}", status.as_u16(), body)));
        }

        tracing::info!(count = track_ids.len(), "Saved tracks to Spotify library");
        Ok(())
    }
}
