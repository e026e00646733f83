//! node-sonos-http-api client
//!
//! Every primitive is a GET under `{base_url}/{room}`:
//! `/spotify/now/{uri}`, `/pause`, `/volume/+10`, `/state`, ...

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{CurrentTrack, PlaybackBackend, PlayerState, QueueEntry};
use crate::config::SonosConfig;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateResponse {
    #[serde(default)]
    current_track: Option<CurrentTrack>,
    #[serde(default)]
    volume: u32,
    #[serde(default)]
    playback_state: Option<String>,
}

/// Sonos zone controller
#[derive(Clone)]
pub struct SonosClient {
    http_client: reqwest::Client,
    /// `{base_url}/{url-encoded room}`
    zone_url: String,
}

impl SonosClient {
    pub fn new(config: &SonosConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Playback(e.to_string()))?;

        Ok(Self {
            http_client,
            zone_url: zone_url(&config.base_url, &config.room),
        })
    }

    pub fn zone_url(&self) -> &str {
        &self.zone_url
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.zone_url, path);
        tracing::debug!(url = %url, "Sonos GET");

        self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Playback(format!("Sonos unreachable: {}", e)))
    }

    /// Transport command; body and status are not interpreted
    async fn command(&self, path: &str) -> Result<()> {
        let response = self.get(path).await?;
        if !response.status().is_success() {
            tracing::warn!(
                path = %path,
                status = %response.status(),
                "Sonos command returned non-success status"
            );
        }
        Ok(())
    }

    async fn query<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Playback(format!("Sonos {} returned {}", path, status)));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Playback(format!("Sonos {} parse error: {}", path, e)))
    }
}

/// Build the zone URL; the room name is a single path segment
pub fn zone_url(base_url: &str, room: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), urlencoding::encode(room))
}

/// Volume path segment: `+10`, `-5`
fn delta_segment(delta: i32) -> String {
    if delta >= 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

#[async_trait]
impl PlaybackBackend for SonosClient {
    async fn play_now(&self, locator: &str) -> Result<()> {
        self.command(&format!("spotify/now/{}", locator)).await
    }

    async fn enqueue(&self, locator: &str) -> Result<()> {
        self.command(&format!("spotify/queue/{}", locator)).await
    }

    async fn play_next(&self, locator: &str) -> Result<()> {
        self.command(&format!("spotify/next/{}", locator)).await
    }

    async fn pause(&self) -> Result<()> {
        self.command("pause").await
    }

    async fn resume(&self) -> Result<()> {
        self.command("play").await
    }

    async fn skip(&self) -> Result<()> {
        self.command("next").await
    }

    async fn previous(&self) -> Result<()> {
        self.command("previous").await
    }

    async fn set_volume(&self, level: u32) -> Result<()> {
        self.command(&format!("volume/{}", level.min(100))).await
    }

    async fn adjust_volume(&self, delta: i32) -> Result<()> {
        self.command(&format!("volume/{}", delta_segment(delta))).await
    }

    async fn state(&self) -> Result<PlayerState> {
        let state: StateResponse = self.query("state").await?;

        Ok(PlayerState {
            current_track: state.current_track.filter(|t| !t.title.trim().is_empty()),
            volume: state.volume,
            playback_state: state.playback_state.unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn queue(&self) -> Result<Vec<QueueEntry>> {
        self.query("queue").await
    }

    async fn clear_queue(&self) -> Result<()> {
        self.command("clearqueue").await
    }
}
