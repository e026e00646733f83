//! Playback backend collaborator
//!
//! Transport commands are fire-and-forget: success means the backend
//! answered. Only the state and queue reads interpret response bodies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod sonos;

pub use sonos::SonosClient;

/// Track the backend reports as current
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CurrentTrack {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Backend locator, opaque outside [`crate::locator`]
    #[serde(default)]
    pub uri: String,
}

/// Snapshot of the zone's playback state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    /// `None` when nothing is loaded
    pub current_track: Option<CurrentTrack>,
    pub volume: u32,
    /// Backend's own label, e.g. `PLAYING`, `PAUSED_PLAYBACK`, `STOPPED`
    pub playback_state: String,
}

/// One entry of the backend queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
}

/// Playback backend capability
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Replace what is playing with the locator
    async fn play_now(&self, locator: &str) -> Result<()>;

    /// Append the locator to the end of the queue
    async fn enqueue(&self, locator: &str) -> Result<()>;

    /// Insert the locator right after the current track
    async fn play_next(&self, locator: &str) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    async fn skip(&self) -> Result<()>;

    async fn previous(&self) -> Result<()>;

    /// Absolute volume, 0-100
    async fn set_volume(&self, level: u32) -> Result<()>;

    /// Relative volume change
    async fn adjust_volume(&self, delta: i32) -> Result<()>;

    async fn state(&self) -> Result<PlayerState>;

    async fn queue(&self) -> Result<Vec<QueueEntry>>;

    async fn clear_queue(&self) -> Result<()>;
}
