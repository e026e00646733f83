//! Music catalog collaborator
//!
//! Search and library metadata. Results come back as unnumbered
//! [`CandidateItem`]s; numbering happens when the dispatcher writes them to
//! the registry.

use async_trait::async_trait;

use crate::error::Result;
use crate::registry::{CandidateItem, CandidateKind};

pub mod spotify;

pub use spotify::SpotifyClient;

/// Track metadata needed by locator-derived features
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDetail {
    pub id: String,
    pub name: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_id: Option<String>,
    pub uri: String,
}

/// One page of a paginated library listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<CandidateItem>,
    /// Total items available across all pages
    pub total: u32,
}

/// Catalog provider capability
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Ordered search results of the given kind
    async fn search(
        &self,
        query: &str,
        kind: CandidateKind,
        limit: u32,
    ) -> Result<Vec<CandidateItem>>;

    /// Full metadata for a track ID
    async fn track(&self, track_id: &str) -> Result<TrackDetail>;

    /// Tracks of an album, in album order
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CandidateItem>>;

    /// Tracks similar to the seed track
    async fn recommendations(&self, seed_track_id: &str, limit: u32) -> Result<Vec<CandidateItem>>;

    /// Current user's playlists
    async fn user_playlists(&self, limit: u32, offset: u32) -> Result<Page>;

    /// Current user's saved ("liked") tracks
    async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<Page>;

    /// Add tracks to the user's library
    async fn save_tracks(&self, track_ids: &[String]) -> Result<()>;
}
