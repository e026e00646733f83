//! Candidate registry
//!
//! Per-session, numbered working set that follow-up requests refer to by
//! ordinal ("play 3"). Every write replaces the whole sequence and renumbers
//! it; there is no append.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::session::SessionKey;

/// Kind of playable entity a candidate stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    #[default]
    Track,
    Album,
    Artist,
    Playlist,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Track => "track",
            CandidateKind::Album => "album",
            CandidateKind::Artist => "artist",
            CandidateKind::Playlist => "playlist",
        }
    }

    /// Parse a search `type` parameter; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "track" | "tracks" | "song" | "songs" => Some(CandidateKind::Track),
            "album" | "albums" => Some(CandidateKind::Album),
            "artist" | "artists" => Some(CandidateKind::Artist),
            "playlist" | "playlists" => Some(CandidateKind::Playlist),
            _ => None,
        }
    }

    /// Plural noun used in result messages ("Found 3 albums.")
    pub fn plural(&self) -> &'static str {
        match self {
            CandidateKind::Track => "tracks",
            CandidateKind::Album => "albums",
            CandidateKind::Artist => "artists",
            CandidateKind::Playlist => "playlists",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One addressable playback entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Position within the registry snapshot; assigned by the registry
    pub num: u32,
    pub kind: CandidateKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Track count, playlists only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<u32>,
    /// Opaque locator handed to the playback backend unmodified
    pub uri: String,
}

impl CandidateItem {
    /// New unnumbered candidate; `num` is filled in on registry write
    pub fn new(kind: CandidateKind, name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            num: 0,
            kind,
            name: name.into(),
            artist: None,
            album: None,
            tracks: None,
            uri: uri.into(),
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_tracks(mut self, tracks: u32) -> Self {
        self.tracks = Some(tracks);
        self
    }

    /// `num. name [by artist]`, the line format shown to the language model
    pub fn listing_line(&self) -> String {
        match &self.artist {
            Some(artist) => format!("{}. {} by {}", self.num, self.name, artist),
            None => format!("{}. {}", self.num, self.name),
        }
    }
}

/// Session-keyed candidate store
///
/// Cloning shares the underlying map. Snapshots are `Arc`s, so a reader keeps
/// a consistent view even if a concurrent request replaces the sequence.
#[derive(Clone, Default)]
pub struct CandidateRegistry {
    sessions: Arc<RwLock<HashMap<SessionKey, Arc<Vec<CandidateItem>>>>>,
}

impl CandidateRegistry {
    /// Create a registry with the shared global session already present
    pub fn new() -> Self {
        let mut sessions = HashMap::new();
        sessions.insert(SessionKey::global(), Arc::new(Vec::new()));
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
        }
    }

    /// Replace the session's candidates, numbering them from 1
    pub async fn write(
        &self,
        session: &SessionKey,
        items: Vec<CandidateItem>,
    ) -> Arc<Vec<CandidateItem>> {
        self.write_page(session, items, 0).await
    }

    /// Replace the session's candidates, numbering them from `offset + 1`
    ///
    /// Items that would be numbered past `u32::MAX` are dropped.
    pub async fn write_page(
        &self,
        session: &SessionKey,
        items: Vec<CandidateItem>,
        offset: u32,
    ) -> Arc<Vec<CandidateItem>> {
        let numbers = offset.checked_add(1).into_iter().flat_map(|first| first..=u32::MAX);
        let numbered: Vec<CandidateItem> = items
            .into_iter()
            .zip(numbers)
            .map(|(mut item, num)| {
                item.num = num;
                item
            })
            .collect();
        let snapshot = Arc::new(numbered);

        self.sessions
            .write()
            .await
            .insert(session.clone(), Arc::clone(&snapshot));

        tracing::debug!(session = %session, count = snapshot.len(), offset, "Registry replaced");
        snapshot
    }

    /// Current candidates for the session; empty if never written
    pub async fn read(&self, session: &SessionKey) -> Arc<Vec<CandidateItem>> {
        self.sessions
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }


}
