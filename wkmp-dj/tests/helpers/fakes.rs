//! In-memory collaborators

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use wkmp_dj::catalog::{Catalog, Page, TrackDetail};
use wkmp_dj::llm::LanguageModel;
use wkmp_dj::playback::{CurrentTrack, PlaybackBackend, PlayerState, QueueEntry};
use wkmp_dj::registry::{CandidateItem, CandidateKind};
use wkmp_dj::{Error, Result};

// ============================================================================
// Catalog
// ============================================================================

#[derive(Default)]
pub struct FakeCatalog {
    search_results: HashMap<String, Vec<CandidateItem>>,
    tracks: HashMap<String, TrackDetail>,
    albums: HashMap<String, Vec<CandidateItem>>,
    recommendations: Vec<CandidateItem>,
    playlists: Vec<CandidateItem>,
    liked: Vec<CandidateItem>,
    failing: bool,
    saved: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog whose every call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, query: &str, items: Vec<CandidateItem>) -> Self {
        self.search_results.insert(query.to_lowercase(), items);
        self
    }

    pub fn with_track(mut self, detail: TrackDetail) -> Self {
        self.tracks.insert(detail.id.clone(), detail);
        self
    }

    pub fn with_album(mut self, album_id: &str, items: Vec<CandidateItem>) -> Self {
        self.albums.insert(album_id.to_string(), items);
        self
    }

    pub fn with_recommendations(mut self, items: Vec<CandidateItem>) -> Self {
        self.recommendations = items;
        self
    }

    pub fn with_playlists(mut self, items: Vec<CandidateItem>) -> Self {
        self.playlists = items;
        self
    }

    pub fn with_liked(mut self, items: Vec<CandidateItem>) -> Self {
        self.liked = items;
        self
    }

    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            return Err(Error::Catalog("Spotify API error: 503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

fn page(items: &[CandidateItem], limit: u32, offset: u32) -> Page {
    Page {
        items: items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect(),
        total: items.len() as u32,
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search(
        &self,
        query: &str,
        kind: CandidateKind,
        limit: u32,
    ) -> Result<Vec<CandidateItem>> {
        self.record(format!("search:{}:{}:{}", kind, query, limit))?;
        let mut items = self
            .search_results
            .get(&query.to_lowercase())
            .cloned()
            .unwrap_or_default();
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn track(&self, track_id: &str) -> Result<TrackDetail> {
        self.record(format!("track:{}", track_id))?;
        self.tracks
            .get(track_id)
            .cloned()
            .ok_or_else(|| Error::Catalog(format!("Spotify API error: 404 for track {}", track_id)))
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CandidateItem>> {
        self.record(format!("album_tracks:{}", album_id))?;
        Ok(self.albums.get(album_id).cloned().unwrap_or_default())
    }

    async fn recommendations(&self, seed_track_id: &str, limit: u32) -> Result<Vec<CandidateItem>> {
        self.record(format!("recommendations:{}:{}", seed_track_id, limit))?;
        Ok(self.recommendations.iter().take(limit as usize).cloned().collect())
    }

    async fn user_playlists(&self, limit: u32, offset: u32) -> Result<Page> {
        self.record(format!("user_playlists:{}:{}", limit, offset))?;
        Ok(page(&self.playlists, limit, offset))
    }

    async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<Page> {
        self.record(format!("saved_tracks:{}:{}", limit, offset))?;
        Ok(page(&self.liked, limit, offset))
    }

    async fn save_tracks(&self, track_ids: &[String]) -> Result<()> {
        self.record(format!("save_tracks:{}", track_ids.join(",")))?;
        self.saved.lock().unwrap().extend(track_ids.iter().cloned());
        Ok(())
    }
}

// ============================================================================
// Playback
// ============================================================================

#[derive(Default)]
pub struct RecordingPlayback {
    calls: Mutex<Vec<String>>,
    state: Mutex<PlayerState>,
    queue: Mutex<Vec<QueueEntry>>,
    failing: bool,
}

impl RecordingPlayback {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlayerState {
                current_track: None,
                volume: 30,
                playback_state: "STOPPED".to_string(),
            }),
            ..Self::default()
        }
    }

    /// Backend that is unreachable for every call
    pub fn unreachable() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn playing(self, title: &str, artist: &str, uri: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.current_track = Some(CurrentTrack {
                title: title.to_string(),
                artist: artist.to_string(),
                album: "Test Album".to_string(),
                uri: uri.to_string(),
            });
            state.playback_state = "PLAYING".to_string();
        }
        self
    }

    pub fn with_queue_len(self, len: usize) -> Self {
        *self.queue.lock().unwrap() = (1..=len)
            .map(|i| QueueEntry {
                title: format!("Queued {}", i),
                artist: "Test Artist".to_string(),
                album: None,
            })
            .collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            return Err(Error::Playback("Sonos unreachable: connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackBackend for RecordingPlayback {
    async fn play_now(&self, locator: &str) -> Result<()> {
        self.record(format!("play_now:{}", locator))
    }

    async fn enqueue(&self, locator: &str) -> Result<()> {
        self.record(format!("enqueue:{}", locator))
    }

    async fn play_next(&self, locator: &str) -> Result<()> {
        self.record(format!("play_next:{}", locator))
    }

    async fn pause(&self) -> Result<()> {
        self.record("pause".to_string())
    }

    async fn resume(&self) -> Result<()> {
        self.record("resume".to_string())
    }

    async fn skip(&self) -> Result<()> {
        self.record("skip".to_string())
    }

    async fn previous(&self) -> Result<()> {
        self.record("previous".to_string())
    }

    async fn set_volume(&self, level: u32) -> Result<()> {
        self.record(format!("set_volume:{}", level))?;
        self.state.lock().unwrap().volume = level;
        Ok(())
    }

    async fn adjust_volume(&self, delta: i32) -> Result<()> {
        self.record(format!("adjust_volume:{}", delta))
    }

    async fn state(&self) -> Result<PlayerState> {
        self.record("state".to_string())?;
        Ok(self.state.lock().unwrap().clone())
    }

    async fn queue(&self) -> Result<Vec<QueueEntry>> {
        self.record("queue".to_string())?;
        Ok(self.queue.lock().unwrap().clone())
    }

    async fn clear_queue(&self) -> Result<()> {
        self.record("clear_queue".to_string())?;
        self.queue.lock().unwrap().clear();
        Ok(())
    }
}

// ============================================================================
// Language model
// ============================================================================

pub struct ScriptedModel {
    reply: String,
    delay: Duration,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replies only after `delay`
    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::replying(reply)
        }
    }

    /// (system prompt, user message) pairs received so far
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_message.to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
