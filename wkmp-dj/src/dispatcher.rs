//! Action dispatcher
//!
//! Each call is one transition: read the session's candidates, validate the
//! request against them, call at most a handful of collaborators, write the
//! registry if the action produces a new candidate list, and build the
//! [`DispatchResult`]. Direct API callers use the per-action methods;
//! conversational requests go through [`Dispatcher::dispatch`], which adds
//! message templating on top.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::intent::{Action, Intent};
use crate::locator::{parse_track_locator, LocatorError};
use crate::playback::PlaybackBackend;
use crate::registry::{CandidateItem, CandidateKind, CandidateRegistry};
use crate::response::{DispatchResult, NowPlaying, NOTHING_PLAYING};
use crate::session::SessionKey;

/// Queue entries included in a showqueue result
pub const QUEUE_DISPLAY_LIMIT: usize = 10;

/// Upper bound for any catalog page size
pub const MAX_LIMIT: u32 = 50;

const HELP_MESSAGE: &str = "🎧 Try things like: \"play some jazz\", \"queue 3\", \"play 2 next\", \
\"pause\", \"skip\", \"turn it up\", \"what's playing?\", \"show the queue\" \
or \"clear the queue\".";

const CHAT_DEFAULT_MESSAGE: &str = "🎧 What do you want to hear?";

/// How a play/queue/next request names its target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Candidate number from the latest registry write
    pub num: Option<u32>,
    /// Explicit locator; takes precedence over `num`
    pub uri: Option<String>,
}

impl Selection {
    pub fn num(num: u32) -> Self {
        Self {
            num: Some(num),
            uri: None,
        }
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            num: None,
            uri: Some(uri.into()),
        }
    }
}

/// Where a selected locator goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Now,
    End,
    Next,
}

impl Placement {
    fn action(&self) -> Action {
        match self {
            Placement::Now => Action::Play,
            Placement::End => Action::Queue,
            Placement::Next => Action::Next,
        }
    }

    fn status(&self) -> &'static str {
        match self {
            Placement::Now => "playing",
            Placement::End => "queued",
            Placement::Next => "playing next",
        }
    }

    fn confirmation(&self, name: &str) -> String {
        match self {
            Placement::Now => format!("▶️ Now playing: {}", name),
            Placement::End => format!("➕ Queued: {}", name),
            Placement::Next => format!("⏭️ Playing next: {}", name),
        }
    }
}

/// Candidate lookup outcome
enum Resolved {
    Item(CandidateItem),
    Uri(String),
}

/// Executes actions against the catalog and playback backend
#[derive(Clone)]
pub struct Dispatcher {
    registry: CandidateRegistry,
    catalog: Option<Arc<dyn Catalog>>,
    playback: Arc<dyn PlaybackBackend>,
    search_limit: u32,
}

impl Dispatcher {
    pub fn new(
        registry: CandidateRegistry,
        catalog: Option<Arc<dyn Catalog>>,
        playback: Arc<dyn PlaybackBackend>,
        search_limit: u32,
    ) -> Self {
        Self {
            registry,
            catalog,
            playback,
            search_limit: search_limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn registry(&self) -> &CandidateRegistry {
        &self.registry
    }

    fn catalog(&self) -> Result<&Arc<dyn Catalog>> {
        self.catalog
            .as_ref()
            .ok_or_else(|| Error::Config("Music catalog is not configured".to_string()))
    }

    // ========================================================================
    // Conversational entry point
    // ========================================================================

    /// Execute a resolved intent and template the reply
    pub async fn dispatch(&self, session: &SessionKey, intent: Intent) -> DispatchResult {
        let model_message = intent.message.trim().to_string();

        let mut result = match intent.action {
            Action::Search => {
                let query = intent.query.unwrap_or_default();
                self.search(session, &query, CandidateKind::Track, None).await
            }
            Action::Play => self.play(session, Selection { num: intent.num, uri: None }).await,
            Action::Queue => self.queue(session, Selection { num: intent.num, uri: None }).await,
            Action::Next => self.next(session, Selection { num: intent.num, uri: None }).await,
            Action::Pause => self.pause().await,
            Action::Resume => self.resume().await,
            Action::Skip => self.skip().await,
            Action::Previous => self.previous().await,
            Action::Volume => self.volume(intent.level, intent.change).await,
            Action::NowPlaying => self.now_playing().await,
            Action::ShowQueue => self.show_queue().await,
            Action::Clear => self.clear().await,
            Action::Help => self.help(),
            Action::Chat => self.chat(&model_message),
        };

        if result.is_error() || model_message.is_empty() {
            return result;
        }

        match intent.action {
            Action::Search => {
                result.message = format!("{} {}", model_message, result.message);
            }
            Action::Pause | Action::Resume | Action::Skip | Action::Previous | Action::Volume => {
                result.message = model_message;
            }
            _ => {}
        }
        result
    }

    // ========================================================================
    // Search and selection
    // ========================================================================

    /// Search the catalog and replace the session's candidates.
    ///
    /// Zero hits is a normal result with an empty list.
    pub async fn search(
        &self,
        session: &SessionKey,
        query: &str,
        kind: CandidateKind,
        limit: Option<u32>,
    ) -> DispatchResult {
        let action = Action::Search.as_str();
        let query = query.trim();
        if query.is_empty() {
            return DispatchResult::input_error(action, "No query provided");
        }

        let limit = limit.unwrap_or(self.search_limit).clamp(1, MAX_LIMIT);
        let items = match self.catalog() {
            Ok(catalog) => catalog.search(query, kind, limit).await,
            Err(e) => Err(e),
        };

        match items {
            Ok(items) => {
                let snapshot = self.registry.write(session, items).await;
                tracing::info!(
                    session = %session,
                    query = %query,
                    count = snapshot.len(),
                    "Search results stored"
                );

                let mut result = DispatchResult::ok(
                    action,
                    format!("Found {} {}.", snapshot.len(), kind.plural()),
                );
                result.query = Some(query.to_string());
                result.results = Some(snapshot.as_ref().clone());
                result
            }
            Err(e) => DispatchResult::failed(action, &e),
        }
    }

    pub async fn play(&self, session: &SessionKey, selection: Selection) -> DispatchResult {
        self.place(session, selection, Placement::Now).await
    }

    pub async fn queue(&self, session: &SessionKey, selection: Selection) -> DispatchResult {
        self.place(session, selection, Placement::End).await
    }

    pub async fn next(&self, session: &SessionKey, selection: Selection) -> DispatchResult {
        self.place(session, selection, Placement::Next).await
    }

    async fn place(
        &self,
        session: &SessionKey,
        selection: Selection,
        placement: Placement,
    ) -> DispatchResult {
        let action = placement.action().as_str();

        let resolved = match self.resolve_selection(session, selection).await {
            Ok(resolved) => resolved,
            Err(message) => return DispatchResult::input_error(action, message),
        };

        let (locator, name) = match &resolved {
            Resolved::Item(item) => (item.uri.clone(), item.name.clone()),
            Resolved::Uri(uri) => (uri.clone(), uri.clone()),
        };

        let sent = match placement {
            Placement::Now => self.playback.play_now(&locator).await,
            Placement::End => self.playback.enqueue(&locator).await,
            Placement::Next => self.playback.play_next(&locator).await,
        };

        if let Err(e) = sent {
            return DispatchResult::failed(action, &e);
        }

        tracing::info!(
            session = %session,
            action,
            locator = %locator,
            "Selection sent to playback"
        );
        let mut result = DispatchResult::ok(action, placement.confirmation(&name))
            .with_status(placement.status());
        match resolved {
            Resolved::Item(item) => result.item = Some(item),
            Resolved::Uri(uri) => result.uri = Some(uri),
        }
        result
    }

    /// Map a selection to a locator using the latest registry write.
    /// Only an absent `num` counts as "not provided"; `0` is out of range.
    async fn resolve_selection(
        &self,
        session: &SessionKey,
        selection: Selection,
    ) -> std::result::Result<Resolved, String> {
        if let Some(uri) = selection.uri.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            return Ok(Resolved::Uri(uri));
        }

        let Some(num) = selection.num else {
            return Err("Provide num or uri".to_string());
        };

        let snapshot = self.registry.read(session).await;
        let (Some(first), Some(last)) = (snapshot.first(), snapshot.last()) else {
            return Err("Invalid selection. Nothing to choose from yet, search first.".to_string());
        };

        snapshot
            .iter()
            .find(|item| item.num == num)
            .cloned()
            .map(Resolved::Item)
            .ok_or_else(|| format!("Invalid selection. Choose {}-{}", first.num, last.num))
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn pause(&self) -> DispatchResult {
        self.transport(Action::Pause, "paused", "⏸️ Paused", self.playback.pause()).await
    }

    pub async fn resume(&self) -> DispatchResult {
        self.transport(Action::Resume, "playing", "▶️ Resumed", self.playback.resume()).await
    }

    pub async fn skip(&self) -> DispatchResult {
        self.transport(Action::Skip, "skipped", "⏭️ Skipped", self.playback.skip()).await
    }

    pub async fn previous(&self) -> DispatchResult {
        self.transport(
            Action::Previous,
            "previous",
            "⏮️ Back one track",
            self.playback.previous(),
        )
        .await
    }

    async fn transport(
        &self,
        action: Action,
        status: &str,
        message: &str,
        call: impl std::future::Future<Output = Result<()>>,
    ) -> DispatchResult {
        match call.await {
            Ok(()) => {
                tracing::info!(action = %action, "Transport command sent");
                DispatchResult::ok(action.as_str(), message).with_status(status)
            }
            Err(e) => DispatchResult::failed(action.as_str(), &e),
        }
    }

    /// Set, adjust or report the volume. `level` wins if both are given.
    pub async fn volume(&self, level: Option<u32>, change: Option<i32>) -> DispatchResult {
        let action = Action::Volume.as_str();

        if let Some(level) = level {
            if change.is_some() {
                tracing::debug!("Both level and change given, using level");
            }
            if level > 100 {
                return DispatchResult::input_error(action, "Volume must be between 0 and 100");
            }
            return match self.playback.set_volume(level).await {
                Ok(()) => {
                    let mut result =
                        DispatchResult::ok(action, format!("🔊 Volume set to {}", level))
                            .with_status("volume set");
                    result.volume = Some(level);
                    result
                }
                Err(e) => DispatchResult::failed(action, &e),
            };
        }

        if let Some(delta) = change {
            return match self.playback.adjust_volume(delta).await {
                Ok(()) => {
                    let message = if delta >= 0 {
                        format!("🔊 Volume up {}", delta)
                    } else {
                        format!("🔉 Volume down {}", delta.unsigned_abs())
                    };
                    DispatchResult::ok(action, message).with_status("volume adjusted")
                }
                Err(e) => DispatchResult::failed(action, &e),
            };
        }

        match self.playback.state().await {
            Ok(state) => {
                let mut result =
                    DispatchResult::ok(action, format!("🔊 Volume is {}", state.volume));
                result.volume = Some(state.volume);
                result
            }
            Err(e) => DispatchResult::failed(action, &e),
        }
    }

    // ========================================================================
    // State queries
    // ========================================================================

    pub async fn now_playing(&self) -> DispatchResult {
        let action = Action::NowPlaying.as_str();
        let state = match self.playback.state().await {
            Ok(state) => state,
            Err(e) => return DispatchResult::failed(action, &e),
        };

        let now_playing = match state.current_track {
            Some(track) => NowPlaying {
                title: track.title,
                artist: track.artist,
                album: track.album,
                volume: state.volume,
                playback_state: state.playback_state,
            },
            None => NowPlaying {
                title: NOTHING_PLAYING.to_string(),
                artist: String::new(),
                album: String::new(),
                volume: state.volume,
                playback_state: state.playback_state,
            },
        };

        let message = if !now_playing.is_playing_something() {
            format!("🔇 {}", NOTHING_PLAYING)
        } else if now_playing.artist.is_empty() {
            format!("🎵 {}", now_playing.title)
        } else {
            format!("🎵 {} by {}", now_playing.title, now_playing.artist)
        };

        let mut result = DispatchResult::ok(action, message);
        result.volume = Some(now_playing.volume);
        result.now_playing = Some(now_playing);
        result
    }

    pub async fn show_queue(&self) -> DispatchResult {
        let action = Action::ShowQueue.as_str();
        match self.playback.queue().await {
            Ok(entries) if entries.is_empty() => {
                let mut result = DispatchResult::ok(action, "📭 Queue is empty");
                result.queue = Some(Vec::new());
                result.total = Some(0);
                result
            }
            Ok(entries) => {
                let total = entries.len();
                let mut result =
                    DispatchResult::ok(action, format!("📋 Queue has {} tracks", total));
                result.total = Some(u32::try_from(total).unwrap_or(u32::MAX));
                result.queue = Some(entries.into_iter().take(QUEUE_DISPLAY_LIMIT).collect());
                result
            }
            Err(e) => DispatchResult::failed(action, &e),
        }
    }

    pub async fn clear(&self) -> DispatchResult {
        let action = Action::Clear.as_str();
        match self.playback.clear_queue().await {
            Ok(()) => {
                tracing::info!("Queue cleared");
                DispatchResult::ok(action, "🗑️ Queue cleared!").with_status("queue cleared")
            }
            Err(e) => DispatchResult::failed(action, &e),
        }
    }

    pub fn help(&self) -> DispatchResult {
        DispatchResult::ok(Action::Help.as_str(), HELP_MESSAGE)
    }

    /// Pass-through reply; no collaborator is touched
    pub fn chat(&self, message: &str) -> DispatchResult {
        let message = message.trim();
        let message = if message.is_empty() { CHAT_DEFAULT_MESSAGE } else { message };
        DispatchResult::ok(Action::Chat.as_str(), message)
    }

    // ========================================================================
    // Library listings
    // ========================================================================

    /// User playlists, numbered from `offset + 1`
    pub async fn my_playlists(
        &self,
        session: &SessionKey,
        limit: u32,
        offset: u32,
    ) -> DispatchResult {
        let page = match self.catalog() {
            Ok(catalog) => catalog.user_playlists(limit.clamp(1, MAX_LIMIT), offset).await,
            Err(e) => Err(e),
        };
        self.store_page(session, "playlists", "📚 Playlists", page, offset).await
    }

    /// Saved tracks, numbered from `offset + 1`
    pub async fn my_liked(&self, session: &SessionKey, limit: u32, offset: u32) -> DispatchResult {
        let page = match self.catalog() {
            Ok(catalog) => catalog.saved_tracks(limit.clamp(1, MAX_LIMIT), offset).await,
            Err(e) => Err(e),
        };
        self.store_page(session, "liked", "❤️ Liked songs", page, offset).await
    }

    async fn store_page(
        &self,
        session: &SessionKey,
        action: &'static str,
        label: &str,
        page: Result<crate::catalog::Page>,
        offset: u32,
    ) -> DispatchResult {
        let page = match page {
            Ok(page) => page,
            Err(e) => return DispatchResult::failed(action, &e),
        };

        let total = page.total;
        let snapshot = self.registry.write_page(session, page.items, offset).await;

        let message = match (snapshot.first(), snapshot.last()) {
            (Some(first), Some(last)) => {
                format!("{} {}-{} of {}", label, first.num, last.num, total)
            }
            _ => format!("{}: nothing here (total {})", label, total),
        };

        let mut result = DispatchResult::ok(action, message);
        result.results = Some(snapshot.as_ref().clone());
        result.total = Some(total);
        result
    }

    // ========================================================================
    // Current-track features
    // ========================================================================

    /// Catalog track ID and title of whatever is playing
    async fn current_track_id(&self) -> std::result::Result<(String, String), CurrentTrackError> {
        let state = self.playback.state().await?;
        let track = state.current_track.ok_or(CurrentTrackError::NothingPlaying)?;
        let id = parse_track_locator(&track.uri).map_err(Error::from)?;
        Ok((id, track.title))
    }

    /// Save the current track to the user's library
    pub async fn like(&self) -> DispatchResult {
        let action = "like";
        let (track_id, title) = match self.current_track_id().await {
            Ok(found) => found,
            Err(e) => return e.into_result(action),
        };

        let saved = match self.catalog() {
            Ok(catalog) => catalog.save_tracks(std::slice::from_ref(&track_id)).await,
            Err(e) => Err(e),
        };

        match saved {
            Ok(()) => {
                tracing::info!(track_id = %track_id, "Liked current track");
                DispatchResult::ok(action, format!("❤️ Liked: {}", title)).with_status("liked")
            }
            Err(e) => DispatchResult::failed(action, &e),
        }
    }

    /// Replace the candidates with tracks similar to the current one
    pub async fn recommend(&self, session: &SessionKey, limit: Option<u32>) -> DispatchResult {
        let action = "recommend";
        let (track_id, title) = match self.current_track_id().await {
            Ok(found) => found,
            Err(e) => return e.into_result(action),
        };

        let limit = limit.unwrap_or(self.search_limit).clamp(1, MAX_LIMIT);
        let items = match self.catalog() {
            Ok(catalog) => catalog.recommendations(&track_id, limit).await,
            Err(e) => Err(e),
        };

        match items {
            Ok(items) => {
                let snapshot = self.registry.write(session, items).await;
                let mut result = DispatchResult::ok(
                    action,
                    format!("✨ Found {} tracks like {}.", snapshot.len(), title),
                );
                result.results = Some(snapshot.as_ref().clone());
                result
            }
            Err(e) => DispatchResult::failed(action, &e),
        }
    }

    /// Replace the candidates with the current track's album
    pub async fn album(&self, session: &SessionKey) -> DispatchResult {
        let action = "album";
        let (track_id, _) = match self.current_track_id().await {
            Ok(found) => found,
            Err(e) => return e.into_result(action),
        };

        let catalog = match self.catalog() {
            Ok(catalog) => catalog,
            Err(e) => return DispatchResult::failed(action, &e),
        };

        let detail = match catalog.track(&track_id).await {
            Ok(detail) => detail,
            Err(e) => return DispatchResult::failed(action, &e),
        };

        let Some(album_id) = detail.album_id else {
            return DispatchResult::input_error(action, "Could not find the album for this track");
        };

        match catalog.album_tracks(&album_id).await {
            Ok(items) => {
                let snapshot = self.registry.write(session, items).await;
                let album_name = detail.album.unwrap_or_else(|| "Album".to_string());
                let mut result = DispatchResult::ok(
                    action,
                    format!("💿 {}: {} tracks", album_name, snapshot.len()),
                );
                result.results = Some(snapshot.as_ref().clone());
                result
            }
            Err(e) => DispatchResult::failed(action, &e),
        }
    }
}

/// Why the current track could not be identified in the catalog
enum CurrentTrackError {
    NothingPlaying,
    Lookup(Error),
}

impl From<Error> for CurrentTrackError {
    fn from(e: Error) -> Self {
        CurrentTrackError::Lookup(e)
    }
}

impl CurrentTrackError {
    fn into_result(self, action: &'static str) -> DispatchResult {
        match self {
            CurrentTrackError::NothingPlaying => {
                DispatchResult::input_error(action, NOTHING_PLAYING)
            }
            CurrentTrackError::Lookup(Error::Locator(LocatorError::NotFromCatalog(_))) => {
                DispatchResult::input_error(action, "Current track is not from Spotify")
            }
            CurrentTrackError::Lookup(Error::Locator(LocatorError::Malformed { .. })) => {
                DispatchResult::input_error(action, "Could not parse track URI")
            }
            CurrentTrackError::Lookup(e) => DispatchResult::failed(action, &e),
        }
    }
}
