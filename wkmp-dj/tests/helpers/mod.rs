//! Test helpers for wkmp-dj integration tests
//!
//! - FakeCatalog: canned search and library data
//! - RecordingPlayback: records every backend primitive it receives
//! - ScriptedModel: language model with a fixed reply and optional delay

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{FakeCatalog, RecordingPlayback, ScriptedModel};

use std::sync::Arc;
use std::time::Duration;

use wkmp_dj::catalog::Catalog;
use wkmp_dj::dispatcher::Dispatcher;
use wkmp_dj::registry::{CandidateItem, CandidateKind, CandidateRegistry};
use wkmp_dj::resolver::IntentResolver;
use wkmp_dj::DjService;

/// Unnumbered track candidate as a catalog would return it
pub fn track(name: &str, artist: &str, uri: &str) -> CandidateItem {
    CandidateItem::new(CandidateKind::Track, name, uri).with_artist(artist)
}

/// `count` tracks named `{prefix} 1..=count`
pub fn tracks(prefix: &str, count: u32) -> Vec<CandidateItem> {
    (1..=count)
        .map(|i| {
            track(
                &format!("{} {}", prefix, i),
                "Test Artist",
                &format!("spotify:track:{}{}", prefix, i),
            )
        })
        .collect()
}

pub fn dispatcher(catalog: Arc<FakeCatalog>, playback: Arc<RecordingPlayback>) -> Dispatcher {
    Dispatcher::new(
        CandidateRegistry::new(),
        Some(catalog as Arc<dyn Catalog>),
        playback,
        5,
    )
}

pub fn service_with_model(
    catalog: Arc<FakeCatalog>,
    playback: Arc<RecordingPlayback>,
    model: Arc<ScriptedModel>,
    timeout: Duration,
) -> DjService {
    DjService::new(
        dispatcher(catalog, playback),
        Some(IntentResolver::new(model, timeout)),
    )
}
