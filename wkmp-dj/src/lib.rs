//! wkmp-dj library - conversational DJ service
//!
//! Search, queue and transport control for a Sonos zone, driven either by
//! direct HTTP calls or by free text resolved through a language model.

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod llm;
pub mod locator;
pub mod playback;
pub mod registry;
pub mod resolver;
pub mod response;
pub mod service;
pub mod session;

pub use error::{Error, Result};
pub use service::DjService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: DjService,
}

impl AppState {
    pub fn new(service: DjService) -> Self {
        Self { service }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/help", get(api::help))
        .route("/chat", get(api::chat))
        .route("/search", get(api::search))
        // Selection
        .route("/play", get(api::play))
        .route("/queue", get(api::queue))
        .route("/next", get(api::next))
        // Transport
        .route("/pause", get(api::pause))
        .route("/resume", get(api::resume))
        .route("/skip", get(api::skip))
        .route("/previous", get(api::previous))
        .route("/volume", get(api::volume))
        // State
        .route("/nowplaying", get(api::now_playing))
        .route("/getqueue", get(api::get_queue))
        .route("/clearqueue", get(api::clear_queue))
        // Library
        .route("/my/playlists", get(api::my_playlists))
        .route("/my/liked", get(api::my_liked))
        .route("/like", get(api::like))
        .route("/recommend", get(api::recommend))
        .route("/album", get(api::album))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
