//! Playback control endpoints
//!
//! Direct operations; these never touch the language model.

use axum::{
    extract::{Query, State},
    Json,
};

use super::params::{SelectionParams, VolumeParams};
use crate::dispatcher::Selection;
use crate::intent::Action;
use crate::response::DispatchResult;
use crate::session::{Session, SessionKey};
use crate::AppState;

type ApiResult = Json<DispatchResult>;

async fn place(
    state: &AppState,
    action: Action,
    session: &SessionKey,
    params: &SelectionParams,
) -> DispatchResult {
    let selection: Selection = match params.selection() {
        Ok(selection) => selection,
        Err(message) => return DispatchResult::input_error(action.as_str(), message),
    };

    let dispatcher = state.service.dispatcher();
    match action {
        Action::Queue => dispatcher.queue(session, selection).await,
        Action::Next => dispatcher.next(session, selection).await,
        _ => dispatcher.play(session, selection).await,
    }
}

/// GET /play?num=<n>|uri=<uri>
pub async fn play(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<SelectionParams>,
) -> ApiResult {
    Json(place(&state, Action::Play, &session, &params).await)
}

/// GET /queue?num=<n>|uri=<uri>
pub async fn queue(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<SelectionParams>,
) -> ApiResult {
    Json(place(&state, Action::Queue, &session, &params).await)
}

/// GET /next?num=<n>|uri=<uri>
pub async fn next(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<SelectionParams>,
) -> ApiResult {
    Json(place(&state, Action::Next, &session, &params).await)
}

/// GET /pause
pub async fn pause(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().pause().await)
}

/// GET /resume
pub async fn resume(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().resume().await)
}

/// GET /skip
pub async fn skip(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().skip().await)
}

/// GET /previous
pub async fn previous(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().previous().await)
}

/// GET /volume?level=<0-100>|change=<+/-n>
///
/// With neither parameter, reports the current volume.
pub async fn volume(
    State(state): State<AppState>,
    Query(params): Query<VolumeParams>,
) -> ApiResult {
    let action = Action::Volume.as_str();
    let level = match params.level() {
        Ok(level) => level,
        Err(message) => return Json(DispatchResult::input_error(action, message)),
    };
    let change = match params.change() {
        Ok(change) => change,
        Err(message) => return Json(DispatchResult::input_error(action, message)),
    };
    Json(state.service.dispatcher().volume(level, change).await)
}

/// GET /nowplaying
pub async fn now_playing(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().now_playing().await)
}

/// GET /getqueue
pub async fn get_queue(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().show_queue().await)
}

/// GET /clearqueue
pub async fn clear_queue(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().clear().await)
}

/// GET /help
pub async fn help(State(state): State<AppState>) -> ApiResult {
    Json(state.service.dispatcher().help())
}
