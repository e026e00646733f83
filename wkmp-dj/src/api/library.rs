//! Search and library endpoints
//!
//! Each of these except `/like` replaces the session's numbered results.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::params::{parse_number, PageParams};
use crate::intent::Action;
use crate::registry::CandidateKind;
use crate::response::DispatchResult;
use crate::session::Session;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<String>,
}

/// GET /search?q=<query>&type=<kind>&limit=<n>
pub async fn search(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<SearchParams>,
) -> Json<DispatchResult> {
    let action = Action::Search.as_str();

    let kind = match params.kind.as_deref().map(str::trim) {
        None | Some("") => CandidateKind::Track,
        Some(text) => match CandidateKind::parse(text) {
            Some(kind) => kind,
            None => {
                return Json(DispatchResult::input_error(
                    action,
                    format!("Unknown type: {}. Use track, album, artist or playlist", text),
                ))
            }
        },
    };

    let limit = match parse_number::<u32>("limit", params.limit.as_deref()) {
        Ok(limit) => limit,
        Err(message) => return Json(DispatchResult::input_error(action, message)),
    };

    Json(
        state
            .service
            .dispatcher()
            .search(&session, &params.q, kind, limit)
            .await,
    )
}

/// GET /my/playlists?limit=<n>&offset=<n>
pub async fn my_playlists(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<PageParams>,
) -> Json<DispatchResult> {
    let (limit, offset) = match (params.limit(), params.offset()) {
        (Ok(limit), Ok(offset)) => (limit, offset),
        (Err(message), _) | (_, Err(message)) => {
            return Json(DispatchResult::input_error("playlists", message))
        }
    };
    Json(state.service.dispatcher().my_playlists(&session, limit, offset).await)
}

/// GET /my/liked?limit=<n>&offset=<n>
pub async fn my_liked(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<PageParams>,
) -> Json<DispatchResult> {
    let (limit, offset) = match (params.limit(), params.offset()) {
        (Ok(limit), Ok(offset)) => (limit, offset),
        (Err(message), _) | (_, Err(message)) => {
            return Json(DispatchResult::input_error("liked", message))
        }
    };
    Json(state.service.dispatcher().my_liked(&session, limit, offset).await)
}

/// GET /like
pub async fn like(State(state): State<AppState>) -> Json<DispatchResult> {
    Json(state.service.dispatcher().like().await)
}

/// GET /recommend?limit=<n>
pub async fn recommend(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<LimitParams>,
) -> Json<DispatchResult> {
    let limit = match parse_number::<u32>("limit", params.limit.as_deref()) {
        Ok(limit) => limit,
        Err(message) => return Json(DispatchResult::input_error("recommend", message)),
    };
    Json(state.service.dispatcher().recommend(&session, limit).await)
}

/// GET /album
pub async fn album(
    State(state): State<AppState>,
    Session(session): Session,
) -> Json<DispatchResult> {
    Json(state.service.dispatcher().album(&session).await)
}
