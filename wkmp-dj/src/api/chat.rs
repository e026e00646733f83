//! Natural-language endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::response::DispatchResult;
use crate::session::Session;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatParams {
    #[serde(default)]
    pub message: String,
}

/// GET /chat?message=<text>
pub async fn chat(
    State(state): State<AppState>,
    Session(session): Session,
    Query(params): Query<ChatParams>,
) -> Json<DispatchResult> {
    Json(state.service.handle_utterance(&params.message, &session).await)
}
