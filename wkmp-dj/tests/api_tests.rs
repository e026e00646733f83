//! Integration tests for wkmp-dj HTTP endpoints
//!
//! Routes are driven with `oneshot` against fake collaborators; no network.

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

use helpers::{
    dispatcher, service_with_model, track, FakeCatalog, RecordingPlayback, ScriptedModel,
};
use wkmp_dj::{build_router, AppState, DjService};

fn catalog() -> Arc<FakeCatalog> {
    Arc::new(
        FakeCatalog::new()
            .with_search(
                "jazz",
                vec![
                    track("So What", "Miles Davis", "spotify:track:sowhat"),
                    track("Take Five", "Dave Brubeck", "spotify:track:takefive"),
                ],
            )
            .with_search(
                "rock",
                vec![track("Paranoid", "Black Sabbath", "spotify:track:paranoid")],
            ),
    )
}

/// Test helper: Router with no language model
fn setup_app(playback: Arc<RecordingPlayback>) -> axum::Router {
    let service = DjService::new(dispatcher(catalog(), playback), None);
    build_router(AppState::new(service))
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn get_json(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, serde_json::from_slice(&bytes).expect("Should parse JSON"))
}

// =============================================================================
// Health and index
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(Arc::new(RecordingPlayback::new()));

    let (status, body) = get_json(&app, test_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "wkmp-dj");
    assert!(body["version"].is_string());
    assert_eq!(body["natural_language"], false);
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let app = setup_app(Arc::new(RecordingPlayback::new()));

    let (status, body) = get_json(&app, test_request("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["chat"].is_string());
    assert!(body["endpoints"]["getqueue"].is_string());
}

// =============================================================================
// Search and selection
// =============================================================================

#[tokio::test]
async fn test_search_then_play_by_number() {
    let playback = Arc::new(RecordingPlayback::new());
    let app = setup_app(playback.clone());

    let (_, body) = get_json(&app, test_request("/search?q=jazz")).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][1]["num"], 2);
    assert_eq!(body["results"][1]["kind"], "track");

    let (_, body) = get_json(&app, test_request("/play?num=2")).await;
    assert_eq!(body["message"], "▶️ Now playing: Take Five");
    assert_eq!(body["item"]["uri"], "spotify:track:takefive");
    assert_eq!(playback.calls(), vec!["play_now:spotify:track:takefive"]);
}

#[tokio::test]
async fn test_input_errors_are_in_band() {
    let playback = Arc::new(RecordingPlayback::new());
    let app = setup_app(playback.clone());

    let (status, body) = get_json(&app, test_request("/search")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "No query provided");

    let (status, body) = get_json(&app, test_request("/queue")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Provide num or uri");

    let (_, body) = get_json(&app, test_request("/queue?num=abc")).await;
    assert_eq!(body["error"], "Invalid num: abc");

    let (_, body) = get_json(&app, test_request("/search?q=jazz&type=podcast")).await;
    assert!(body["error"].as_str().unwrap().starts_with("Unknown type"));

    assert!(playback.calls().is_empty());
}

#[tokio::test]
async fn test_session_header_and_query_isolate_results() {
    let playback = Arc::new(RecordingPlayback::new());
    let app = setup_app(playback.clone());

    get_json(&app, test_request("/search?q=jazz&session_id=kitchen")).await;
    let request = Request::builder()
        .uri("/search?q=rock")
        .header("X-Session-Id", "garage")
        .body(Body::empty())
        .unwrap();
    get_json(&app, request).await;

    get_json(&app, test_request("/next?num=1&session_id=kitchen")).await;
    let request = Request::builder()
        .uri("/next?num=1")
        .header("X-Session-Id", "garage")
        .body(Body::empty())
        .unwrap();
    get_json(&app, request).await;

    let (_, body) = get_json(&app, test_request("/next?num=1")).await;
    assert!(body["error"].is_string());

    assert_eq!(
        playback.calls(),
        vec!["play_next:spotify:track:sowhat", "play_next:spotify:track:paranoid"]
    );
}

// =============================================================================
// Transport and state
// =============================================================================

#[tokio::test]
async fn test_volume_parameters() {
    let playback = Arc::new(RecordingPlayback::new());
    let app = setup_app(playback.clone());

    let (_, body) = get_json(&app, test_request("/volume?level=0")).await;
    assert_eq!(body["volume"], 0);

    let (_, body) = get_json(&app, test_request("/volume?change=-5")).await;
    assert!(body.get("error").is_none());

    let (_, body) = get_json(&app, test_request("/volume?level=150")).await;
    assert!(body["error"].is_string());

    let (_, body) = get_json(&app, test_request("/volume")).await;
    assert_eq!(body["volume"], 0);

    assert_eq!(playback.calls(), vec!["set_volume:0", "adjust_volume:-5", "state"]);
}

#[tokio::test]
async fn test_transport_routes() {
    let playback = Arc::new(RecordingPlayback::new());
    let app = setup_app(playback.clone());

    for uri in ["/pause", "/resume", "/skip", "/previous", "/clearqueue"] {
        let (status, body) = get_json(&app, test_request(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("error").is_none(), "{} failed: {}", uri, body);
    }

    assert_eq!(playback.calls(), vec!["pause", "resume", "skip", "previous", "clear_queue"]);
}

#[tokio::test]
async fn test_now_playing_and_queue() {
    let playback = Arc::new(
        RecordingPlayback::new()
            .playing("So What", "Miles Davis", "spotify:track:sowhat")
            .with_queue_len(12),
    );
    let app = setup_app(playback);

    let (_, body) = get_json(&app, test_request("/nowplaying")).await;
    assert_eq!(body["now_playing"]["title"], "So What");
    assert_eq!(body["now_playing"]["playbackState"], "PLAYING");

    let (_, body) = get_json(&app, test_request("/getqueue")).await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["queue"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_unreachable_backend_does_not_fail_request() {
    let app = setup_app(Arc::new(RecordingPlayback::unreachable()));

    let (status, body) = get_json(&app, test_request("/skip")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("Error: "));
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_without_language_model() {
    let app = setup_app(Arc::new(RecordingPlayback::new()));

    let (_, body) = get_json(&app, test_request("/chat?message=play%20jazz")).await;

    assert_eq!(body["error"], "Natural language not configured");
}

#[tokio::test]
async fn test_chat_empty_message() {
    let app = setup_app(Arc::new(RecordingPlayback::new()));

    let (_, body) = get_json(&app, test_request("/chat")).await;

    assert_eq!(body["error"], "No message provided");
    assert_eq!(body["message"], "Please say something!");
}

#[tokio::test]
async fn test_chat_resolves_against_session() {
    let playback = Arc::new(RecordingPlayback::new());
    let model = Arc::new(ScriptedModel::replying(
        "```json\n{\"action\": \"queue\", \"num\": \"2\", \"message\": \"Added!\"}\n```",
    ));
    let service = service_with_model(catalog(), playback.clone(), model, Duration::from_secs(1));
    let app = build_router(AppState::new(service));

    get_json(&app, test_request("/search?q=jazz&session_id=den")).await;
    let (_, body) = get_json(&app, test_request("/chat?message=queue%202&session_id=den")).await;

    assert_eq!(body["action"], "queue");
    assert_eq!(body["message"], "➕ Queued: Take Five");
    assert_eq!(playback.calls(), vec!["enqueue:spotify:track:takefive"]);
}

// =============================================================================
// Library
// =============================================================================

#[tokio::test]
async fn test_like_without_current_track() {
    let app = setup_app(Arc::new(RecordingPlayback::new()));

    let (_, body) = get_json(&app, test_request("/like")).await;

    assert_eq!(body["error"], "Nothing playing");
}

#[tokio::test]
async fn test_liked_paging_parameters() {
    let app = setup_app(Arc::new(RecordingPlayback::new()));

    let (_, body) = get_json(&app, test_request("/my/liked?offset=x")).await;
    assert_eq!(body["error"], "Invalid offset: x");

    let (_, body) = get_json(&app, test_request("/my/liked?limit=10&offset=20")).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_paging_offset_past_numbering_range() {
    let app = setup_app(Arc::new(RecordingPlayback::new()));

    for uri in [
        "/my/liked?limit=5&offset=4294967295",
        "/my/playlists?limit=5&offset=4294967295",
    ] {
        let (status, body) = get_json(&app, test_request(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Offset must be at most 4294967245", "{}", uri);
    }

    let (_, body) = get_json(&app, test_request("/my/liked?limit=5&offset=4294967245")).await;
    assert!(body.get("error").is_none(), "{}", body);
}

// =============================================================================
// Build identification
// =============================================================================

#[test]
fn test_build_identification_is_exported() {
    assert!(!env!("GIT_HASH").is_empty());
    assert!(!env!("BUILD_PROFILE").is_empty());
    assert!(env!("BUILD_TIMESTAMP").ends_with('Z'));
}
