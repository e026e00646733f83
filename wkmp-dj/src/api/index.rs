//! Endpoint index

use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn serve_index() -> Json<Value> {
    Json(json!({
        "status": "DJ server running",
        "module": "wkmp-dj",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "/chat?message=<text> - Natural language commands",
            "search": "/search?q=<query>&type=<track|album|artist|playlist>&limit=<n>",
            "play": "/play?num=<num> or /play?uri=<uri>",
            "queue": "/queue?num=<num> (add to end)",
            "next": "/next?num=<num> (play after current)",
            "pause": "/pause",
            "resume": "/resume",
            "skip": "/skip",
            "previous": "/previous",
            "volume": "/volume?level=<0-100> or /volume?change=<+/-10>",
            "nowplaying": "/nowplaying",
            "getqueue": "/getqueue",
            "clearqueue": "/clearqueue",
            "playlists": "/my/playlists?limit=<n>&offset=<n>",
            "liked": "/my/liked?limit=<n>&offset=<n>",
            "like": "/like (like current track)",
            "recommend": "/recommend?limit=<n> (tracks like the current one)",
            "album": "/album (tracks from the current album)",
            "help": "/help",
            "health": "/health"
        },
        "session": "Pass session_id=<id> or an X-Session-Id header to keep your own result list"
    }))
}
