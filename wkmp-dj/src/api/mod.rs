//! HTTP API handlers for wkmp-dj
//!
//! Every route is a GET with query parameters and answers JSON. Bad input
//! is reported in-band through the result's `error` field with status 200.

pub mod chat;
pub mod control;
pub mod health;
pub mod index;
pub mod library;
pub mod params;

pub use chat::chat;
pub use control::{
    clear_queue, get_queue, help, next, now_playing, pause, play, previous, queue, resume, skip,
    volume,
};
pub use health::health_routes;
pub use index::serve_index;
pub use library::{album, like, my_liked, my_playlists, recommend, search};
