//! Error types for wkmp-dj
//!
//! Collaborator failures are carried as `Error` up to the dispatcher, which
//! turns them into an in-band failure message. Nothing here reaches the HTTP
//! caller as a non-200 response.

use thiserror::Error;

use crate::locator::LocatorError;

/// Main error type for wkmp-dj
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Music catalog (Spotify) request failed or returned an unusable body
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Playback backend (Sonos HTTP API) request failed
    #[error("Playback error: {0}")]
    Playback(String),

    /// Language model request failed, timed out, or replied with garbage
    #[error("Language model error: {0}")]
    LanguageModel(String),

    /// Backend-reported locator could not be mapped to a catalog ID
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Shared configuration/IO error from wkmp-common
    #[error(transparent)]
    Common(#[from] wkmp_common::Error),
}

/// Convenience Result type using wkmp-dj Error
pub type Result<T> = std::result::Result<T, Error>;
