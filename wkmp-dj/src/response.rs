//! Result returned for every request, conversational or direct

use serde::Serialize;

use crate::error::Error;
use crate::playback::QueueEntry;
use crate::registry::CandidateItem;

/// Sentinel title when nothing is loaded
pub const NOTHING_PLAYING: &str = "Nothing playing";

/// Current track as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub volume: u32,
    #[serde(rename = "playbackState")]
    pub playback_state: String,
}

impl NowPlaying {
    pub fn is_playing_something(&self) -> bool {
        self.title != NOTHING_PLAYING
    }
}

/// Outcome of one request
///
/// `message` is always non-empty. Input and collaborator errors are carried
/// in `error` with the same text substituted into `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DispatchResult {
    pub message: String,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<CandidateItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<Vec<QueueEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<CandidateItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now_playing: Option<NowPlaying>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn ok(action: &'static str, message: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Caller supplied something unusable; no collaborator was called
    pub fn input_error(action: &'static str, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            action,
            message: error.clone(),
            error: Some(error),
            ..Default::default()
        }
    }

    /// A collaborator failed; the request is abandoned, the process is not
    pub fn failed(action: &'static str, error: &Error) -> Self {
        tracing::warn!(action, error = %error, "Request failed");
        Self {
            action,
            message: format!("Error: {}", error),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_substitutes_message() {
        let result = DispatchResult::input_error("play", "Provide num or uri");
        assert_eq!(result.message, "Provide num or uri");
        assert_eq!(result.error.as_deref(), Some("Provide num or uri"));
        assert!(result.is_error());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let result = DispatchResult::ok("pause", "⏸️ Paused").with_status("paused");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["action"], "pause");
        assert_eq!(json["status"], "paused");
        assert!(json.get("error").is_none());
        assert!(json.get("results").is_none());
    }

    #[test]
    fn test_failed_wraps_collaborator_error() {
        let result =
            DispatchResult::failed("skip", &Error::Playback("Sonos unreachable".to_string()));
        assert!(result.message.starts_with("Error: "));
        assert!(result.message.contains("Sonos unreachable"));
    }

    #[test]
    fn test_now_playing_field_names() {
        let np = NowPlaying {
            title: NOTHING_PLAYING.to_string(),
            artist: String::new(),
            album: String::new(),
            volume: 10,
            playback_state: "STOPPED".to_string(),
        };
        let json = serde_json::to_value(&np).unwrap();
        assert_eq!(json["playbackState"], "STOPPED");
        assert!(!np.is_playing_something());
    }
}
