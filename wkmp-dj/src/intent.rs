//! Intent model and model-reply parsing
//!
//! The language model replies with a JSON object such as
//! `{"action": "queue", "num": 3, "message": "Added!"}`. Replies are
//! loosely typed in practice (numbers as strings, `"+10"` deltas, code
//! fences), so parsing goes through a permissive raw shape first.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Closed action vocabulary understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Search,
    Play,
    Queue,
    Next,
    Pause,
    Resume,
    Skip,
    Previous,
    Volume,
    NowPlaying,
    ShowQueue,
    Clear,
    Help,
    #[default]
    Chat,
}

impl Action {
    /// Every action, in prompt order
    pub const ALL: [Action; 14] = [
        Action::Search,
        Action::Play,
        Action::Queue,
        Action::Next,
        Action::Pause,
        Action::Resume,
        Action::Skip,
        Action::Previous,
        Action::Volume,
        Action::NowPlaying,
        Action::ShowQueue,
        Action::Clear,
        Action::Help,
        Action::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Search => "search",
            Action::Play => "play",
            Action::Queue => "queue",
            Action::Next => "next",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Skip => "skip",
            Action::Previous => "previous",
            Action::Volume => "volume",
            Action::NowPlaying => "nowplaying",
            Action::ShowQueue => "showqueue",
            Action::Clear => "clear",
            Action::Help => "help",
            Action::Chat => "chat",
        }
    }

    /// Map a model-supplied action name; anything unrecognized is `None`
    pub fn parse(value: &str) -> Option<Action> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        Action::ALL.into_iter().find(|a| a.as_str() == normalized)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured interpretation of one utterance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Intent {
    pub action: Action,
    pub query: Option<String>,
    /// Candidate reference; `None` only when the model gave none
    pub num: Option<u32>,
    /// Absolute volume
    pub level: Option<u32>,
    /// Signed volume delta
    pub change: Option<i32>,
    /// Friendly text from the model; may be empty
    pub message: String,
}

impl Intent {
    pub fn chat(message: impl Into<String>) -> Self {
        Self {
            action: Action::Chat,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_action(action: Action) -> Self {
        Self {
            action,
            ..Default::default()
        }
    }
}

/// Reply text could not be turned into an intent
#[derive(Debug, Error, PartialEq)]
pub enum IntentParseError {
    #[error("reply contains no JSON object")]
    NoJsonObject,

    #[error("reply JSON is invalid: {0}")]
    InvalidJson(String),
}

/// Permissive shape of the model's JSON reply
#[derive(Debug, Deserialize, Default)]
struct RawIntent {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    query: Option<Value>,
    #[serde(default)]
    num: Option<Value>,
    #[serde(default)]
    level: Option<Value>,
    #[serde(default)]
    change: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

/// Parse the model's reply text into an [`Intent`].
///
/// An unknown or missing `action` becomes [`Action::Chat`]; payload fields
/// that cannot be interpreted are dropped. Only a reply with no parseable
/// JSON object is an error.
pub fn parse_intent_reply(reply: &str) -> Result<Intent, IntentParseError> {
    let json = extract_json_object(reply).ok_or(IntentParseError::NoJsonObject)?;
    let raw: RawIntent =
        serde_json::from_str(json).map_err(|e| IntentParseError::InvalidJson(e.to_string()))?;

    let action = match raw.action.as_deref() {
        Some(name) => Action::parse(name).unwrap_or_else(|| {
            tracing::warn!(
                action = %name,
                "Unrecognized action from language model, treating as chat"
            );
            Action::Chat
        }),
        None => Action::Chat,
    };

    Ok(Intent {
        action,
        query: raw.query.as_ref().and_then(value_as_text).filter(|q| !q.is_empty()),
        num: raw.num.as_ref().and_then(value_as_u32),
        level: raw.level.as_ref().and_then(value_as_u32),
        change: raw.change.as_ref().and_then(value_as_delta),
        message: raw.message.as_ref().and_then(value_as_text).unwrap_or_default(),
    })
}

/// Slice from the first `{` to the last `}`; strips code fences and prose
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a volume delta: `5`, `-5`, `"+10"`, `"-10"`
pub fn parse_volume_change(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    trimmed.parse().ok()
}

fn value_as_delta(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => parse_volume_change(s),
        _ => None,
    }
}
