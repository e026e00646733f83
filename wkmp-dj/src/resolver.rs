//! Intent resolver
//!
//! Turns an utterance into an [`Intent`] by asking the language model,
//! with the caller's current candidates embedded in the prompt so that
//! bare numbers ("3", "play 2 next") can be resolved. Stateless: the
//! snapshot is passed in on every call.

use std::sync::Arc;
use std::time::Duration;

use crate::intent::{parse_intent_reply, Action, Intent};
use crate::llm::LanguageModel;
use crate::registry::CandidateItem;

/// Message used whenever the model cannot produce a usable intent
pub const FALLBACK_MESSAGE: &str = "Sorry, I had trouble understanding that. Try again!";

/// Example payload and one-line description per action
fn action_example(action: Action) -> (&'static str, &'static str) {
    match action {
        Action::Search => (r#"{"action": "search", "query": "search terms"}"#, "Search for music"),
        Action::Play => (r#"{"action": "play", "num": 1}"#, "Play a numbered result immediately"),
        Action::Queue => (
            r#"{"action": "queue", "num": 1}"#,
            "Add numbered result to end of queue",
        ),
        Action::Next => (r#"{"action": "next", "num": 1}"#, "Add numbered result to play next"),
        Action::Pause => (r#"{"action": "pause"}"#, "Pause playback"),
        Action::Resume => (r#"{"action": "resume"}"#, "Resume playback"),
        Action::Skip => (r#"{"action": "skip"}"#, "Skip to next track"),
        Action::Previous => (r#"{"action": "previous"}"#, "Go to previous track"),
        Action::Volume => (
            r#"{"action": "volume", "level": 50} or {"action": "volume", "change": "+10"}"#,
            "Set volume (0-100) or adjust it; omit both to ask the current volume",
        ),
        Action::NowPlaying => (r#"{"action": "nowplaying"}"#, "Show what's playing"),
        Action::ShowQueue => (r#"{"action": "showqueue"}"#, "Show the queue"),
        Action::Clear => (r#"{"action": "clear"}"#, "Clear the queue"),
        Action::Help => (r#"{"action": "help"}"#, "Show help"),
        Action::Chat => (
            r#"{"action": "chat", "message": "response"}"#,
            "Just chat, no action needed",
        ),
    }
}

/// Render the candidate listing block; empty when there are no candidates
pub fn render_candidates(snapshot: &[CandidateItem]) -> String {
    if snapshot.is_empty() {
        return String::new();
    }
    let mut block = String::from("\n\nCurrent search results:\n");
    for item in snapshot {
        block.push_str(&item.listing_line());
        block.push('\n');
    }
    block
}

/// Build the system prompt for the given candidate snapshot
pub fn build_system_prompt(snapshot: &[CandidateItem]) -> String {
    let mut prompt = String::from(
        "You are a friendly DJ assistant. Help users find and queue music.\n\n\
         Available commands you can return:\n",
    );

    for action in Action::ALL {
        let (example, description) = action_example(action);
        prompt.push_str(&format!("- {} - {}\n", example, description));
    }

    prompt.push_str(&render_candidates(snapshot));

    prompt.push_str(
        r#"
Respond with JSON only. Include a friendly "message" field with your response to the user.
If user says a number like "2" or "queue 3", they want that result from the current search.
If user says "add" or "queue", add to end. If they say "next" or "play next", insert after current song.

Examples:
User: "play some beatles"
{"action": "search", "query": "beatles", "message": "Let me find some Beatles for you!"}

User: "3"
{"action": "queue", "num": 3, "message": "Added to the queue!"}

User: "play 2 next"
{"action": "next", "num": 2, "message": "That'll play right after this song!"}

User: "thanks!"
{"action": "chat", "message": "You're welcome! Enjoy the music!"}
"#,
    );

    prompt
}

/// Language-model backed resolver
#[derive(Clone)]
pub struct IntentResolver {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl IntentResolver {
    pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an utterance against the snapshot.
    ///
    /// Never fails: an unreachable, slow or incoherent model yields a chat
    /// intent carrying [`FALLBACK_MESSAGE`].
    pub async fn resolve(&self, utterance: &str, snapshot: &[CandidateItem]) -> Intent {
        let system_prompt = build_system_prompt(snapshot);
        tracing::debug!(
            model = %self.model.model_name(),
            candidates = snapshot.len(),
            "Resolving utterance"
        );

        let completion = self.model.complete(&system_prompt, utterance);
        let reply = match tokio::time::timeout(self.timeout, completion).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Language model call failed");
                return Intent::chat(FALLBACK_MESSAGE);
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Language model call timed out");
                return Intent::chat(FALLBACK_MESSAGE);
            }
        };

        match parse_intent_reply(&reply) {
            Ok(intent) => {
                tracing::info!(action = %intent.action, num = ?intent.num, "Resolved intent");
                intent
            }
            Err(e) => {
                tracing::warn!(error = %e, reply = %reply, "Unparseable language model reply");
                Intent::chat(FALLBACK_MESSAGE)
            }
        }
    }
}
