//! Conversational entry point
//!
//! Ties the resolver to the dispatcher for one utterance. Direct operations
//! skip this and call [`Dispatcher`] themselves.

use tracing::Instrument;
use uuid::Uuid;

use crate::dispatcher::Dispatcher;
use crate::intent::Action;
use crate::resolver::IntentResolver;
use crate::response::DispatchResult;
use crate::session::SessionKey;

/// Reported when no language model is configured
pub const NOT_CONFIGURED_ERROR: &str = "Natural language not configured";

const NOT_CONFIGURED_MESSAGE: &str = "Natural language not available. Use direct commands.";

/// Resolver plus dispatcher
#[derive(Clone)]
pub struct DjService {
    dispatcher: Dispatcher,
    resolver: Option<IntentResolver>,
}

impl DjService {
    pub fn new(dispatcher: Dispatcher, resolver: Option<IntentResolver>) -> Self {
        Self { dispatcher, resolver }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn has_language_model(&self) -> bool {
        self.resolver.is_some()
    }

    /// Resolve and execute one free-text utterance
    pub async fn handle_utterance(&self, message: &str, session: &SessionKey) -> DispatchResult {
        let message = message.trim();
        if message.is_empty() {
            let mut result =
                DispatchResult::input_error(Action::Chat.as_str(), "No message provided");
            result.message = "Please say something!".to_string();
            return result;
        }

        let Some(resolver) = &self.resolver else {
            let mut result =
                DispatchResult::input_error(Action::Chat.as_str(), NOT_CONFIGURED_ERROR);
            result.message = NOT_CONFIGURED_MESSAGE.to_string();
            return result;
        };

        let span = tracing::info_span!(
            "utterance",
            request_id = %Uuid::new_v4(),
            session = %session
        );

        async {
            tracing::info!(utterance = %message, "Handling utterance");
            let snapshot = self.dispatcher.registry().read(session).await;
            let intent = resolver.resolve(message, &snapshot).await;
            let result = self.dispatcher.dispatch(session, intent).await;
            tracing::debug!(action = result.action, error = ?result.error, "Utterance handled");
            result
        }
        .instrument(span)
        .await
    }
}
