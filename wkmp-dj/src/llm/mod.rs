//! Language model collaborator
//!
//! The resolver only needs "system prompt + user message in, text out".

use async_trait::async_trait;

use crate::error::Result;

pub mod anthropic;

pub use anthropic::AnthropicClient;

/// Text completion capability
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single-turn exchange and return the reply text
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;

    /// Model identifier for logging
    fn model_name(&self) -> &str {
        "unknown"
    }
}
