//! Anthropic Messages API client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::LanguageModel;
use crate::config::LlmConfig;
use crate::error::{Error, Result};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

impl AnthropicClient {
    /// Build a client from the `[llm]` config section
    pub fn new(api_key: impl Into<String>, config: &LlmConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::LanguageModel(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            endpoint: MESSAGES_URL.to_string(),
            http_client,
        })
    }

    /// Point the client at a different Messages endpoint (proxies, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        tracing::debug!(model = %self.model, "Calling Anthropic Messages API");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": self.max_tokens,
                "system": system_prompt,
                "messages": [{"role": "user", "content": user_message}]
            }))
            .send()
            .await
            .map_err(|e| Error::LanguageModel(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LanguageModel(format!("API error {}: {}", status, body)));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::LanguageModel(format!("Parse error: {}", e)))?;

        body.content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| Error::LanguageModel("Empty response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_uses_config_model() {
        let config = LlmConfig {
            model: "claude-test".to_string(),
            ..LlmConfig::default()
        };
        let client = AnthropicClient::new("test-key", &config).unwrap();
        assert_eq!(client.model_name(), "claude-test");
        assert_eq!(client.endpoint, MESSAGES_URL);
    }

    #[test]
    fn test_with_endpoint() {
        let client = AnthropicClient::new("k", &LlmConfig::default())
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/v1/messages");
        assert_eq!(client.endpoint, "http://127.0.0.1:9/v1/messages");
    }
}
