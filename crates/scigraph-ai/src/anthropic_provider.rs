//! Anthropic Messages API backend.

use crate::llm_provider::*;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
/// The Messages API rejects requests without `max_tokens`.
const FALLBACK_MAX_TOKENS: usize = 4000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    /// Per-attempt HTTP timeout.
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(anyhow!("Anthropic backend needs an API key"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { config, client })
    }

    /// The system message travels in its own field; every other message
    /// goes into `messages` in order.
    fn build_request(&self, messages: &[Message], config: &GenerationConfig) -> MessagesRequest {
        let mut system = None;
        let mut turns = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                MessageRole::System => system = Some(message.content.clone()),
                MessageRole::User => turns.push(Turn {
                    role: "user".to_string(),
                    content: message.content.clone(),
                }),
            }
        }
        MessagesRequest {
            model: self.config.model.clone(),
            system,
            messages: turns,
            max_tokens: config.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            temperature: config.temperature,
        }
    }

    /// Retries with 1s, 2s, 4s... pauses between attempts.
    async fn send_with_retries(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let attempts = self.config.max_retries + 1;
        let mut last_error = None;
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_secs(1 << (attempt - 1))).await;
            }
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        "Anthropic request failed (attempt {}/{}): {:#}",
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow!("Anthropic request was never attempted")))
    }

    async fn send_once(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .context("Failed to reach the Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Anthropic API returned {}: {}", status, body));
        }
        response
            .json::<MessagesResponse>()
            .await
            .context("Failed to decode Anthropic response")
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let request = self.build_request(messages, config);
        let response = self.send_with_retries(&request).await?;
        debug!(
            "Anthropic answered with {} content blocks ({:?})",
            response.content.len(),
            response.stop_reason
        );
        Ok(LLMResponse {
            content: response.text(),
            model: response.model,
            finish_reason: response.stop_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Turn>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Turn {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl MessagesResponse {
    /// Concatenation of the text blocks; tool-use and other blocks are skipped.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(AnthropicConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_provider_creation_requires_api_key() {
        assert!(AnthropicProvider::new(AnthropicConfig::default()).is_err());
    }

    #[test]
    fn test_system_message_is_lifted() {
        let messages = [Message::system("be terse"), Message::user("hello")];
        let config = GenerationConfig {
            temperature: 0.2,
            max_tokens: None,
        };
        let value = serde_json::to_value(provider().build_request(&messages, &config)).unwrap();

        assert_eq!(value["system"], "be terse");
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], FALLBACK_MAX_TOKENS);
    }

    #[test]
    fn test_response_text_blocks_are_joined() {
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "[1,"},
                {"type": "tool_use", "id": "t", "name": "x", "input": {}},
                {"type": "text", "text": "2]"}
            ],
            "model": DEFAULT_MODEL,
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 3, "output_tokens": 4}
        }))
        .unwrap();
        assert_eq!(response.text(), "[1,2]");
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }
}
