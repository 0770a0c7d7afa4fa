//! Chat Completions backend for OpenAI and API-compatible servers.

use crate::llm_provider::*;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// API root; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    /// Per-attempt HTTP timeout.
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            max_retries: 2,
            organization: None,
        }
    }
}

pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(anyhow!("OpenAI backend needs an API key"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: Some(m.content.clone()),
                })
                .collect(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    async fn send_with_retries(
        &self,
        request: &ChatCompletionsRequest,
    ) -> Result<ChatCompletionsResponse> {
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
                        "OpenAI request failed (attempt {}/{}): {:#}",
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow!("OpenAI request was never attempted")))
    }

    async fn send_once(&self, request: &ChatCompletionsRequest) -> Result<ChatCompletionsResponse> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request);
        if let Some(org) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
            .send()
            .await
            .context("Failed to reach the Chat Completions API")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API returned {}: {}", status, body));
        }

        let body = response
            .text()
            .await
            .context("Failed to read OpenAI response body")?;
        tracing::debug!(model = %self.config.model, response = %body, "Raw OpenAI response");
        serde_json::from_str(&body).context("Failed to decode OpenAI response")
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let request = self.build_request(messages, config);
        let response = self.send_with_retries(&request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenAI response has no choices"))?;

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| self.config.model.clone()),
            finish_reason: choice.finish_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

/// `content` is nullable in responses (refusals, tool calls).
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> OpenAIProvider {
        OpenAIProvider::new(OpenAIConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_provider_creation_requires_api_key() {
        assert!(OpenAIProvider::new(OpenAIConfig::default()).is_err());
    }

    #[test]
    fn test_request_carries_every_message() {
        let messages = [Message::system("json only"), Message::user("go")];
        let config = GenerationConfig {
            temperature: 0.3,
            max_tokens: None,
        };
        let value =
            serde_json::to_value(provider(OPENAI_API_BASE).build_request(&messages, &config))
                .unwrap();

        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "json only");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "go");
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        assert_eq!(
            provider("http://localhost:8000/v1/").endpoint(),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_completion_parsing() {
        let response: ChatCompletionsResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "model": "gpt-4o",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "[]"}, "finish_reason": "stop"},
                    {"index": 1, "message": {"role": "assistant", "content": null}, "finish_reason": "stop"}
                ],
                "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
            }"#,
        )
        .unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("[]"));
        assert!(response.choices[1].message.content.is_none());
        assert_eq!(response.model.as_deref(), Some("gpt-4o"));
    }
}
