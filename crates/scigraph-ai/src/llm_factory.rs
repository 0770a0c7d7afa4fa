use crate::llm_provider::*;
use anyhow::{anyhow, Result};
use scigraph_core::config_manager::{BackendKind, LLMConfig};
use std::sync::Arc;

#[cfg(feature = "anthropic")]
use crate::anthropic_provider::{AnthropicConfig, AnthropicProvider};

#[cfg(feature = "openai-llm")]
use crate::openai_llm_provider::{OpenAIConfig, OpenAIProvider};

#[cfg(feature = "gemini")]
use crate::gemini_provider::{GeminiConfig, GeminiProvider};

/// Factory for creating generative backends based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create the configured backend.
    ///
    /// `Ok(None)` means the rule-based backend was selected and synthesis
    /// runs entirely from templates. Missing credentials and backends
    /// compiled out of this build are errors.
    pub fn create_from_config(config: &LLMConfig) -> Result<Option<Arc<dyn LLMProvider>>> {
        match config.provider {
            BackendKind::RuleBased => Ok(None),
            #[cfg(feature = "anthropic")]
            BackendKind::Anthropic => Self::create_anthropic_provider(config).map(Some),
            #[cfg(feature = "openai-llm")]
            BackendKind::OpenAI => Self::create_openai_provider(config).map(Some),
            #[cfg(feature = "gemini")]
            BackendKind::Gemini => Self::create_gemini_provider(config).map(Some),
            #[allow(unreachable_patterns)]
            other => Err(anyhow!(
                "LLM provider '{}' is not enabled in this build. Available providers: {}",
                other,
                Self::supported_providers().join(", ")
            )),
        }
    }

    /// Key from the config file, else from `env_var`.
    #[cfg(any(feature = "anthropic", feature = "openai-llm", feature = "gemini"))]
    fn api_key(configured: Option<&String>, env_var: &str, kind: BackendKind) -> Result<String> {
        configured
            .cloned()
            .or_else(|| std::env::var(env_var).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key for the {} backend. Set '{}_api_key' in the config or {}",
                    kind,
                    kind,
                    env_var
                )
            })
    }

    #[cfg(feature = "anthropic")]
    fn create_anthropic_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let provider = AnthropicProvider::new(AnthropicConfig {
            api_key: Self::api_key(
                config.anthropic_api_key.as_ref(),
                "ANTHROPIC_API_KEY",
                BackendKind::Anthropic,
            )?,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| crate::anthropic_provider::DEFAULT_MODEL.to_string()),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })?;
        Ok(Arc::new(provider))
    }

    #[cfg(feature = "openai-llm")]
    fn create_openai_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let provider = OpenAIProvider::new(OpenAIConfig {
            api_key: Self::api_key(
                config.openai_api_key.as_ref(),
                "OPENAI_API_KEY",
                BackendKind::OpenAI,
            )?,
            base_url: config.openai_base_url.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| crate::openai_llm_provider::DEFAULT_MODEL.to_string()),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            organization: std::env::var("OPENAI_ORG_ID").ok(),
        })?;
        Ok(Arc::new(provider))
    }

    #[cfg(feature = "gemini")]
    fn create_gemini_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: Self::api_key(
                config.gemini_api_key.as_ref(),
                "GEMINI_API_KEY",
                BackendKind::Gemini,
            )?,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| crate::gemini_provider::DEFAULT_MODEL.to_string()),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })?;
        Ok(Arc::new(provider))
    }

    /// Backends compiled into this build
    pub fn supported_providers() -> Vec<&'static str> {
        let mut providers = vec!["rule-based"];

        #[cfg(feature = "anthropic")]
        providers.push("anthropic");

        #[cfg(feature = "openai-llm")]
        providers.push("openai");

        #[cfg(feature = "gemini")]
        providers.push("gemini");

        providers
    }
}
