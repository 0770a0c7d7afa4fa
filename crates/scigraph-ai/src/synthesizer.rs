//! Hypothesis synthesis: generative backend first, templates when it fails.

use crate::hypothesis::{parse_backend_response, Hypothesis, ResponseError};
use crate::llm_provider::{GenerationConfig, LLMProvider, Message};
use crate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::templates::TemplateSynthesizer;
use scigraph_core::config_manager::LLMConfig;
use scigraph_graph::{GraphAnalysis, Opportunity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// Which path produced a set of hypotheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    /// Every hypothesis came from the backend.
    Backend,
    /// Every hypothesis came from templates.
    Template,
    /// Backend output padded with templates.
    Hybrid,
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationMethod::Backend => "backend",
            GenerationMethod::Template => "template",
            GenerationMethod::Hybrid => "hybrid",
        };
        write!(f, "{}", s)
    }
}

/// Provider and model of the backend that contributed hypotheses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Synthesis {
    pub hypotheses: Vec<Hypothesis>,
    pub method: GenerationMethod,
    /// Set when the backend contributed at least one hypothesis.
    pub backend: Option<BackendInfo>,
}

/// Reasons a backend call falls through to templates. Never returned to callers.
#[derive(Error, Debug)]
pub enum BackendFailure {
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend request failed: {0}")]
    Request(String),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("backend returned no usable hypotheses")]
    Empty,
}

pub struct HypothesisSynthesizer {
    backend: Option<Arc<dyn LLMProvider>>,
    timeout: Duration,
    generation: GenerationConfig,
}

impl HypothesisSynthesizer {
    /// Templates only.
    pub fn rule_based() -> Self {
        Self {
            backend: None,
            timeout: DEFAULT_BACKEND_TIMEOUT,
            generation: GenerationConfig::default(),
        }
    }

    /// Backend first, bounded by `timeout` for the whole call including retries.
    pub fn with_backend(backend: Arc<dyn LLMProvider>, timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            timeout,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Sampling parameters taken from the backend configuration.
    pub fn generation_config_from(config: &LLMConfig) -> GenerationConfig {
        GenerationConfig {
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        }
    }

    pub fn backend(&self) -> Option<&Arc<dyn LLMProvider>> {
        self.backend.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Always returns exactly `count` hypotheses. Backend problems are logged
    /// and absorbed.
    pub async fn synthesize(
        &self,
        analysis: &GraphAnalysis,
        opportunities: &[Opportunity],
        count: usize,
        focus_area: Option<&str>,
    ) -> Synthesis {
        let templates = TemplateSynthesizer::new(analysis, focus_area);
        let template_only = || Synthesis {
            hypotheses: templates.generate(opportunities, count),
            method: GenerationMethod::Template,
            backend: None,
        };

        let Some(backend) = &self.backend else {
            info!("No generative backend configured, using template synthesis");
            return template_only();
        };
        if count == 0 {
            return template_only();
        }

        let prompt = PromptBuilder::new(analysis, opportunities, count)
            .focus_area(focus_area)
            .build();

        match self.call_backend(backend.as_ref(), &prompt).await {
            Ok(mut hypotheses) => {
                let info = BackendInfo {
                    provider: backend.provider_name().to_string(),
                    model: backend.model_name().to_string(),
                };
                hypotheses.truncate(count);
                let usable = hypotheses.len();
                if usable == count {
                    info!("Backend {} produced {} hypotheses", info.provider, usable);
                    return Synthesis {
                        hypotheses,
                        method: GenerationMethod::Backend,
                        backend: Some(info),
                    };
                }

                info!(
                    "Backend {} produced {} of {} hypotheses, padding from templates",
                    info.provider, usable, count
                );
                hypotheses.extend(
                    templates
                        .generate(opportunities, count)
                        .into_iter()
                        .skip(usable),
                );
                Synthesis {
                    hypotheses,
                    method: GenerationMethod::Hybrid,
                    backend: Some(info),
                }
            }
            Err(failure) => {
                warn!(
                    "Backend {} failed ({}), falling back to template synthesis",
                    backend.provider_name(),
                    failure
                );
                template_only()
            }
        }
    }

    async fn call_backend(
        &self,
        backend: &dyn LLMProvider,
        prompt: &str,
    ) -> Result<Vec<Hypothesis>, BackendFailure> {
        let messages = [Message::system(SYSTEM_PROMPT), Message::user(prompt)];
        debug!(
            "Sending {} character prompt to {} ({})",
            prompt.len(),
            backend.provider_name(),
            backend.model_name()
        );

        let response = tokio::time::timeout(
            self.timeout,
            backend.generate_chat(&messages, &self.generation),
        )
        .await
        .map_err(|_| BackendFailure::Timeout(self.timeout))?
        .map_err(|e| BackendFailure::Request(format!("{:#}", e)))?;

        if matches!(
            response.finish_reason.as_deref(),
            Some("length" | "max_tokens" | "MAX_TOKENS")
        ) {
            warn!(
                "{} stopped at the token limit; the answer is probably truncated",
                response.model
            );
        }
        let hypotheses = parse_backend_response(&response.content)?;
        if hypotheses.is_empty() {
            return Err(BackendFailure::Empty);
        }
        Ok(hypotheses)
    }
}

impl Default for HypothesisSynthesizer {
    fn default() -> Self {
        Self::rule_based()
    }
}
