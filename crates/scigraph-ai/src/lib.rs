pub mod engine;
pub mod hypothesis;
pub mod llm_factory;
pub mod llm_provider;
pub mod prompt;
pub mod report;
pub mod synthesizer;
pub mod templates;

#[cfg(feature = "anthropic")]
pub mod anthropic_provider;
#[cfg(feature = "gemini")]
pub mod gemini_provider;
#[cfg(feature = "openai-llm")]
pub mod openai_llm_provider;

pub use engine::{HypothesisEngine, ReportRequest};
pub use hypothesis::{Feasibility, Hypothesis};
pub use llm_factory::LLMProviderFactory;
pub use llm_provider::*;
pub use report::{ReportAssembler, ResearchReport};
pub use synthesizer::{GenerationMethod, HypothesisSynthesizer, Synthesis};
pub use templates::TemplateSynthesizer;

#[cfg(feature = "anthropic")]
pub use anthropic_provider::AnthropicProvider;
#[cfg(feature = "gemini")]
pub use gemini_provider::GeminiProvider;
#[cfg(feature = "openai-llm")]
pub use openai_llm_provider::OpenAIProvider;
