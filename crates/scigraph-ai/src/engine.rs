//! End-to-end report generation over a statement store.

use crate::llm_factory::LLMProviderFactory;
use crate::report::{ReportAssembler, ResearchReport};
use crate::synthesizer::{GenerationMethod, HypothesisSynthesizer};
use scigraph_core::config_manager::{SciGraphConfig, SynthesisConfig};
use scigraph_core::Result;
use scigraph_graph::{OpportunityMiner, PatternAnalyzer, StatementStore};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// What to generate for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub num_hypotheses: usize,
    pub focus_area: Option<String>,
}

impl Default for ReportRequest {
    fn default() -> Self {
        Self::from(&SynthesisConfig::default())
    }
}

impl From<&SynthesisConfig> for ReportRequest {
    fn from(config: &SynthesisConfig) -> Self {
        Self {
            num_hypotheses: config.num_hypotheses,
            focus_area: config.focus_area.clone(),
        }
    }
}

pub struct HypothesisEngine {
    synthesizer: HypothesisSynthesizer,
    miner: OpportunityMiner,
}

impl HypothesisEngine {
    pub fn new(synthesizer: HypothesisSynthesizer) -> Self {
        Self {
            synthesizer,
            miner: OpportunityMiner::new(),
        }
    }

    /// Builds the configured backend. A backend that cannot be built, for
    /// example for lack of an API key, leaves the engine on templates.
    pub fn from_config(config: &SciGraphConfig) -> Self {
        let synthesizer = match LLMProviderFactory::create_from_config(&config.llm) {
            Ok(Some(backend)) => {
                info!(
                    "Using {} backend with model {}",
                    backend.provider_name(),
                    backend.model_name()
                );
                HypothesisSynthesizer::with_backend(
                    backend,
                    Duration::from_secs(config.synthesis.backend_timeout_secs),
                )
                .with_generation_config(HypothesisSynthesizer::generation_config_from(
                    &config.llm,
                ))
            }
            Ok(None) => HypothesisSynthesizer::rule_based(),
            Err(e) => {
                warn!(
                    "Could not initialise {} backend, using templates: {:#}",
                    config.llm.provider, e
                );
                HypothesisSynthesizer::rule_based()
            }
        };
        Self::new(synthesizer)
    }

    pub fn synthesizer(&self) -> &HypothesisSynthesizer {
        &self.synthesizer
    }

    /// Analyze, mine, synthesize and assemble. Never fails.
    pub async fn generate_report(
        &self,
        store: &StatementStore,
        request: &ReportRequest,
    ) -> ResearchReport {
        self.generate(store, request, ReportAssembler::new()).await
    }

    /// Load a graph snapshot and report on it. Only the load can fail.
    pub async fn generate_report_from_file(
        &self,
        graph: &Path,
        request: &ReportRequest,
    ) -> Result<ResearchReport> {
        let store = StatementStore::from_file(graph)?;
        let assembler = ReportAssembler::new().source_graph(graph.display().to_string());
        Ok(self.generate(&store, request, assembler).await)
    }

    async fn generate(
        &self,
        store: &StatementStore,
        request: &ReportRequest,
        assembler: ReportAssembler,
    ) -> ResearchReport {
        let focus_area = request.focus_area.as_deref();
        let analysis = PatternAnalyzer::new(store).analyze();
        let opportunities = self.miner.mine(&analysis);
        let synthesis = self
            .synthesizer
            .synthesize(&analysis, &opportunities, request.num_hypotheses, focus_area)
            .await;

        if synthesis.method != GenerationMethod::Backend {
            info!(
                "Generated {} hypotheses via {} synthesis",
                synthesis.hypotheses.len(),
                synthesis.method
            );
        }

        assembler
            .focus_area(focus_area)
            .assemble(&analysis, opportunities, synthesis)
    }
}

impl Default for HypothesisEngine {
    fn default() -> Self {
        Self::new(HypothesisSynthesizer::rule_based())
    }
}
