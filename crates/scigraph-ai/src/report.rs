//! The research report and its assembly.

use crate::hypothesis::{Feasibility, Hypothesis};
use crate::synthesizer::{GenerationMethod, Synthesis};
use indexmap::IndexMap;
use scigraph_core::EntityKind;
use scigraph_graph::{CentralEntity, GraphAnalysis, Opportunity};
use serde::{Deserialize, Serialize};

const POPULAR_LIMIT: usize = 10;
const LOW_REPRODUCIBILITY: f64 = 0.7;

/// Flat summary of a [`GraphAnalysis`] as it appears in a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_triples: usize,
    pub entity_counts: IndexMap<String, usize>,
    pub relationship_counts: IndexMap<String, usize>,
    /// Top tools by usage, most used first.
    pub popular_tools: IndexMap<String, usize>,
    pub popular_datasets: IndexMap<String, usize>,
    pub avg_reproducibility_score: Option<f64>,
    pub highly_connected_entities: Vec<CentralEntity>,
}

impl From<&GraphAnalysis> for AnalysisSummary {
    fn from(analysis: &GraphAnalysis) -> Self {
        Self {
            total_triples: analysis.total_triples,
            entity_counts: analysis.entity_counts.clone(),
            relationship_counts: analysis.relationship_counts.clone(),
            popular_tools: analysis.popular_tools(POPULAR_LIMIT).into_iter().collect(),
            popular_datasets: analysis.popular_datasets(POPULAR_LIMIT).into_iter().collect(),
            avg_reproducibility_score: analysis.avg_reproducibility_score(),
            highly_connected_entities: analysis.highly_connected_entities.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl FeasibilityDistribution {
    /// Counts the three known levels; anything else is ignored.
    pub fn of(hypotheses: &[Hypothesis]) -> Self {
        let mut distribution = Self::default();
        for h in hypotheses {
            match h.feasibility {
                Feasibility::High => distribution.high += 1,
                Feasibility::Medium => distribution.medium += 1,
                Feasibility::Low => distribution.low += 1,
                Feasibility::Other(_) => {}
            }
        }
        distribution
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_hypotheses: usize,
    pub avg_novelty_score: f64,
    pub feasibility_distribution: FeasibilityDistribution,
}

/// Arithmetic mean of the novelty scores, `0.0` for no hypotheses.
pub fn avg_novelty_score(hypotheses: &[Hypothesis]) -> f64 {
    if hypotheses.is_empty() {
        return 0.0;
    }
    hypotheses.iter().map(|h| h.novelty_score).sum::<f64>() / hypotheses.len() as f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// RFC 3339.
    pub generation_timestamp: String,
    pub source_graph: Option<String>,
    pub focus_area: Option<String>,
    pub generation_method: GenerationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_model: Option<String>,
    pub graph_analysis: AnalysisSummary,
    pub research_opportunities: Vec<Opportunity>,
    pub generated_hypotheses: Vec<Hypothesis>,
    pub summary: ReportSummary,
    pub research_directions: Vec<String>,
    pub knowledge_gaps: Vec<String>,
}

impl ResearchReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Packages analysis, opportunities and synthesized hypotheses into a report.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    source_graph: Option<String>,
    focus_area: Option<String>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_graph(mut self, source: impl Into<String>) -> Self {
        self.source_graph = Some(source.into());
        self
    }

    pub fn focus_area(mut self, focus_area: Option<&str>) -> Self {
        self.focus_area = focus_area.map(str::to_string);
        self
    }

    pub fn assemble(
        &self,
        analysis: &GraphAnalysis,
        opportunities: Vec<Opportunity>,
        synthesis: Synthesis,
    ) -> ResearchReport {
        let hypotheses = synthesis.hypotheses;
        let summary = ReportSummary {
            total_hypotheses: hypotheses.len(),
            avg_novelty_score: avg_novelty_score(&hypotheses),
            feasibility_distribution: FeasibilityDistribution::of(&hypotheses),
        };
        let (backend_provider, backend_model) = match synthesis.backend {
            Some(info) => (Some(info.provider), Some(info.model)),
            None => (None, None),
        };

        ResearchReport {
            generation_timestamp: chrono::Utc::now().to_rfc3339(),
            source_graph: self.source_graph.clone(),
            focus_area: self.focus_area.clone(),
            generation_method: synthesis.method,
            backend_provider,
            backend_model,
            graph_analysis: AnalysisSummary::from(analysis),
            research_opportunities: opportunities,
            generated_hypotheses: hypotheses,
            summary,
            research_directions: research_directions(analysis),
            knowledge_gaps: knowledge_gaps(analysis),
        }
    }
}

pub fn research_directions(analysis: &GraphAnalysis) -> Vec<String> {
    let mut directions = Vec::new();
    if analysis.entity_count(EntityKind::Tool) > 0 {
        directions.push("Tool integration and comparison studies");
    }
    if analysis.entity_count(EntityKind::Dataset) > 0 {
        directions.push("Cross-dataset validation and generalization");
    }
    if analysis.entity_count(EntityKind::Methodology) > 0 {
        directions.push("Methodological improvements and novel approaches");
    }
    directions.extend([
        "Reproducibility and replication studies",
        "Interdisciplinary collaboration opportunities",
        "Scalability and efficiency improvements",
    ]);
    directions.into_iter().map(str::to_string).collect()
}

pub fn knowledge_gaps(analysis: &GraphAnalysis) -> Vec<String> {
    let mut gaps = Vec::new();
    if analysis.entity_count(EntityKind::Dataset) == 0 {
        gaps.push("Limited dataset availability or diversity");
    }
    if analysis.entity_count(EntityKind::Tool) == 0 {
        gaps.push("Lack of specialized tools or software");
    }
    if analysis
        .avg_reproducibility_score()
        .is_some_and(|avg| avg < LOW_REPRODUCIBILITY)
    {
        gaps.push("Low reproducibility of existing research artifacts");
    }
    gaps.extend([
        "Need for standardized evaluation metrics",
        "Limited cross-domain validation",
        "Insufficient long-term studies",
        "Gaps in theoretical understanding",
    ]);
    gaps.into_iter().map(str::to_string).collect()
}
