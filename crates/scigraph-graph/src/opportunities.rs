//! Research opportunities mined from a [`GraphAnalysis`].

use crate::analysis::GraphAnalysis;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    ToolCombination,
    DatasetReuse,
    ReproducibilityImprovement,
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpportunityKind::ToolCombination => "tool_combination",
            OpportunityKind::DatasetReuse => "dataset_reuse",
            OpportunityKind::ReproducibilityImprovement => "reproducibility_improvement",
        };
        write!(f, "{}", s)
    }
}

/// Kind-specific data carried by an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpportunityPayload {
    Tools { tools: [String; 2] },
    Dataset { dataset: String },
    Reproducibility { current_avg_score: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub description: String,
    #[serde(flatten)]
    pub payload: OpportunityPayload,
    pub rationale: String,
}

impl Opportunity {
    pub fn tool_combination(first: &str, second: &str) -> Self {
        Self {
            kind: OpportunityKind::ToolCombination,
            description: format!("Explore combining {} with {}", first, second),
            payload: OpportunityPayload::Tools {
                tools: [first.to_string(), second.to_string()],
            },
            rationale: "These popular tools haven't been used together in existing research"
                .to_string(),
        }
    }

    pub fn dataset_reuse(dataset: &str) -> Self {
        Self {
            kind: OpportunityKind::DatasetReuse,
            description: format!("Apply different methodologies to {}", dataset),
            payload: OpportunityPayload::Dataset {
                dataset: dataset.to_string(),
            },
            rationale: "This dataset has been underutilized in research".to_string(),
        }
    }

    pub fn reproducibility_improvement(current_avg_score: f64) -> Self {
        Self {
            kind: OpportunityKind::ReproducibilityImprovement,
            description: "Develop better reproducibility practices".to_string(),
            payload: OpportunityPayload::Reproducibility { current_avg_score },
            rationale: "Current research shows low reproducibility scores".to_string(),
        }
    }

    pub fn tools(&self) -> Option<(&str, &str)> {
        match &self.payload {
            OpportunityPayload::Tools { tools: [a, b] } => Some((a.as_str(), b.as_str())),
            _ => None,
        }
    }

    pub fn dataset(&self) -> Option<&str> {
        match &self.payload {
            OpportunityPayload::Dataset { dataset } => Some(dataset.as_str()),
            _ => None,
        }
    }
}

/// Thresholds for the three opportunity rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpportunityMiner {
    /// How many of the most used tools are paired up.
    pub top_tools: usize,
    pub max_dataset_opportunities: usize,
    /// Mean reproducibility below this yields an improvement opportunity.
    pub reproducibility_threshold: f64,
}

impl Default for OpportunityMiner {
    fn default() -> Self {
        Self {
            top_tools: 10,
            max_dataset_opportunities: 5,
            reproducibility_threshold: 0.7,
        }
    }
}

impl OpportunityMiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tool combinations, then dataset reuse, then reproducibility.
    pub fn mine(&self, analysis: &GraphAnalysis) -> Vec<Opportunity> {
        let mut opportunities = self.tool_combinations(analysis);
        let combinations = opportunities.len();

        opportunities.extend(
            analysis
                .dataset_usage
                .iter()
                .filter(|(_, count)| *count == 1)
                .take(self.max_dataset_opportunities)
                .map(|(dataset, _)| Opportunity::dataset_reuse(dataset)),
        );
        let reuse = opportunities.len() - combinations;

        if let Some(avg) = analysis.avg_reproducibility_score() {
            if avg < self.reproducibility_threshold {
                opportunities.push(Opportunity::reproducibility_improvement(avg));
            }
        }

        info!(
            "Found {} research opportunities ({} tool combinations, {} dataset reuse)",
            opportunities.len(),
            combinations,
            reuse
        );
        opportunities
    }

    /// Pairs of popular tools that no paper uses together.
    fn tool_combinations(&self, analysis: &GraphAnalysis) -> Vec<Opportunity> {
        let popular = analysis.popular_tools(self.top_tools);
        let mut opportunities = Vec::new();

        for (i, (first, _)) in popular.iter().enumerate() {
            for (second, _) in &popular[i + 1..] {
                let used_together = match (
                    analysis.papers_using(first),
                    analysis.papers_using(second),
                ) {
                    (Some(a), Some(b)) => !a.is_disjoint(b),
                    _ => false,
                };
                if !used_together {
                    opportunities.push(Opportunity::tool_combination(first, second));
                }
            }
        }

        opportunities
    }
}
