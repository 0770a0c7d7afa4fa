//! Deterministic hypothesis synthesis from fixed templates.

use crate::hypothesis::{default_resources, Feasibility, Hypothesis, DEFAULT_IMPACT};
use scigraph_graph::{GraphAnalysis, Opportunity, OpportunityKind};

const DEFAULT_DOMAIN: &str = "scientific research";
const DEFAULT_DATASET: &str = "scientific dataset";
const FALLBACK_TOOLS: [&str; 2] = ["machine learning", "deep learning"];
const SECOND_TOOL_FALLBACK: &str = "statistical method";
const POOL_SIZE: usize = 10;

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Template-based synthesizer over one analysis. Same inputs, same output.
pub struct TemplateSynthesizer<'a> {
    tools: Vec<String>,
    datasets: Vec<String>,
    keywords: Vec<String>,
    domain: &'a str,
}

impl<'a> TemplateSynthesizer<'a> {
    pub fn new(analysis: &GraphAnalysis, focus_area: Option<&'a str>) -> Self {
        let names = |ranked: Vec<(String, usize)>| -> Vec<String> {
            ranked.into_iter().map(|(name, _)| name).collect()
        };
        Self {
            tools: names(analysis.popular_tools(POOL_SIZE)),
            datasets: names(analysis.popular_datasets(POOL_SIZE)),
            keywords: analysis.keywords.iter().take(POOL_SIZE).cloned().collect(),
            domain: focus_area
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .unwrap_or(DEFAULT_DOMAIN),
        }
    }

    /// Exactly `count` hypotheses: one per opportunity in order, then padding.
    pub fn generate(&self, opportunities: &[Opportunity], count: usize) -> Vec<Hypothesis> {
        let mut hypotheses: Vec<Hypothesis> = opportunities
            .iter()
            .take(count)
            .map(from_opportunity)
            .collect();
        let mapped = hypotheses.len();
        hypotheses.extend((0..count - mapped).map(|i| self.padding(i)));
        hypotheses
    }

    /// The `index`-th padding hypothesis, cycling through four templates.
    pub fn padding(&self, index: usize) -> Hypothesis {
        let domain = self.domain;
        match index % 4 {
            0 => Hypothesis {
                hypothesis: "Novel AI approaches could improve scientific reproducibility assessment"
                    .to_string(),
                rationale: "Current manual assessment methods are time-consuming and subjective"
                    .to_string(),
                methodology: "Develop automated assessment tools using machine learning".to_string(),
                required_resources: vec![
                    "machine learning expertise".to_string(),
                    self.paper_corpus(index),
                ],
                expected_impact: "Faster and more consistent reproducibility evaluation".to_string(),
                feasibility: Feasibility::High,
                novelty_score: 0.7,
            },
            1 => {
                let (first, second) = self.tool_pair(index);
                Hypothesis {
                    hypothesis: format!(
                        "Combining {} with {} could improve {} analysis",
                        first, second, domain
                    ),
                    rationale:
                        "Both tools have complementary strengths that could address current limitations"
                            .to_string(),
                    methodology: "Develop integrated pipeline and benchmark against existing methods"
                        .to_string(),
                    required_resources: default_resources(),
                    expected_impact: DEFAULT_IMPACT.to_string(),
                    feasibility: Feasibility::Medium,
                    novelty_score: 0.7,
                }
            }
            2 => {
                let (tool, _) = self.tool_pair(index);
                let dataset = self.dataset(index);
                Hypothesis {
                    hypothesis: format!(
                        "Applying {} to {} could reveal new insights about {}",
                        tool, dataset, domain
                    ),
                    rationale: "This combination has not been extensively explored in the literature"
                        .to_string(),
                    methodology: format!(
                        "Implement {} and analyze {} with statistical validation",
                        tool, dataset
                    ),
                    required_resources: default_resources(),
                    expected_impact: DEFAULT_IMPACT.to_string(),
                    feasibility: Feasibility::High,
                    novelty_score: 0.6,
                }
            }
            _ => {
                let (first, second) = self.tool_pair(index);
                Hypothesis {
                    hypothesis: format!(
                        "Multi-modal approach using {} and {} could enhance {} prediction accuracy",
                        first, second, domain
                    ),
                    rationale: "Different data modalities provide complementary information"
                        .to_string(),
                    methodology: "Design fusion architecture and evaluate on benchmark datasets"
                        .to_string(),
                    required_resources: default_resources(),
                    expected_impact: DEFAULT_IMPACT.to_string(),
                    feasibility: Feasibility::Medium,
                    novelty_score: 0.8,
                }
            }
        }
    }

    fn tool_pair(&self, index: usize) -> (&str, &str) {
        match self.tools.len() {
            0 => (FALLBACK_TOOLS[0], FALLBACK_TOOLS[1]),
            1 => (self.tools[0].as_str(), SECOND_TOOL_FALLBACK),
            n => (
                self.tools[index % n].as_str(),
                self.tools[(index + 1) % n].as_str(),
            ),
        }
    }

    /// Corpus named after a graph keyword, rotating once per template cycle.
    fn paper_corpus(&self, index: usize) -> String {
        if self.keywords.is_empty() {
            return "scientific paper corpus".to_string();
        }
        let keyword = &self.keywords[(index / 4) % self.keywords.len()];
        format!("{} paper corpus", keyword)
    }

    fn dataset(&self, index: usize) -> &str {
        if self.datasets.is_empty() {
            DEFAULT_DATASET
        } else {
            &self.datasets[index % self.datasets.len()]
        }
    }
}

/// Fixed template for an opportunity, filled with its own tools or dataset.
pub fn from_opportunity(opportunity: &Opportunity) -> Hypothesis {
    match (opportunity.kind, opportunity.tools(), opportunity.dataset()) {
        (OpportunityKind::ToolCombination, Some((first, second)), _) => Hypothesis {
            hypothesis: format!(
                "Combining {} and {} will improve research outcomes",
                first, second
            ),
            rationale: opportunity.rationale.clone(),
            methodology: format!(
                "Develop integrated workflow using both {} and {}",
                first, second
            ),
            required_resources: strings([first, second]),
            expected_impact: "Improved computational efficiency and accuracy".to_string(),
            feasibility: Feasibility::Medium,
            novelty_score: 0.7,
        },
        (OpportunityKind::DatasetReuse, _, Some(dataset)) => Hypothesis {
            hypothesis: format!(
                "Applying machine learning methods to {} will reveal new insights",
                dataset
            ),
            rationale: opportunity.rationale.clone(),
            methodology: format!("Apply modern ML techniques to analyze {}", dataset),
            required_resources: strings([dataset, "machine learning tools"]),
            expected_impact: "Discovery of previously unknown patterns".to_string(),
            feasibility: Feasibility::High,
            novelty_score: 0.6,
        },
        _ => Hypothesis {
            hypothesis: "Improving research reproducibility through automated validation".to_string(),
            rationale: "Current reproducibility scores are low".to_string(),
            methodology: "Develop automated reproducibility assessment tools".to_string(),
            required_resources: strings(["containerization", "automated testing"]),
            expected_impact: "Higher reproducibility across scientific research".to_string(),
            feasibility: Feasibility::Medium,
            novelty_score: 0.5,
        },
    }
}
