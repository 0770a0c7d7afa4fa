//! Prompt construction for the generative backend.

use scigraph_core::EntityKind;
use scigraph_graph::{GraphAnalysis, Opportunity};
use std::fmt::Write;

pub const SYSTEM_PROMPT: &str = "You are a scientific research expert who generates novel, \
testable hypotheses based on knowledge graph analysis. Return only valid JSON.";

const RANKED_NAMES: usize = 10;
const PROMPT_OPPORTUNITIES: usize = 5;

const OUTPUT_INSTRUCTIONS: &str = r#"
Generate research hypotheses that:
1. Combine existing tools/datasets in novel ways
2. Address reproducibility challenges
3. Explore underutilized resources
4. Propose methodological improvements
5. Suggest cross-disciplinary applications

Return the response as a JSON array with this structure:
[
  {
    "hypothesis": "Clear, testable research hypothesis",
    "rationale": "Why this hypothesis is worth investigating",
    "methodology": "Suggested approach to test the hypothesis",
    "required_resources": ["tool1", "dataset1", "etc"],
    "expected_impact": "Potential scientific impact",
    "feasibility": "high/medium/low",
    "novelty_score": 0.8
  }
]
"#;

/// Builds the single context block sent to a backend.
pub struct PromptBuilder<'a> {
    analysis: &'a GraphAnalysis,
    opportunities: &'a [Opportunity],
    focus_area: Option<&'a str>,
    count: usize,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(analysis: &'a GraphAnalysis, opportunities: &'a [Opportunity], count: usize) -> Self {
        Self {
            analysis,
            opportunities,
            focus_area: None,
            count,
        }
    }

    pub fn focus_area(mut self, focus_area: Option<&'a str>) -> Self {
        self.focus_area = focus_area.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn build(&self) -> String {
        let analysis = self.analysis;
        let mut out = String::from(
            "Based on the following analysis of a scientific knowledge graph, \
             generate novel research hypotheses:\n\n",
        );

        // Writing to a String cannot fail.
        let _ = writeln!(out, "GRAPH STATISTICS:");
        for (label, kind) in [
            ("Papers", EntityKind::Paper),
            ("Authors", EntityKind::Author),
            ("Tools", EntityKind::Tool),
            ("Datasets", EntityKind::Dataset),
        ] {
            let _ = writeln!(out, "- {}: {}", label, analysis.entity_count(kind));
        }

        let _ = writeln!(
            out,
            "\nPOPULAR TOOLS:\n{}",
            ranked_names(&analysis.popular_tools(RANKED_NAMES))
        );
        let _ = writeln!(
            out,
            "\nPOPULAR DATASETS:\n{}",
            ranked_names(&analysis.popular_datasets(RANKED_NAMES))
        );
        let keywords = if analysis.keywords.is_empty() {
            "None".to_string()
        } else {
            analysis
                .keywords
                .iter()
                .take(RANKED_NAMES)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "\nKEYWORDS:\n{}", keywords);

        let average = analysis
            .avg_reproducibility_score()
            .map(|avg| format!("{:.2}", avg))
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(out, "\nREPRODUCIBILITY INSIGHTS:");
        let _ = writeln!(out, "- Average reproducibility score: {}", average);
        let _ = writeln!(
            out,
            "- Number of assessed repositories: {}",
            analysis.reproducibility_scores.len()
        );

        let _ = writeln!(out, "\nRESEARCH OPPORTUNITIES:");
        for opportunity in self.opportunities.iter().take(PROMPT_OPPORTUNITIES) {
            let _ = writeln!(out, "- {}: {}", opportunity.description, opportunity.rationale);
        }

        if let Some(focus) = self.focus_area {
            let _ = writeln!(out, "\nFOCUS AREA: {}", focus);
        }

        let _ = writeln!(out, "\nNUMBER OF HYPOTHESES: {}", self.count);
        out.push_str(OUTPUT_INSTRUCTIONS);
        out
    }
}

fn ranked_names(ranked: &[(String, usize)]) -> String {
    if ranked.is_empty() {
        return "None".to_string();
    }
    ranked
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
