//! The hypothesis record and its tolerant decoding from backend output.

use scigraph_graph::records::lenient;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_RATIONALE: &str = "Identified from knowledge graph analysis";
pub const DEFAULT_METHODOLOGY: &str = "Design controlled experiments to test the hypothesis";
pub const DEFAULT_IMPACT: &str = "Advance understanding in the field";
pub const DEFAULT_NOVELTY: f64 = 0.5;

pub fn default_resources() -> Vec<String> {
    vec![
        "computational resources".to_string(),
        "domain expertise".to_string(),
    ]
}

/// Coarse estimate of how practical a hypothesis is to pursue.
///
/// Values outside the three levels are kept as written so a report can echo
/// them, but they are not counted in the feasibility distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Feasibility {
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Feasibility {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Feasibility::High,
            "medium" => Feasibility::Medium,
            "low" => Feasibility::Low,
            _ => Feasibility::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Feasibility::High => "high",
            Feasibility::Medium => "medium",
            Feasibility::Low => "low",
            Feasibility::Other(s) => s,
        }
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Feasibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Feasibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Feasibility::parse(&s))
    }
}

/// A candidate research hypothesis. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub hypothesis: String,
    pub rationale: String,
    pub methodology: String,
    pub required_resources: Vec<String>,
    pub expected_impact: String,
    pub feasibility: Feasibility,
    /// In `[0, 1]`.
    pub novelty_score: f64,
}

impl Hypothesis {
    /// Decode one element of a backend response.
    ///
    /// Missing or unusable fields are backfilled from defaults. Returns
    /// `None` only when there is no hypothesis text to keep.
    pub fn from_backend_value(value: &Value) -> Option<Self> {
        let hypothesis = lenient::text(value.get("hypothesis")?)?;
        let text_or = |key: &str, default: &str| {
            value
                .get(key)
                .and_then(lenient::text)
                .unwrap_or_else(|| default.to_string())
        };

        let mut required_resources: Vec<String> = value
            .get("required_resources")
            .map(lenient::list)
            .unwrap_or_default()
            .iter()
            .filter_map(lenient::text)
            .collect();
        if required_resources.is_empty() {
            required_resources = default_resources();
        }

        let feasibility = value
            .get("feasibility")
            .and_then(lenient::text)
            .map(|s| Feasibility::parse(&s))
            .unwrap_or_default();

        Some(Self {
            hypothesis,
            rationale: text_or("rationale", DEFAULT_RATIONALE),
            methodology: text_or("methodology", DEFAULT_METHODOLOGY),
            required_resources,
            expected_impact: text_or("expected_impact", DEFAULT_IMPACT),
            feasibility,
            novelty_score: clamp_novelty(value.get("novelty_score").and_then(lenient::number)),
        })
    }
}

fn clamp_novelty(score: Option<f64>) -> f64 {
    match score {
        Some(s) if s.is_finite() => s.clamp(0.0, 1.0),
        _ => DEFAULT_NOVELTY,
    }
}

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("response is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("response is JSON but not an array")]
    NotArray,
}

/// Decode a backend response, which must be a JSON array and nothing else.
///
/// Surrounding whitespace is tolerated; code fences, prose and single objects
/// are not. Elements without hypothesis text are dropped.
pub fn parse_backend_response(text: &str) -> Result<Vec<Hypothesis>, ResponseError> {
    let value: Value = serde_json::from_str(text.trim())?;
    let items = value.as_array().ok_or(ResponseError::NotArray)?;
    Ok(items.iter().filter_map(Hypothesis::from_backend_value).collect())
}
