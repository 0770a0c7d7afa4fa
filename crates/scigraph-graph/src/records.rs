//! Input records consumed by graph ingestion.
//!
//! Both records decode leniently: a field that is missing, null, or of the
//! wrong JSON type is treated as absent instead of failing the whole record.
//! Only input that is not JSON at all is an error.

use scigraph_core::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An author entry: either a bare name or a person object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Name(String),
    Person {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        affiliation: Option<String>,
    },
}

impl AuthorRef {
    pub fn name(&self) -> &str {
        match self {
            AuthorRef::Name(name) => name,
            AuthorRef::Person { name, .. } => name,
        }
    }

    pub fn affiliation(&self) -> Option<&str> {
        match self {
            AuthorRef::Name(_) => None,
            AuthorRef::Person { affiliation, .. } => affiliation.as_deref(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => lenient::text(value).map(AuthorRef::Name),
            Value::Object(map) => {
                let name = map.get("name").and_then(lenient::text)?;
                // Affiliation is either a plain name or an organization object.
                let affiliation = map.get("affiliation").and_then(|aff| match aff {
                    Value::Object(org) => org.get("name").and_then(lenient::text),
                    other => lenient::text(other),
                });
                Some(AuthorRef::Person { name, affiliation })
            }
            _ => None,
        }
    }
}

/// A tool or dataset entry: either a bare name or `{name, url}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceRef {
    Name(String),
    Detailed {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl ResourceRef {
    pub fn name(&self) -> &str {
        match self {
            ResourceRef::Name(name) => name,
            ResourceRef::Detailed { name, .. } => name,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ResourceRef::Name(_) => None,
            ResourceRef::Detailed { url, .. } => url.as_deref(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => lenient::text(value).map(ResourceRef::Name),
            Value::Object(map) => {
                let name = map.get("name").and_then(lenient::text)?;
                let url = map.get("url").and_then(lenient::text);
                Some(ResourceRef::Detailed { name, url })
            }
            _ => None,
        }
    }
}

impl From<&str> for ResourceRef {
    fn from(name: &str) -> Self {
        ResourceRef::Name(name.to_string())
    }
}

impl From<&str> for AuthorRef {
    fn from(name: &str) -> Self {
        AuthorRef::Name(name.to_string())
    }
}

/// Structured metadata extracted from a paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaperMetadata {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "datePublished")]
    pub date_published: Option<String>,
    #[serde(rename = "author")]
    pub authors: Vec<AuthorRef>,
    pub keywords: Vec<String>,
    pub methodology: Option<String>,
    pub tools: Vec<ResourceRef>,
    pub datasets: Vec<ResourceRef>,
    pub results: Option<String>,
    pub conclusions: Option<String>,
}

impl PaperMetadata {
    pub fn from_value(value: &Value) -> Self {
        Self {
            title: text_field(value, &["title", "name"]),
            abstract_text: text_field(value, &["abstract"]),
            doi: text_field(value, &["doi"]),
            url: text_field(value, &["url"]),
            date_published: text_field(value, &["datePublished", "date_published"]),
            authors: list_field(value, &["author", "authors"])
                .iter()
                .filter_map(AuthorRef::from_value)
                .collect(),
            keywords: list_field(value, &["keywords"])
                .iter()
                .filter_map(lenient::text)
                .collect(),
            methodology: text_field(value, &["methodology"]),
            tools: list_field(value, &["tools"])
                .iter()
                .filter_map(ResourceRef::from_value)
                .collect(),
            datasets: list_field(value, &["datasets"])
                .iter()
                .filter_map(ResourceRef::from_value)
                .collect(),
            results: text_field(value, &["results"]),
            conclusions: text_field(value, &["conclusions"]),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)?;
        Ok(Self::from_value(&value))
    }
}

impl<'de> Deserialize<'de> for PaperMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Reproducibility assessment of a code repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReproducibilityAssessment {
    pub repository_url: Option<String>,
    pub assessment_timestamp: Option<String>,
    pub reproducibility_score: Option<f64>,
    /// `has_<flag>` capability flags, keyed without the `has_` prefix.
    pub flags: Vec<(String, bool)>,
    pub success_rate: Option<f64>,
    pub recommendations: Vec<String>,
}

impl ReproducibilityAssessment {
    pub fn from_value(value: &Value) -> Self {
        let mut flags = Vec::new();
        if let Some(analysis) = value.get("repository_analysis") {
            collect_flags(analysis, &mut flags);
        }

        Self {
            repository_url: value.get("repository_url").and_then(lenient::text),
            assessment_timestamp: value.get("assessment_timestamp").and_then(lenient::text),
            reproducibility_score: value.get("reproducibility_score").and_then(lenient::number),
            flags,
            success_rate: value
                .get("execution_results")
                .and_then(|results| results.get("success_rate"))
                .and_then(lenient::number),
            recommendations: value
                .get("recommendations")
                .map(lenient::list)
                .unwrap_or_default()
                .iter()
                .filter_map(lenient::text)
                .collect(),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)?;
        Ok(Self::from_value(&value))
    }
}

impl<'de> Deserialize<'de> for ReproducibilityAssessment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// First usable text among `keys`.
fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(lenient::text))
}

fn list_field(value: &Value, keys: &[&str]) -> Vec<Value> {
    keys.iter()
        .find_map(|key| value.get(*key))
        .map(lenient::list)
        .unwrap_or_default()
}

/// Boolean `has_*` entries, searched through nested section objects.
fn collect_flags(value: &Value, flags: &mut Vec<(String, bool)>) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, entry) in map {
        match (key.strip_prefix("has_"), entry) {
            (Some(flag), Value::Bool(present)) if !flag.is_empty() => {
                if !flags.iter().any(|(existing, _)| existing == flag) {
                    flags.push((flag.to_string(), *present));
                }
            }
            (_, Value::Object(_)) => collect_flags(entry, flags),
            _ => {}
        }
    }
}

/// Tolerant accessors for loosely typed JSON records.
pub mod lenient {
    use serde_json::Value;

    /// Non-empty trimmed string.
    pub fn text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// A finite JSON number, or a string holding one.
    pub fn number(value: &Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }

    /// An array, a single value treated as a one-element list, or nothing.
    pub fn list(value: &Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items.clone(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }
}
