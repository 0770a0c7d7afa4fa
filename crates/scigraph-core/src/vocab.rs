//! Namespaces, predicates and classes used by the research graph.

use crate::Iri;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace bases. Entity namespaces are the bases identifiers are minted in.
pub mod ns {
    pub const SCHEMA: &str = "https://schema.org/";
    pub const REPRO: &str = "https://reproducibility.org/";
    pub const SCIENTIFIC: &str = "https://scientific.org/";
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const DOI: &str = "https://doi.org/";
    pub const PAPERS: &str = "https://papers.org/";
    pub const AUTHORS: &str = "https://authors.org/";
    pub const ORGANIZATIONS: &str = "https://organizations.org/";
    pub const KEYWORDS: &str = "https://keywords.org/";
    pub const TOOLS: &str = "https://tools.org/";
    pub const DATASETS: &str = "https://datasets.org/";
    pub const METHODS: &str = "https://methods.org/";
    pub const RESULTS: &str = "https://results.org/";
    pub const CONCLUSIONS: &str = "https://conclusions.org/";
    pub const ASSESSMENTS: &str = "https://assessments.org/";
    pub const RECOMMENDATIONS: &str = "https://recommendations.org/";

    /// Prefix bindings written as comments by the N-Triples exporter.
    pub const BINDINGS: &[(&str, &str)] = &[
        ("schema", SCHEMA),
        ("repro", REPRO),
        ("scientific", SCIENTIFIC),
        ("dcterms", DCTERMS),
        ("foaf", FOAF),
    ];
}

pub mod predicate {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    pub const NAME: &str = "https://schema.org/name";
    pub const ABSTRACT: &str = "https://schema.org/abstract";
    pub const DATE_PUBLISHED: &str = "https://schema.org/datePublished";
    pub const IDENTIFIER: &str = "https://schema.org/identifier";
    pub const URL: &str = "https://schema.org/url";
    pub const AUTHOR: &str = "https://schema.org/author";
    pub const AFFILIATION: &str = "https://schema.org/affiliation";
    pub const KEYWORDS: &str = "https://schema.org/keywords";
    pub const DESCRIPTION: &str = "https://schema.org/description";

    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
    pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";

    pub const USES_TOOL: &str = "https://scientific.org/usesTool";
    pub const USES_DATASET: &str = "https://scientific.org/usesDataset";
    pub const USES_METHODOLOGY: &str = "https://scientific.org/usesMethodology";
    pub const HAS_RESULTS: &str = "https://scientific.org/hasResults";
    pub const HAS_CONCLUSIONS: &str = "https://scientific.org/hasConclusions";
    pub const HAS_CODE_REPOSITORY: &str = "https://scientific.org/hasCodeRepository";

    pub const REPRODUCIBILITY_SCORE: &str = "https://reproducibility.org/reproducibilityScore";
    pub const ASSESSES_REPOSITORY: &str = "https://reproducibility.org/assessesRepository";
    pub const EXECUTION_SUCCESS_RATE: &str = "https://reproducibility.org/executionSuccessRate";
    pub const HAS_RECOMMENDATION: &str = "https://reproducibility.org/hasRecommendation";
}

/// Build a predicate in the given namespace, e.g. `repro:readme`.
pub fn term(namespace: &str, local: &str) -> Iri {
    Iri::new(format!("{}{}", namespace, local))
}

/// Entity classification carried by `rdf:type` statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Paper,
    Author,
    Organization,
    Keyword,
    Tool,
    Dataset,
    Methodology,
    Results,
    Conclusion,
    Repository,
    Assessment,
    Recommendation,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Paper,
        EntityKind::Author,
        EntityKind::Organization,
        EntityKind::Keyword,
        EntityKind::Tool,
        EntityKind::Dataset,
        EntityKind::Methodology,
        EntityKind::Results,
        EntityKind::Conclusion,
        EntityKind::Repository,
        EntityKind::Assessment,
        EntityKind::Recommendation,
    ];

    pub fn class_iri(&self) -> &'static str {
        match self {
            EntityKind::Paper => "https://schema.org/ScholarlyArticle",
            EntityKind::Author => "https://schema.org/Person",
            EntityKind::Organization => "https://schema.org/Organization",
            EntityKind::Keyword => "https://schema.org/DefinedTerm",
            EntityKind::Tool => "https://scientific.org/SoftwareTool",
            EntityKind::Dataset => "https://schema.org/Dataset",
            EntityKind::Methodology => "https://scientific.org/Methodology",
            EntityKind::Results => "https://scientific.org/Results",
            EntityKind::Conclusion => "https://scientific.org/Conclusions",
            EntityKind::Repository => "https://scientific.org/CodeRepository",
            EntityKind::Assessment => "https://reproducibility.org/ReproducibilityAssessment",
            EntityKind::Recommendation => "https://reproducibility.org/Recommendation",
        }
    }

    pub fn class(&self) -> Iri {
        Iri::new(self.class_iri())
    }

    pub fn from_class_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.class_iri() == iri)
    }

    /// Namespace identifiers of this kind are minted in, when minted by name.
    pub fn namespace(&self) -> &'static str {
        match self {
            EntityKind::Paper => ns::PAPERS,
            EntityKind::Author => ns::AUTHORS,
            EntityKind::Organization => ns::ORGANIZATIONS,
            EntityKind::Keyword => ns::KEYWORDS,
            EntityKind::Tool => ns::TOOLS,
            EntityKind::Dataset => ns::DATASETS,
            EntityKind::Methodology => ns::METHODS,
            EntityKind::Results => ns::RESULTS,
            EntityKind::Conclusion => ns::CONCLUSIONS,
            EntityKind::Assessment => ns::ASSESSMENTS,
            EntityKind::Recommendation => ns::RECOMMENDATIONS,
            // Repositories are identified by their own URL.
            EntityKind::Repository => "",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Paper => "paper",
            EntityKind::Author => "author",
            EntityKind::Organization => "organization",
            EntityKind::Keyword => "keyword",
            EntityKind::Tool => "tool",
            EntityKind::Dataset => "dataset",
            EntityKind::Methodology => "methodology",
            EntityKind::Results => "results",
            EntityKind::Conclusion => "conclusion",
            EntityKind::Repository => "repository",
            EntityKind::Assessment => "assessment",
            EntityKind::Recommendation => "recommendation",
        };
        write!(f, "{}", s)
    }
}
