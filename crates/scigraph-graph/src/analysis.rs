//! Aggregate and structural analytics over a statement store.

use crate::store::StatementStore;
use indexmap::{IndexMap, IndexSet};
use scigraph_core::vocab::predicate;
use scigraph_core::{EntityKind, Iri, Term};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of entities reported as highly connected.
pub const TOP_CENTRAL_ENTITIES: usize = 10;

/// Usage counts keyed by entity name, remembering first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageTable {
    counts: IndexMap<String, usize>,
}

impl UsageTable {
    pub fn record(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// The `n` most used names, highest count first. Equal counts keep
    /// first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .counts
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

impl FromIterator<(String, usize)> for UsageTable {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralEntity {
    pub entity: Iri,
    pub centrality: f64,
}

/// Everything the opportunity miner and the synthesizer read from a graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphAnalysis {
    pub total_triples: usize,
    /// Class identifier to number of entities typed with it.
    pub entity_counts: IndexMap<String, usize>,
    /// Predicate to number of statements, excluding type statements.
    pub relationship_counts: IndexMap<String, usize>,
    pub tool_usage: UsageTable,
    pub dataset_usage: UsageTable,
    /// Distinct keyword names, first-seen order.
    pub keywords: Vec<String>,
    pub reproducibility_scores: Vec<f64>,
    pub highly_connected_entities: Vec<CentralEntity>,
    /// Tool name to the papers that use it.
    #[serde(skip)]
    pub tool_papers: IndexMap<String, IndexSet<Iri>>,
}

impl GraphAnalysis {
    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.entity_counts
            .get(kind.class_iri())
            .copied()
            .unwrap_or(0)
    }

    /// Mean of the observed reproducibility scores, if any were observed.
    pub fn avg_reproducibility_score(&self) -> Option<f64> {
        if self.reproducibility_scores.is_empty() {
            return None;
        }
        let sum: f64 = self.reproducibility_scores.iter().sum();
        Some(sum / self.reproducibility_scores.len() as f64)
    }

    pub fn popular_tools(&self, n: usize) -> Vec<(String, usize)> {
        self.tool_usage.most_common(n)
    }

    pub fn popular_datasets(&self, n: usize) -> Vec<(String, usize)> {
        self.dataset_usage.most_common(n)
    }

    /// Papers using `tool`, or `None` when no paper names it.
    pub fn papers_using(&self, tool: &str) -> Option<&IndexSet<Iri>> {
        self.tool_papers.get(tool)
    }
}

/// Reads a store and produces a [`GraphAnalysis`].
#[derive(Debug, Clone, Copy)]
pub struct PatternAnalyzer<'a> {
    store: &'a StatementStore,
}

impl<'a> PatternAnalyzer<'a> {
    pub fn new(store: &'a StatementStore) -> Self {
        Self { store }
    }

    pub fn analyze(&self) -> GraphAnalysis {
        let type_predicate = Iri::new(predicate::TYPE);
        let uses_tool = Iri::new(predicate::USES_TOOL);
        let uses_dataset = Iri::new(predicate::USES_DATASET);
        let keywords_predicate = Iri::new(predicate::KEYWORDS);
        let score_predicate = Iri::new(predicate::REPRODUCIBILITY_SCORE);

        let mut analysis = GraphAnalysis {
            total_triples: self.store.len(),
            ..Default::default()
        };
        let mut keywords = IndexSet::new();

        for triple in self.store.iter() {
            if triple.predicate == type_predicate {
                *analysis
                    .entity_counts
                    .entry(triple.object.lexical().to_string())
                    .or_insert(0) += 1;
                continue;
            }

            *analysis
                .relationship_counts
                .entry(triple.predicate.to_string())
                .or_insert(0) += 1;

            if triple.predicate == uses_tool {
                if let Some(name) = self.entity_name(&triple.object) {
                    analysis.tool_usage.record(&name);
                    analysis
                        .tool_papers
                        .entry(name)
                        .or_default()
                        .insert(triple.subject.clone());
                }
            } else if triple.predicate == uses_dataset {
                if let Some(name) = self.entity_name(&triple.object) {
                    analysis.dataset_usage.record(&name);
                }
            } else if triple.predicate == keywords_predicate {
                if let Some(name) = self.entity_name(&triple.object) {
                    keywords.insert(name);
                }
            } else if triple.predicate == score_predicate {
                let score = triple.object.as_literal().and_then(|lit| lit.as_f64());
                match score.filter(|s| s.is_finite()) {
                    Some(score) => analysis.reproducibility_scores.push(score),
                    None => debug!("Skipping non-numeric score on {}", triple.subject),
                }
            }
        }

        analysis.keywords = keywords.into_iter().collect();
        analysis.highly_connected_entities =
            degree_centrality(self.store, TOP_CENTRAL_ENTITIES);

        info!(
            "Analyzed {} triples: {} tools, {} datasets, {} scores",
            analysis.total_triples,
            analysis.tool_usage.len(),
            analysis.dataset_usage.len(),
            analysis.reproducibility_scores.len()
        );
        analysis
    }

    /// `schema:name`, else `rdfs:label`, of an identifier object.
    fn entity_name(&self, object: &Term) -> Option<String> {
        let id = object.as_iri()?;
        [predicate::NAME, predicate::LABEL]
            .into_iter()
            .find_map(|name_predicate| {
                let name_predicate = Iri::new(name_predicate);
                let found = self
                    .store
                    .objects(id, &name_predicate)
                    .next()
                    .map(|name| name.lexical().to_string());
                found
            })
    }
}

/// Top `limit` entities by degree centrality in the co-reference graph.
///
/// Every statement whose object is an identifier is an undirected edge
/// between subject and object. Parallel edges collapse and a self-loop adds
/// two to the degree. Centrality is `degree / (nodes - 1)`, and `1.0` for a
/// single node. Ties keep the order in which nodes first appear.
pub fn degree_centrality(store: &StatementStore, limit: usize) -> Vec<CentralEntity> {
    let mut adjacency: IndexMap<&Iri, IndexSet<&Iri>> = IndexMap::new();
    for triple in store.iter() {
        let Some(object) = triple.object.as_iri() else {
            continue;
        };
        adjacency.entry(&triple.subject).or_default().insert(object);
        adjacency.entry(object).or_default().insert(&triple.subject);
    }

    let node_count = adjacency.len();
    if node_count == 0 {
        return Vec::new();
    }
    let scale = if node_count > 1 {
        1.0 / (node_count - 1) as f64
    } else {
        1.0
    };

    let mut ranked: Vec<CentralEntity> = adjacency
        .iter()
        .map(|(node, neighbours)| {
            let self_loop = usize::from(neighbours.contains(node));
            let degree = neighbours.len() + self_loop;
            let centrality = if node_count > 1 {
                degree as f64 * scale
            } else {
                1.0
            };
            CentralEntity {
                entity: (*node).clone(),
                centrality,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.centrality.total_cmp(&a.centrality));
    ranked.truncate(limit);
    debug!(
        "Computed degree centrality over {} nodes, keeping {}",
        node_count,
        ranked.len()
    );
    ranked
}
