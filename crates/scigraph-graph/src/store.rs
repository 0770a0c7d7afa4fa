use crate::exchange::{self, GraphFormat};
use indexmap::IndexSet;
use scigraph_core::vocab::{ns, predicate};
use scigraph_core::{EntityKind, Iri, Result, Term, Triple};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Deduplicated set of statements with prefix bindings.
///
/// Statements keep their first-insertion position; there is no removal, so
/// positions stay valid for the subject and predicate indexes.
#[derive(Debug, Clone)]
pub struct StatementStore {
    triples: IndexSet<Triple>,
    by_subject: HashMap<Iri, Vec<usize>>,
    by_predicate: HashMap<Iri, Vec<usize>>,
    bindings: BTreeMap<String, String>,
}

impl Default for StatementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementStore {
    pub fn new() -> Self {
        let bindings = ns::BINDINGS
            .iter()
            .map(|(prefix, base)| (prefix.to_string(), base.to_string()))
            .collect();
        Self {
            triples: IndexSet::new(),
            by_subject: HashMap::new(),
            by_predicate: HashMap::new(),
            bindings,
        }
    }

    /// Insert a statement. Returns false when it was already present.
    pub fn add(&mut self, subject: Iri, predicate: Iri, object: impl Into<Term>) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }
        let position = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(position);
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .push(position);
        self.triples.insert(triple);
        true
    }

    /// Insert many statements, returning how many were new.
    pub fn extend<I: IntoIterator<Item = Triple>>(&mut self, triples: I) -> usize {
        triples
            .into_iter()
            .map(|triple| self.insert(triple))
            .filter(|added| *added)
            .count()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All statements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> + '_ {
        self.triples.iter()
    }

    /// Lazily yield statements matching every supplied filter.
    ///
    /// A subject filter scans only that subject's statements; otherwise a
    /// predicate filter scans only that predicate's statements.
    pub fn triples<'a, 'f>(
        &'a self,
        subject: Option<&'f Iri>,
        predicate: Option<&'f Iri>,
        object: Option<&'f Term>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'f>
    where
        'a: 'f,
    {
        let candidates: Box<dyn Iterator<Item = &'a Triple> + 'f> = match (subject, predicate) {
            (Some(s), _) => self.indexed(self.by_subject.get(s)),
            (None, Some(p)) => self.indexed(self.by_predicate.get(p)),
            (None, None) => Box::new(self.triples.iter()),
        };

        Box::new(candidates.filter(move |t| {
            subject.map_or(true, |s| &t.subject == s)
                && predicate.map_or(true, |p| &t.predicate == p)
                && object.map_or(true, |o| &t.object == o)
        }))
    }

    fn indexed<'a>(
        &'a self,
        positions: Option<&'a Vec<usize>>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        match positions {
            Some(positions) => Box::new(
                positions
                    .iter()
                    .filter_map(move |&position| self.triples.get_index(position)),
            ),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Objects of `(subject, predicate, ?)`.
    pub fn objects<'a, 'f>(
        &'a self,
        subject: &'f Iri,
        predicate: &'f Iri,
    ) -> impl Iterator<Item = &'a Term> + 'f
    where
        'a: 'f,
    {
        self.triples(Some(subject), Some(predicate), None)
            .map(|t| &t.object)
    }

    /// Subjects of `(?, predicate, object)`.
    pub fn subjects<'a, 'f>(
        &'a self,
        predicate: &'f Iri,
        object: &'f Term,
    ) -> impl Iterator<Item = &'a Iri> + 'f
    where
        'a: 'f,
    {
        self.triples(None, Some(predicate), Some(object))
            .map(|t| &t.subject)
    }

    /// Entities typed with the class of `kind`.
    pub fn entities_of(&self, kind: EntityKind) -> Vec<&Iri> {
        let type_predicate = Iri::new(predicate::TYPE);
        let class = Term::Iri(kind.class());
        self.triples(None, Some(&type_predicate), Some(&class))
            .map(|t| &t.subject)
            .collect()
    }

    pub fn bindings(&self) -> &BTreeMap<String, String> {
        &self.bindings
    }

    /// Export every statement in `format`.
    pub fn serialize(&self, format: GraphFormat) -> Result<String> {
        match format {
            GraphFormat::Json => exchange::to_json(self),
            GraphFormat::NTriples => Ok(exchange::to_ntriples(self)),
        }
    }

    /// Merge statements parsed from `source`. Returns the number of new statements.
    pub fn load(&mut self, source: &str, format: GraphFormat) -> Result<usize> {
        let parsed = match format {
            GraphFormat::Json => exchange::from_json(source)?,
            GraphFormat::NTriples => exchange::from_ntriples(source)?,
        };
        let total = parsed.len();
        let added = self.extend(parsed);
        debug!("Parsed {} statements ({} new) as {}", total, added, format);
        Ok(added)
    }

    pub fn save(&self, path: &Path, format: GraphFormat) -> Result<()> {
        let content = self.serialize(format)?;
        std::fs::write(path, content)?;
        info!(
            "Knowledge graph saved to {} in {} format ({} triples)",
            path.display(),
            format,
            self.len()
        );
        Ok(())
    }

    /// Merge a graph file, picking the format from its extension.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let format = GraphFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let added = self.load(&content, format)?;
        info!(
            "Loaded knowledge graph from {} ({} triples)",
            path.display(),
            self.len()
        );
        Ok(added)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let mut store = Self::new();
        store.load_file(path)?;
        Ok(store)
    }

    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            total_triples: self.len(),
            papers: self.entities_of(EntityKind::Paper).len(),
            authors: self.entities_of(EntityKind::Author).len(),
            tools: self.entities_of(EntityKind::Tool).len(),
            datasets: self.entities_of(EntityKind::Dataset).len(),
            assessments: self.entities_of(EntityKind::Assessment).len(),
        }
    }
}

/// Headline counts for a built graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphStatistics {
    pub total_triples: usize,
    pub papers: usize,
    pub authors: usize,
    pub tools: usize,
    pub datasets: usize,
    pub assessments: usize,
}
