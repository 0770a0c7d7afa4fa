use crate::minter::{assessment_key, doi_identifier, mint, mint_entity};
use crate::records::{AuthorRef, PaperMetadata, ReproducibilityAssessment, ResourceRef};
use crate::store::{GraphStatistics, StatementStore};
use scigraph_core::vocab::{ns, predicate, term};
use scigraph_core::{EntityKind, Iri, Literal};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Counts reported by file-level ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSummary {
    pub papers_added: usize,
    pub assessments_added: usize,
}

/// Turns paper metadata and reproducibility assessments into statements.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    store: StatementStore,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue building on top of an existing store.
    pub fn with_store(store: StatementStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StatementStore {
        &self.store
    }

    pub fn into_store(self) -> StatementStore {
        self.store
    }

    pub fn statistics(&self) -> GraphStatistics {
        self.store.statistics()
    }

    /// Ingest a paper record and return its identifier.
    ///
    /// Papers with neither DOI, URL nor title get a random identifier, so
    /// ingesting the same record twice yields two papers. Use
    /// [`GraphBuilder::add_paper_metadata_keyed`] when a stable key exists.
    pub fn add_paper_metadata(&mut self, metadata: &PaperMetadata) -> Iri {
        self.ingest_paper(metadata, None)
    }

    /// Like [`GraphBuilder::add_paper_metadata`], minting from `fallback_key`
    /// when the record carries no DOI, URL or title.
    pub fn add_paper_metadata_keyed(&mut self, metadata: &PaperMetadata, fallback_key: &str) -> Iri {
        self.ingest_paper(metadata, Some(fallback_key))
    }

    fn ingest_paper(&mut self, metadata: &PaperMetadata, fallback_key: Option<&str>) -> Iri {
        // Key used for the paper and its sub-entities when minted by name.
        let key = metadata
            .title
            .clone()
            .or_else(|| {
                fallback_key
                    .filter(|key| !key.trim().is_empty())
                    .map(str::to_string)
            })
            .or_else(|| metadata.doi.clone())
            .or_else(|| metadata.url.clone())
            .unwrap_or_else(|| {
                let generated = Uuid::new_v4().to_string();
                warn!(
                    "Paper has no DOI, URL, title or key; using random identifier {}",
                    generated
                );
                generated
            });

        let paper = if let Some(doi) = &metadata.doi {
            doi_identifier(doi)
        } else if let Some(url) = &metadata.url {
            Iri::new(url.as_str())
        } else {
            mint(ns::PAPERS, &key)
        };

        self.add_type(&paper, EntityKind::Paper);

        if let Some(title) = &metadata.title {
            self.store
                .add(paper.clone(), Iri::new(predicate::NAME), Literal::plain(title));
            self.store
                .add(paper.clone(), Iri::new(predicate::TITLE), Literal::plain(title));
        }
        if let Some(abstract_text) = &metadata.abstract_text {
            self.store.add(
                paper.clone(),
                Iri::new(predicate::ABSTRACT),
                Literal::plain(abstract_text),
            );
        }
        if let Some(date) = &metadata.date_published {
            self.store.add(
                paper.clone(),
                Iri::new(predicate::DATE_PUBLISHED),
                Literal::date(date),
            );
        }
        if let Some(doi) = &metadata.doi {
            self.store
                .add(paper.clone(), Iri::new(predicate::IDENTIFIER), Literal::plain(doi));
        }
        if let Some(url) = &metadata.url {
            self.store
                .add(paper.clone(), Iri::new(predicate::URL), Iri::new(url.as_str()));
        }

        for author in &metadata.authors {
            let author = self.add_author(author);
            self.store
                .add(paper.clone(), Iri::new(predicate::AUTHOR), author);
        }

        for keyword in &metadata.keywords {
            let keyword_id = mint_entity(EntityKind::Keyword, keyword);
            self.add_type(&keyword_id, EntityKind::Keyword);
            self.add_name(&keyword_id, keyword);
            self.store
                .add(paper.clone(), Iri::new(predicate::KEYWORDS), keyword_id);
        }

        if let Some(methodology) = &metadata.methodology {
            let method = self.add_description_entity(
                EntityKind::Methodology,
                &format!("{}_method", key),
                methodology,
            );
            self.store
                .add(paper.clone(), Iri::new(predicate::USES_METHODOLOGY), method);
        }

        for tool in &metadata.tools {
            let tool = self.add_resource(EntityKind::Tool, tool);
            self.store
                .add(paper.clone(), Iri::new(predicate::USES_TOOL), tool);
        }

        for dataset in &metadata.datasets {
            let dataset = self.add_resource(EntityKind::Dataset, dataset);
            self.store
                .add(paper.clone(), Iri::new(predicate::USES_DATASET), dataset);
        }

        if let Some(results) = &metadata.results {
            let node =
                self.add_description_entity(EntityKind::Results, &format!("{}_results", key), results);
            self.store
                .add(paper.clone(), Iri::new(predicate::HAS_RESULTS), node);
        }

        if let Some(conclusions) = &metadata.conclusions {
            let node = self.add_description_entity(
                EntityKind::Conclusion,
                &format!("{}_conclusions", key),
                conclusions,
            );
            self.store
                .add(paper.clone(), Iri::new(predicate::HAS_CONCLUSIONS), node);
        }

        debug!(
            "Ingested paper {} ({} authors, {} tools, {} datasets)",
            paper,
            metadata.authors.len(),
            metadata.tools.len(),
            metadata.datasets.len()
        );
        paper
    }

    pub fn add_author(&mut self, author: &AuthorRef) -> Iri {
        let name = author.name();
        let author_id = mint_entity(EntityKind::Author, name);
        self.add_type(&author_id, EntityKind::Author);
        self.store.add(
            author_id.clone(),
            Iri::new(predicate::FOAF_NAME),
            Literal::plain(name),
        );
        self.add_name(&author_id, name);

        if let Some(affiliation) = author.affiliation() {
            let organization = mint_entity(EntityKind::Organization, affiliation);
            self.add_type(&organization, EntityKind::Organization);
            self.add_name(&organization, affiliation);
            self.store.add(
                author_id.clone(),
                Iri::new(predicate::AFFILIATION),
                organization,
            );
        }

        author_id
    }

    /// Tools and datasets share a shape: a named, typed node with an optional URL.
    pub fn add_resource(&mut self, kind: EntityKind, resource: &ResourceRef) -> Iri {
        let id = mint_entity(kind, resource.name());
        self.add_type(&id, kind);
        self.add_name(&id, resource.name());
        if let Some(url) = resource.url() {
            self.store
                .add(id.clone(), Iri::new(predicate::URL), Iri::new(url));
        }
        id
    }

    /// Ingest an assessment and return its identifier.
    ///
    /// The repository is linked to `paper` only when one is supplied.
    pub fn add_reproducibility_assessment(
        &mut self,
        assessment: &ReproducibilityAssessment,
        paper: Option<&Iri>,
    ) -> Iri {
        let repository_url = assessment.repository_url.as_deref().unwrap_or_default();
        let key = assessment_key(repository_url);
        let assessment_id = mint(ns::ASSESSMENTS, &key);

        self.add_type(&assessment_id, EntityKind::Assessment);

        if let Some(timestamp) = &assessment.assessment_timestamp {
            self.store.add(
                assessment_id.clone(),
                Iri::new(predicate::CREATED),
                Literal::date_time(timestamp),
            );
        }

        if let Some(score) = assessment.reproducibility_score {
            self.store.add(
                assessment_id.clone(),
                Iri::new(predicate::REPRODUCIBILITY_SCORE),
                Literal::float(score),
            );
        }

        if !repository_url.is_empty() {
            let repository = Iri::new(repository_url);
            self.add_type(&repository, EntityKind::Repository);
            self.store.add(
                repository.clone(),
                Iri::new(predicate::URL),
                repository.clone(),
            );
            self.store.add(
                assessment_id.clone(),
                Iri::new(predicate::ASSESSES_REPOSITORY),
                repository.clone(),
            );
            if let Some(paper) = paper {
                self.store.add(
                    paper.clone(),
                    Iri::new(predicate::HAS_CODE_REPOSITORY),
                    repository,
                );
            }
        } else if paper.is_some() {
            debug!("Assessment has no repository URL; not linking it to the paper");
        }

        for (flag, present) in &assessment.flags {
            self.store.add(
                assessment_id.clone(),
                term(ns::REPRO, flag),
                Literal::boolean(*present),
            );
        }

        if let Some(rate) = assessment.success_rate {
            self.store.add(
                assessment_id.clone(),
                Iri::new(predicate::EXECUTION_SUCCESS_RATE),
                Literal::float(rate),
            );
        }

        for (index, recommendation) in assessment.recommendations.iter().enumerate() {
            let node = mint(ns::RECOMMENDATIONS, &format!("{}_{}", key, index));
            self.add_type(&node, EntityKind::Recommendation);
            self.store.add(
                node.clone(),
                Iri::new(predicate::DESCRIPTION),
                Literal::plain(recommendation),
            );
            self.store.add(
                assessment_id.clone(),
                Iri::new(predicate::HAS_RECOMMENDATION),
                node,
            );
        }

        debug!(
            "Ingested assessment {} ({} flags, {} recommendations)",
            assessment_id,
            assessment.flags.len(),
            assessment.recommendations.len()
        );
        assessment_id
    }

    /// Ingest the given metadata and assessment files.
    ///
    /// Unreadable or non-JSON files are logged and skipped. When both files
    /// are ingested, the assessment's repository is linked to the paper.
    pub fn load_and_process_files(
        &mut self,
        metadata_file: Option<&Path>,
        reproducibility_file: Option<&Path>,
    ) -> IngestionSummary {
        let mut summary = IngestionSummary::default();
        let mut paper = None;

        if let Some(path) = metadata_file {
            match read_record(path, PaperMetadata::from_json_str) {
                Some(metadata) => {
                    paper = Some(self.add_paper_metadata(&metadata));
                    summary.papers_added = 1;
                    info!("Added paper metadata from {}", path.display());
                }
                None => error!("Skipping metadata file {}", path.display()),
            }
        }

        if let Some(path) = reproducibility_file {
            match read_record(path, ReproducibilityAssessment::from_json_str) {
                Some(assessment) => {
                    self.add_reproducibility_assessment(&assessment, paper.as_ref());
                    summary.assessments_added = 1;
                    info!("Added reproducibility assessment from {}", path.display());
                }
                None => error!("Skipping reproducibility file {}", path.display()),
            }
        }

        summary
    }

    fn add_type(&mut self, id: &Iri, kind: EntityKind) {
        self.store
            .add(id.clone(), Iri::new(predicate::TYPE), kind.class());
    }

    fn add_name(&mut self, id: &Iri, name: &str) {
        self.store
            .add(id.clone(), Iri::new(predicate::NAME), Literal::plain(name));
    }

    fn add_description_entity(&mut self, kind: EntityKind, key: &str, description: &str) -> Iri {
        let id = mint_entity(kind, key);
        self.add_type(&id, kind);
        self.store.add(
            id.clone(),
            Iri::new(predicate::DESCRIPTION),
            Literal::plain(description),
        );
        id
    }
}

fn read_record<T>(path: &Path, parse: fn(&str) -> scigraph_core::Result<T>) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match parse(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            error!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scigraph_core::{Term, Triple};

    fn has(store: &StatementStore, s: &Iri, p: &str, o: impl Into<Term>) -> bool {
        store.contains(&Triple::new(s.clone(), Iri::new(p), o))
    }

    #[test]
    fn test_paper_identifier_preference() {
        let mut builder = GraphBuilder::new();

        let with_doi = PaperMetadata {
            doi: Some("10.1000/xyz".into()),
            url: Some("https://example.org/paper".into()),
            ..Default::default()
        };
        assert_eq!(
            builder.add_paper_metadata(&with_doi).as_str(),
            "https://doi.org/10.1000/xyz"
        );

        let with_url = PaperMetadata {
            url: Some("https://example.org/paper".into()),
            ..Default::default()
        };
        assert_eq!(
            builder.add_paper_metadata(&with_url).as_str(),
            "https://example.org/paper"
        );

        let titled = PaperMetadata {
            title: Some("Deep  Graphs".into()),
            ..Default::default()
        };
        assert_eq!(
            builder.add_paper_metadata(&titled).as_str(),
            "https://papers.org/Deep_Graphs"
        );
    }

    #[test]
    fn test_keyed_paper_is_stable() {
        let metadata = PaperMetadata {
            abstract_text: Some("No title here".into()),
            ..Default::default()
        };
        let mut builder = GraphBuilder::new();
        let a = builder.add_paper_metadata_keyed(&metadata, "upload-17");
        let b = builder.add_paper_metadata_keyed(&metadata, "upload-17");
        assert_eq!(a, b);
        assert_eq!(builder.statistics().papers, 1);

        let c = builder.add_paper_metadata(&metadata);
        let d = builder.add_paper_metadata(&metadata);
        assert_ne!(c, d);
    }

    #[test]
    fn test_sub_entities_and_authors() {
        let metadata = PaperMetadata {
            title: Some("Paper".into()),
            methodology: Some("We trained".into()),
            results: Some("It worked".into()),
            conclusions: Some("Ship it".into()),
            authors: vec![AuthorRef::Person {
                name: "Grace Hopper".into(),
                affiliation: Some("US Navy".into()),
            }],
            ..Default::default()
        };
        let mut builder = GraphBuilder::new();
        let paper = builder.add_paper_metadata(&metadata);
        let store = builder.store();

        let method = Iri::new("https://methods.org/Paper_method");
        assert!(has(store, &paper, predicate::USES_METHODOLOGY, method.clone()));
        assert!(has(store, &method, predicate::DESCRIPTION, Literal::plain("We trained")));
        assert!(has(
            store,
            &paper,
            predicate::HAS_RESULTS,
            Iri::new("https://results.org/Paper_results")
        ));
        assert!(has(
            store,
            &paper,
            predicate::HAS_CONCLUSIONS,
            Iri::new("https://conclusions.org/Paper_conclusions")
        ));

        let author = Iri::new("https://authors.org/Grace_Hopper");
        assert!(has(store, &paper, predicate::AUTHOR, author.clone()));
        assert!(has(store, &author, predicate::FOAF_NAME, Literal::plain("Grace Hopper")));
        assert!(has(
            store,
            &author,
            predicate::AFFILIATION,
            Iri::new("https://organizations.org/US_Navy")
        ));
    }

    #[test]
    fn test_assessment_statements() {
        let assessment = ReproducibilityAssessment {
            repository_url: Some("https://github.com/org/repo".into()),
            assessment_timestamp: Some("2024-01-01T00:00:00".into()),
            reproducibility_score: Some(0.4),
            flags: vec![("readme".into(), true), ("dockerfile".into(), false)],
            success_rate: Some(0.5),
            recommendations: vec!["Add tests".into(), "Add CI".into()],
        };
        let mut builder = GraphBuilder::new();
        let paper = Iri::new("https://doi.org/10.1/abc");
        let id = builder.add_reproducibility_assessment(&assessment, Some(&paper));
        let store = builder.store();

        let repo = Iri::new("https://github.com/org/repo");
        assert!(id.as_str().starts_with("https://assessments.org/assessment_"));
        assert!(has(store, &id, predicate::REPRODUCIBILITY_SCORE, Literal::float(0.4)));
        assert!(has(store, &id, "https://reproducibility.org/readme", Literal::boolean(true)));
        assert!(has(
            store,
            &id,
            "https://reproducibility.org/dockerfile",
            Literal::boolean(false)
        ));
        assert!(has(store, &id, predicate::ASSESSES_REPOSITORY, repo.clone()));
        assert!(has(store, &paper, predicate::HAS_CODE_REPOSITORY, repo.clone()));
        assert!(has(store, &repo, predicate::URL, repo.clone()));
        assert_eq!(store.entities_of(EntityKind::Recommendation).len(), 2);

        // Re-ingesting the same assessment adds nothing.
        let before = builder.store().len();
        let again = builder.add_reproducibility_assessment(&assessment, Some(&paper));
        assert_eq!(again, id);
        assert_eq!(builder.store().len(), before);
    }

    #[test]
    fn test_assessment_without_paper_is_not_linked() {
        let assessment = ReproducibilityAssessment {
            repository_url: Some("https://github.com/org/repo".into()),
            ..Default::default()
        };
        let mut builder = GraphBuilder::new();
        builder.add_reproducibility_assessment(&assessment, None);
        let link = Iri::new(predicate::HAS_CODE_REPOSITORY);
        assert_eq!(builder.store().triples(None, Some(&link), None).count(), 0);
    }
}
