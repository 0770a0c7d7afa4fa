use scigraph_core::vocab::predicate;
use scigraph_core::{EntityKind, Iri, Term};
use scigraph_graph::{
    GraphBuilder, GraphFormat, OpportunityKind, OpportunityMiner, PaperMetadata,
    PatternAnalyzer, ReproducibilityAssessment, StatementStore,
};
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn paper(title: &str, tools: &[&str], datasets: &[&str]) -> PaperMetadata {
    PaperMetadata::from_value(&json!({
        "title": title,
        "tools": tools,
        "datasets": datasets,
    }))
}

fn sample_store() -> StatementStore {
    let mut builder = GraphBuilder::new();
    let metadata = PaperMetadata::from_value(&json!({
        "title": "Protein Structure with Graph Nets",
        "abstract": "We study folding.",
        "doi": "10.1234/pgn.2024",
        "datePublished": "2024-02-01",
        "author": [
            "Rosalind Franklin",
            {"name": "Linus Pauling", "affiliation": "Caltech"}
        ],
        "keywords": ["protein folding", "graph neural networks"],
        "methodology": "Message passing over residue graphs",
        "tools": ["PyTorch", {"name": "DGL", "url": "https://www.dgl.ai"}],
        "datasets": ["PDB"],
        "results": "Improved accuracy",
        "conclusions": "Graphs help"
    }));
    let paper = builder.add_paper_metadata(&metadata);

    let assessment = ReproducibilityAssessment::from_value(&json!({
        "repository_url": "https://github.com/lab/pgn",
        "assessment_timestamp": "2024-03-01T12:00:00",
        "reproducibility_score": 0.55,
        "repository_analysis": {"documentation": {"has_readme": true}},
        "execution_results": {"success_rate": 0.5},
        "recommendations": ["Add a Dockerfile"]
    }));
    builder.add_reproducibility_assessment(&assessment, Some(&paper));
    builder.into_store()
}

#[test]
fn test_every_identifier_is_minted_from_input() {
    let store = sample_store();
    let known_prefixes = [
        "https://doi.org/",
        "https://authors.org/",
        "https://organizations.org/",
        "https://keywords.org/",
        "https://tools.org/",
        "https://datasets.org/",
        "https://methods.org/",
        "https://results.org/",
        "https://conclusions.org/",
        "https://assessments.org/",
        "https://recommendations.org/",
        "https://github.com/lab/pgn",
        "https://www.dgl.ai",
    ];
    let type_predicate = Iri::new(predicate::TYPE);

    for triple in store.iter() {
        assert!(
            known_prefixes
                .iter()
                .any(|prefix| triple.subject.as_str().starts_with(prefix)),
            "unexpected subject {}",
            triple.subject
        );
        if triple.predicate == type_predicate {
            continue;
        }
        if let Some(object) = triple.object.as_iri() {
            assert!(
                known_prefixes
                    .iter()
                    .any(|prefix| object.as_str().starts_with(prefix)),
                "unexpected object {}",
                object
            );
        }
    }
}

#[test]
fn test_statistics_after_ingestion() {
    let stats = sample_store().statistics();
    assert_eq!(stats.papers, 1);
    assert_eq!(stats.authors, 2);
    assert_eq!(stats.tools, 2);
    assert_eq!(stats.datasets, 1);
    assert_eq!(stats.assessments, 1);
    assert!(stats.total_triples > 30);
}

#[test]
fn test_reingesting_same_paper_adds_nothing() {
    let mut builder = GraphBuilder::new();
    let metadata = paper("Stable Title", &["A"], &["D"]);
    builder.add_paper_metadata(&metadata);
    let size = builder.store().len();
    builder.add_paper_metadata(&metadata);
    assert_eq!(builder.store().len(), size);
}

#[test]
fn test_json_round_trip_through_file() {
    let store = sample_store();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");
    store.save(&path, GraphFormat::Json).unwrap();

    let reloaded = StatementStore::from_file(&path).unwrap();
    let original: HashSet<_> = store.iter().cloned().collect();
    let restored: HashSet<_> = reloaded.iter().cloned().collect();
    assert_eq!(original, restored);
}

#[test]
fn test_ntriples_round_trip_through_file() {
    let mut builder = GraphBuilder::with_store(sample_store());
    builder.add_paper_metadata(&PaperMetadata::from_value(&json!({
        "title": "Quotes \"and\" \\ backslashes\nover lines",
        "tools": ["Tab\tTool"]
    })));
    let store = builder.into_store();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.nt");
    store.save(&path, GraphFormat::NTriples).unwrap();

    let reloaded = StatementStore::from_file(&path).unwrap();
    let original: HashSet<_> = store.iter().cloned().collect();
    let restored: HashSet<_> = reloaded.iter().cloned().collect();
    assert_eq!(original, restored);
}

#[test]
fn test_ntriples_round_trip_of_legacy_doi() {
    let doi = "10.1002/(SICI)1097-4636(199812)43:4<433::AID-JBM11>3.0.CO;2-3";
    let mut builder = GraphBuilder::new();
    let paper = builder.add_paper_metadata(&PaperMetadata::from_value(&json!({
        "title": "Biomaterials in 1998",
        "doi": doi,
        "tools": ["Alpha"]
    })));
    assert!(paper.as_str().contains("<433::AID-JBM11>"));
    let store = builder.into_store();

    let serialized = store.serialize(GraphFormat::NTriples).unwrap();
    let mut reloaded = StatementStore::new();
    reloaded.load(&serialized, GraphFormat::NTriples).unwrap();

    let original: HashSet<_> = store.iter().cloned().collect();
    let restored: HashSet<_> = reloaded.iter().cloned().collect();
    assert_eq!(original, restored);
    assert!(reloaded.iter().any(|t| t.subject == paper));
}

#[test]
fn test_load_merges_additively() {
    let store = sample_store();
    let serialized = store.serialize(GraphFormat::Json).unwrap();

    let mut target = StatementStore::new();
    let mut builder = GraphBuilder::new();
    builder.add_paper_metadata(&paper("Other", &["Rust"], &[]));
    for triple in builder.store().iter() {
        target.insert(triple.clone());
    }
    let before = target.len();

    let added = target.load(&serialized, GraphFormat::Json).unwrap();
    assert_eq!(added, store.len());
    assert_eq!(target.len(), before + store.len());
    assert_eq!(target.load(&serialized, GraphFormat::Json).unwrap(), 0);
}

#[test]
fn test_unreadable_graph_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(StatementStore::from_file(&path).is_err());
    assert!(StatementStore::from_file(&dir.path().join("missing.nt")).is_err());
    assert!(StatementStore::from_file(&dir.path().join("graph.ttl")).is_err());
}

#[test]
fn test_file_ingestion_skips_bad_files() {
    let dir = TempDir::new().unwrap();
    let metadata_path = dir.path().join("metadata.json");
    let assessment_path = dir.path().join("assessment.json");
    fs::write(
        &metadata_path,
        json!({"title": "Linked", "tools": ["X"]}).to_string(),
    )
    .unwrap();
    fs::write(
        &assessment_path,
        json!({"repository_url": "https://github.com/a/b", "reproducibility_score": 0.9})
            .to_string(),
    )
    .unwrap();

    let mut builder = GraphBuilder::new();
    let summary = builder.load_and_process_files(Some(&metadata_path), Some(&assessment_path));
    assert_eq!(summary.papers_added, 1);
    assert_eq!(summary.assessments_added, 1);

    let link = Iri::new(predicate::HAS_CODE_REPOSITORY);
    let linked: Vec<_> = builder.store().triples(None, Some(&link), None).collect();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].subject.as_str(), "https://papers.org/Linked");
    assert_eq!(
        linked[0].object,
        Term::Iri(Iri::new("https://github.com/a/b"))
    );

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "not json at all").unwrap();
    let mut builder = GraphBuilder::new();
    let summary = builder.load_and_process_files(Some(&bad), Some(&dir.path().join("absent.json")));
    assert_eq!(summary.papers_added, 0);
    assert_eq!(summary.assessments_added, 0);
    assert!(builder.store().is_empty());
}

#[test]
fn test_unparseable_scores_do_not_mask_low_reproducibility() {
    let mut builder = GraphBuilder::new();
    for (repo, score) in [
        ("https://github.com/lab/a", json!("NaN")),
        ("https://github.com/lab/b", json!("inf")),
        ("https://github.com/lab/c", json!(0.3)),
    ] {
        builder.add_reproducibility_assessment(
            &ReproducibilityAssessment::from_value(&json!({
                "repository_url": repo,
                "reproducibility_score": score
            })),
            None,
        );
    }
    let analysis = PatternAnalyzer::new(builder.store()).analyze();
    assert_eq!(analysis.reproducibility_scores, vec![0.3]);

    let opportunities = OpportunityMiner::new().mine(&analysis);
    assert!(opportunities
        .iter()
        .any(|o| o.kind == OpportunityKind::ReproducibilityImprovement));
}

#[test]
fn test_tool_pairs_that_never_co_occur() {
    let mut builder = GraphBuilder::new();
    builder.add_paper_metadata(&paper("P1", &["A", "C"], &[]));
    builder.add_paper_metadata(&paper("P2", &["A", "C"], &[]));
    builder.add_paper_metadata(&paper("P3", &["B"], &[]));
    builder.add_paper_metadata(&paper("P4", &["B"], &[]));
    let store = builder.into_store();

    let analysis = PatternAnalyzer::new(&store).analyze();
    let opportunities = OpportunityMiner::new().mine(&analysis);
    let pairs: Vec<(&str, &str)> = opportunities.iter().filter_map(|o| o.tools()).collect();

    let has_pair = |x: &str, y: &str| {
        pairs
            .iter()
            .filter(|(a, b)| (*a == x && *b == y) || (*a == y && *b == x))
            .count()
    };
    assert_eq!(has_pair("A", "B"), 1);
    assert_eq!(has_pair("B", "C"), 1);
    assert_eq!(has_pair("A", "C"), 0);
}

#[test]
fn test_analysis_of_sample_graph() {
    let store = sample_store();
    let analysis = PatternAnalyzer::new(&store).analyze();

    assert_eq!(analysis.entity_count(EntityKind::Paper), 1);
    assert_eq!(analysis.tool_usage.get("PyTorch"), 1);
    assert_eq!(analysis.dataset_usage.get("PDB"), 1);
    assert_eq!(analysis.reproducibility_scores, vec![0.55]);
    assert!(!analysis.relationship_counts.contains_key(predicate::TYPE));
    assert_eq!(
        analysis.keywords,
        vec!["protein folding".to_string(), "graph neural networks".to_string()]
    );
    assert_eq!(analysis.highly_connected_entities.len(), 10);
    assert_eq!(
        analysis.highly_connected_entities[0].entity.as_str(),
        "https://doi.org/10.1234/pgn.2024"
    );

    let kinds: Vec<OpportunityKind> = OpportunityMiner::new()
        .mine(&analysis)
        .into_iter()
        .map(|o| o.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            OpportunityKind::DatasetReuse,
            OpportunityKind::ReproducibilityImprovement
        ]
    );
}
