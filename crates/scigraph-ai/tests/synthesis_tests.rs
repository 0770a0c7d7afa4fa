use async_trait::async_trait;
use scigraph_ai::{
    Feasibility, GenerationConfig, GenerationMethod, HypothesisEngine, HypothesisSynthesizer,
    LLMProvider, LLMResponse, LLMResult, Message, MessageRole, ReportRequest,
};
use scigraph_graph::{
    GraphBuilder, GraphFormat, OpportunityKind, OpportunityMiner, PaperMetadata, PatternAnalyzer,
    ReproducibilityAssessment, StatementStore,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

enum Behaviour {
    Reply(String),
    Fail,
    Hang,
}

struct StubProvider {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl StubProvider {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    fn reply(text: impl Into<String>) -> Arc<Self> {
        Self::new(Behaviour::Reply(text.into()))
    }
}

#[async_trait]
impl LLMProvider for StubProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        _config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[1].content.contains("RESEARCH OPPORTUNITIES"));
        match &self.behaviour {
            Behaviour::Reply(text) => Ok(LLMResponse::text(text.clone(), "stub-model")),
            Behaviour::Fail => Err(anyhow::anyhow!("connection refused")),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(LLMResponse::text("[]", "stub-model"))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

/// One paper using Alpha and Beta, assessed at 0.4.
fn alpha_beta_store() -> StatementStore {
    let mut builder = GraphBuilder::new();
    let paper = builder.add_paper_metadata(&PaperMetadata::from_value(&json!({
        "title": "Alpha meets Beta",
        "tools": ["Alpha", "Beta"],
        "datasets": ["Gamma Set"]
    })));
    builder.add_paper_metadata(&PaperMetadata::from_value(&json!({
        "title": "Only Alpha",
        "tools": ["Alpha"]
    })));
    builder.add_paper_metadata(&PaperMetadata::from_value(&json!({
        "title": "Only Beta",
        "tools": ["Beta"]
    })));
    builder.add_reproducibility_assessment(
        &ReproducibilityAssessment::from_value(&json!({
            "repository_url": "https://github.com/lab/alpha-beta",
            "reproducibility_score": 0.4
        })),
        Some(&paper),
    );
    builder.into_store()
}

fn separate_tools_store() -> StatementStore {
    let mut builder = GraphBuilder::new();
    let paper = builder.add_paper_metadata(&PaperMetadata::from_value(&json!({
        "title": "Alpha study",
        "tools": ["Alpha"]
    })));
    builder.add_paper_metadata(&PaperMetadata::from_value(&json!({
        "title": "Beta study",
        "tools": ["Beta"]
    })));
    builder.add_reproducibility_assessment(
        &ReproducibilityAssessment::from_value(&json!({
            "repository_url": "https://github.com/lab/alpha",
            "reproducibility_score": 0.4
        })),
        Some(&paper),
    );
    builder.into_store()
}

fn backend_reply(n: usize) -> String {
    let items: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "hypothesis": format!("Backend hypothesis {}", i),
                "rationale": "r",
                "methodology": "m",
                "required_resources": ["GPU"],
                "expected_impact": "i",
                "feasibility": if i % 2 == 0 { "High" } else { "low" },
                "novelty_score": 0.9
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

async fn synthesize_with(
    backend: Arc<StubProvider>,
    timeout: Duration,
    count: usize,
) -> scigraph_ai::Synthesis {
    let store = separate_tools_store();
    let analysis = PatternAnalyzer::new(&store).analyze();
    let opportunities = OpportunityMiner::new().mine(&analysis);
    HypothesisSynthesizer::with_backend(backend, timeout)
        .synthesize(&analysis, &opportunities, count, Some("bioinformatics"))
        .await
}

#[tokio::test]
async fn test_backend_output_is_used() {
    let stub = StubProvider::reply(backend_reply(5));
    let synthesis = synthesize_with(stub.clone(), Duration::from_secs(5), 3).await;

    assert_eq!(synthesis.method, GenerationMethod::Backend);
    assert_eq!(synthesis.hypotheses.len(), 3);
    assert_eq!(synthesis.hypotheses[0].hypothesis, "Backend hypothesis 0");
    assert_eq!(synthesis.hypotheses[0].feasibility, Feasibility::High);
    assert_eq!(synthesis.hypotheses[1].feasibility, Feasibility::Low);
    assert_eq!(synthesis.backend.unwrap().provider, "stub");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_short_backend_output_is_padded() {
    let reply = json!([
        {"hypothesis": "Only one usable"},
        {"rationale": "no hypothesis text"}
    ])
    .to_string();
    let synthesis = synthesize_with(StubProvider::reply(reply), Duration::from_secs(5), 4).await;

    assert_eq!(synthesis.method, GenerationMethod::Hybrid);
    assert_eq!(synthesis.hypotheses.len(), 4);
    assert_eq!(synthesis.hypotheses[0].hypothesis, "Only one usable");
    assert_eq!(synthesis.hypotheses[0].novelty_score, 0.5);
    assert!(synthesis.hypotheses[1..]
        .iter()
        .all(|h| !h.hypothesis.starts_with("Only one")));
}

#[tokio::test]
async fn test_backend_failures_fall_back_to_templates() {
    let replies = [
        Behaviour::Reply("Sure! Here are some hypotheses: [...]".to_string()),
        Behaviour::Reply(json!({"hypothesis": "an object, not an array"}).to_string()),
        Behaviour::Reply("```json\n[{\"hypothesis\": \"fenced\"}]\n```".to_string()),
        Behaviour::Reply("[]".to_string()),
        Behaviour::Fail,
    ];
    for behaviour in replies {
        let synthesis =
            synthesize_with(StubProvider::new(behaviour), Duration::from_secs(5), 3).await;
        assert_eq!(synthesis.method, GenerationMethod::Template);
        assert_eq!(synthesis.hypotheses.len(), 3);
        assert!(synthesis.backend.is_none());
        assert_eq!(
            synthesis.hypotheses[0].hypothesis,
            "Combining Alpha and Beta will improve research outcomes"
        );
    }
}

#[tokio::test]
async fn test_hanging_backend_times_out() {
    let started = std::time::Instant::now();
    let synthesis = synthesize_with(
        StubProvider::new(Behaviour::Hang),
        Duration::from_millis(50),
        2,
    )
    .await;
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(synthesis.method, GenerationMethod::Template);
    assert_eq!(synthesis.hypotheses.len(), 2);
}

#[tokio::test]
async fn test_end_to_end_template_report() {
    let store = alpha_beta_store();
    let request = ReportRequest {
        num_hypotheses: 7,
        focus_area: None,
    };
    let report = HypothesisEngine::default()
        .generate_report(&store, &request)
        .await;

    assert_eq!(report.generation_method, GenerationMethod::Template);
    assert_eq!(report.generated_hypotheses.len(), 7);
    assert_eq!(report.summary.total_hypotheses, 7);

    let kinds: Vec<_> = report.research_opportunities.iter().map(|o| o.kind).collect();
    assert!(kinds.contains(&OpportunityKind::ReproducibilityImprovement));
    assert!(kinds.contains(&OpportunityKind::DatasetReuse));
    // Alpha and Beta share a paper here, so they are not a combination gap.
    assert!(!kinds.contains(&OpportunityKind::ToolCombination));

    let distribution = report.summary.feasibility_distribution;
    assert_eq!(distribution.high + distribution.medium + distribution.low, 7);
    assert_eq!(report.graph_analysis.popular_tools["Alpha"], 2);
}

#[tokio::test]
async fn test_end_to_end_alpha_beta_gap() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.nt");
    separate_tools_store()
        .save(&path, GraphFormat::NTriples)
        .unwrap();

    let request = ReportRequest {
        num_hypotheses: 4,
        focus_area: Some("genomics".to_string()),
    };
    let report = HypothesisEngine::default()
        .generate_report_from_file(&path, &request)
        .await
        .unwrap();

    let pair = report
        .research_opportunities
        .iter()
        .find_map(|o| o.tools())
        .unwrap();
    assert_eq!(pair, ("Alpha", "Beta"));
    assert!(report
        .research_opportunities
        .iter()
        .any(|o| o.kind == OpportunityKind::ReproducibilityImprovement));
    assert_eq!(report.generated_hypotheses.len(), 4);
    assert_eq!(report.focus_area.as_deref(), Some("genomics"));
    assert_eq!(report.source_graph, Some(path.display().to_string()));
    assert!(report
        .knowledge_gaps
        .contains(&"Low reproducibility of existing research artifacts".to_string()));
}

#[tokio::test]
async fn test_unreadable_graph_is_reported() {
    let dir = TempDir::new().unwrap();
    let result = HypothesisEngine::default()
        .generate_report_from_file(&dir.path().join("missing.json"), &ReportRequest::default())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_graph_still_produces_report() {
    let report = HypothesisEngine::default()
        .generate_report(&StatementStore::new(), &ReportRequest::default())
        .await;
    assert!(report.research_opportunities.is_empty());
    assert!(report.graph_analysis.highly_connected_entities.is_empty());
    assert_eq!(report.generated_hypotheses.len(), 5);
}
