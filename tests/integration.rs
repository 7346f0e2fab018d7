// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Loads subagents from a temp directory and drives the Orchestrator end to end.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use triage::prelude::*;

/// A transport that replays canned responses in order.
struct MockClient {
    responses: Mutex<VecDeque<Result<Response, LlmError>>>,
    calls: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<Response, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    async fn create_message(&self, _req: &Request) -> Result<Response, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 500,
                    message: "no scripted response left".into(),
                })
            })
    }
}

/// A test tool returning a fixed stock count.
struct StockTool;

#[async_trait::async_trait]
impl Tool for StockTool {
    fn name(&self) -> &str {
        "stock_level"
    }

    fn description(&self) -> &str {
        "Current stock level for an item"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"item": {"type": "string"}},
            "required": ["item"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let item = params["item"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing item parameter"))?;
        Ok(ToolResult::text(format!("{}: 42 units", item)))
    }
}

fn write_agents(dir: &std::path::Path) {
    let agents = [
        ("retail", "store-analyst", "retail", "stock_level"),
        ("healthcare", "clinic-ops", "healthcare", "stock_level"),
        ("general", "deep-research", "general", "stock_level"),
    ];
    for (folder, name, domain, tools) in agents {
        let folder = dir.join(folder);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(
            folder.join(format!("{}.md", name)),
            format!(
                "---\nname: {name}\ndescription: {name} specialist\nmodel: test-model\ntools: {tools}\ndomain: {domain}\n---\nYou are {name}.\n"
            ),
        )
        .unwrap();
    }
    std::fs::write(dir.join("broken.md"), "no frontmatter here").unwrap();
}

fn setup(client: Arc<MockClient>) -> (tempfile::TempDir, Orchestrator) {
    let temp = tempfile::tempdir().unwrap();
    write_agents(temp.path());

    let config = TriageConfig {
        agents_dir: temp.path().to_path_buf(),
        ..TriageConfig::default()
    };
    let registry = Arc::new(config.load_registry().unwrap());
    let tools = Arc::new(ToolRegistry::builder().register(StockTool).unwrap().build());
    let client: Arc<dyn LlmClient> = client;

    let orchestrator = Orchestrator::from_config(&config, registry, tools, client);
    (temp, orchestrator)
}

#[tokio::test]
async fn test_registry_loads_from_directory() {
    let (_temp, orchestrator) = setup(Arc::new(MockClient::new(vec![])));
    let registry = orchestrator.registry();

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.rejected().len(), 1);
    assert_eq!(registry.for_domain(Domain::Retail)[0].name, "store-analyst");
}

#[tokio::test]
async fn test_invoice_lookup_answers_directly() {
    // Classifier transport fails, so the pattern classifier decides.
    let client = Arc::new(MockClient::new(vec![]));
    let (_temp, orchestrator) = setup(client.clone());

    let outcome = orchestrator
        .handle("Show Invoice INV-001", None, None)
        .await
        .unwrap();

    let classification = outcome.classification();
    assert_eq!(classification.domain, Domain::General);
    assert_eq!(classification.complexity, Complexity::Simple);
    assert_eq!(classification.routing_decision, RoutingDecision::Direct);
    assert!(classification.required_subagents.is_empty());
    assert!(matches!(outcome, Outcome::Direct { .. }));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_wait_time_question_runs_deep_research() {
    let report = "## Executive Summary\nWaits rose with staffing gaps.\n\n\
                  ## Findings\n1. Primary cause: physician shortage (Impact: 55%, Confidence: 80%)\n\n\
                  ## Evidence Trail\n- Practitioner roster: two departures ✓\n";
    let client = Arc::new(MockClient::new(vec![
        Err(LlmError::Api {
            status: 529,
            message: "overloaded".into(),
        }),
        Ok(Response::from_text(report)),
    ]));
    let (_temp, orchestrator) = setup(client.clone());

    let outcome = orchestrator
        .handle("Why did patient wait times increase last quarter?", None, None)
        .await
        .unwrap();

    let classification = outcome.classification();
    assert_eq!(classification.complexity, Complexity::DeepResearch);
    assert_eq!(classification.routing_decision, RoutingDecision::DeepResearch);
    assert_eq!(classification.required_subagents, vec![DEEP_RESEARCH_SUBAGENT]);

    let Outcome::DeepResearch { report, .. } = outcome else {
        panic!("expected a research outcome");
    };
    assert!(report.success);
    assert_eq!(report.report.findings[0].impact, Some(55.0));
    assert_eq!(report.verification.verified, 1);
    assert_eq!(report.verification.ratio, 1.0);
}

#[tokio::test]
async fn test_delegated_subagent_uses_tools() {
    let verdict = r#"{"domain": "retail", "complexity": "multi_step",
        "required_subagents": ["store-analyst"], "confidence": 0.8,
        "reasoning": "inventory", "routing_decision": "delegate"}"#;
    let tool_turn = Response {
        id: "msg_1".into(),
        content: vec![ContentBlock::tool_use(
            "t1",
            "stock_level",
            serde_json::json!({"item": "SKU-9"}),
        )],
        stop_reason: StopReason::ToolUse,
        model: "test-model".into(),
        usage: Usage::default(),
    };
    let client = Arc::new(MockClient::new(vec![
        Ok(Response::from_text(verdict)),
        Ok(tool_turn),
        Ok(Response::from_text("SKU-9 has 42 units on hand.")),
    ]));
    let (_temp, orchestrator) = setup(client.clone());

    let outcome = orchestrator
        .handle("Check stock for SKU-9 and reorder if low", None, None)
        .await
        .unwrap();

    let Outcome::Delegated { result, .. } = &outcome else {
        panic!("expected delegation, got {:?}", outcome);
    };
    assert!(result.success);
    assert_eq!(result.tools_used, vec!["stock_level"]);
    assert_eq!(result.turns, 2);
    assert!(result.event_trace.iter().any(|e| matches!(
        &e.kind,
        EventKind::ToolResult { content, is_error: false, .. } if content == "SKU-9: 42 units"
    )));
    assert_eq!(outcome.answer(), Some("SKU-9 has 42 units on hand."));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_unknown_delegate_from_model_is_dropped() {
    // The model names a subagent that does not exist; normalization
    // drops it and the request degrades to a direct answer.
    let verdict = r#"{"domain": "retail", "complexity": "multi_step",
        "required_subagents": ["ghost"], "confidence": 0.8,
        "reasoning": "", "routing_decision": "delegate"}"#;
    let client = Arc::new(MockClient::new(vec![Ok(Response::from_text(verdict))]));
    let (_temp, orchestrator) = setup(client.clone());

    let outcome = orchestrator
        .handle("Check stock for SKU-9", None, None)
        .await
        .unwrap();

    assert!(outcome.classification().is_consistent());
    assert_eq!(client.calls(), 1);
}
