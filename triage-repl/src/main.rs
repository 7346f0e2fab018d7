// ABOUTME: Interactive shell that classifies each line and runs it through
// ABOUTME: the triage Orchestrator, printing the route taken and the answer.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use triage::prelude::*;

/// Reports the current UTC time.
struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time in UTC, as RFC 3339 and as a Unix timestamp."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let now = chrono::Utc::now();
        Ok(ToolResult::json(&serde_json::json!({
            "utc": now.to_rfc3339(),
            "unix": now.timestamp(),
        })))
    }
}

fn load_config() -> Result<TriageConfig> {
    match std::env::args().nth(1) {
        Some(path) => Ok(TriageConfig::from_yaml_file(path)?),
        None => Ok(TriageConfig::from_env()?),
    }
}

fn print_classification(classification: &ClassificationResult) {
    println!(
        "[{} / {:?} -> {:?} {:?}, confidence {:.2}, via {:?}]",
        classification.domain,
        classification.complexity,
        classification.routing_decision,
        classification.required_subagents,
        classification.confidence,
        classification.method,
    );
}

fn print_outcome(outcome: &Outcome) {
    print_classification(outcome.classification());

    match outcome {
        Outcome::Direct { .. } => println!("\nNo subagent needed.\n"),
        Outcome::Delegated { result, .. } => {
            if !result.tools_used.is_empty() {
                println!("[tools: {}]", result.tools_used.join(", "));
            }
            match &result.error {
                Some(error) => println!("\n{} failed: {}\n", result.subagent, error),
                None => println!("\n{}\n", result.final_text),
            }
        }
        Outcome::MultiDomain { aggregated, .. } => {
            println!(
                "[{} via {}, confidence {:.2}{}]",
                aggregated.sources.join(", "),
                aggregated.strategy,
                aggregated.confidence,
                if aggregated.fallback { ", fallback" } else { "" }
            );
            println!("\n{}\n", aggregated.synthesis);
            for conflict in &aggregated.conflicts {
                println!("! {}", conflict.issue);
            }
        }
        Outcome::DeepResearch { report, .. } => {
            let parsed = &report.report;
            if parsed.executive_summary.is_empty() && parsed.findings.is_empty() {
                println!("\n{}\n", report.invocation.final_text);
                return;
            }
            println!("\n{}\n", parsed.executive_summary);
            for (i, finding) in parsed.findings.iter().enumerate() {
                let impact = finding
                    .impact
                    .map(|v| format!(" (impact {}%)", v))
                    .unwrap_or_default();
                println!("{}. {}{}", i + 1, finding.title, impact);
            }
            for rec in &parsed.recommendations {
                println!("-> [{:?}] {}", rec.priority, rec.action);
            }
            println!(
                "\nEvidence: {}/{} verified, {} conflicting\n",
                report.verification.verified,
                report.verification.total,
                report.verification.conflicting
            );
        }
    }
}

async fn run_repl(orchestrator: &Orchestrator) -> Result<()> {
    let mut history: Vec<Message> = Vec::new();
    let mut view: Option<String> = None;
    let mut rl = DefaultEditor::new()?;

    println!("Triage - ':agents' lists subagents, ':view <doctype>' sets context, 'quit' exits.\n");

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(_) => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        let _ = rl.add_history_entry(line);

        if line == ":agents" {
            for config in orchestrator.registry().list_all() {
                println!(
                    "{} [{}] {}: {}",
                    config.name,
                    config.domain,
                    config.allowed_tools.join(","),
                    config.description
                );
            }
            continue;
        }
        if let Some(doctype) = line.strip_prefix(":view") {
            let doctype = doctype.trim();
            view = (!doctype.is_empty()).then(|| doctype.to_string());
            println!("[context: {}]", view.as_deref().unwrap_or("none"));
            continue;
        }

        match orchestrator
            .handle(line, view.as_deref(), Some(history.as_slice()))
            .await
        {
            Ok(outcome) => {
                print_outcome(&outcome);
                history.push(Message::user(line));
                if let Some(answer) = outcome.answer() {
                    history.push(Message::assistant(answer));
                }
            }
            Err(e) => println!("Error: {}\n", e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    let registry = Arc::new(config.load_registry()?);
    let stats = registry.stats();
    tracing::info!(
        agents = stats.total,
        rejected = registry.rejected().len(),
        dir = %config.agents_dir.display(),
        "subagents loaded"
    );

    let tools = Arc::new(ToolRegistry::builder().register(CurrentTimeTool)?.build());
    let client: Arc<dyn LlmClient> = Arc::new(AnthropicClient::from_env()?);
    let orchestrator = Orchestrator::from_config(&config, registry, tools, client);

    run_repl(&orchestrator).await
}
