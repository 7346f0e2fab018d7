// ABOUTME: Shared fixtures for unit tests - a scripted transport, sample
// ABOUTME: subagent records, and a small tool set.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::Domain;
use crate::error::LlmError;
use crate::llm::{ContentBlock, LlmClient, Request, Response, StopReason, Usage};
use crate::registry::{MemorySource, SubagentRegistry};
use crate::tool::{Tool, ToolRegistry, ToolResult};

type Script = dyn Fn(usize, &Request) -> Result<Response, LlmError> + Send + Sync;

/// A transport whose replies are computed from the 1-based call number.
pub(crate) struct ScriptedClient {
    calls: AtomicUsize,
    requests: Mutex<Vec<Request>>,
    script: Box<Script>,
}

impl ScriptedClient {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(usize, &Request) -> Result<Response, LlmError> + Send + Sync + 'static,
    {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            script: Box::new(script),
        }
    }

    /// Always answer with the same text.
    pub(crate) fn text(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_, _| Ok(Response::from_text(reply.clone())))
    }

    /// Every call fails.
    pub(crate) fn failing() -> Self {
        Self::new(|_, _| Err(api_error()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(req.clone());
        (self.script)(call, req)
    }
}

pub(crate) fn api_error() -> LlmError {
    LlmError::Api {
        status: 529,
        message: "overloaded".into(),
    }
}

/// A reply containing some text and one tool call.
pub(crate) fn tool_call(id: &str, name: &str, input: serde_json::Value) -> Response {
    Response {
        id: format!("msg_{}", id),
        content: vec![
            ContentBlock::text(format!("Calling {}.", name)),
            ContentBlock::tool_use(id, name, input),
        ],
        stop_reason: StopReason::ToolUse,
        model: "test-model".into(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

/// Markdown record for a subagent.
pub(crate) fn agent_doc(name: &str, domain: Domain, tools: &[&str]) -> String {
    format!(
        "---\nname: {name}\ndescription: Handles {domain} requests\nmodel: test-model\ntools: [{}]\ndomain: {domain}\n---\nYou are the {name} subagent.\n",
        tools.join(", ")
    )
}

/// One subagent per specialized domain plus `deep-research`.
pub(crate) fn sample_source() -> MemorySource {
    MemorySource::new("fixtures")
        .record(
            "hospitality-ops.md",
            agent_doc("hospitality-ops", Domain::Hospitality, &["get_document", "lookup"]),
        )
        .record(
            "clinical-ops.md",
            agent_doc("clinical-ops", Domain::Healthcare, &["get_document", "lookup"]),
        )
        .record(
            "production-planner.md",
            agent_doc("production-planner", Domain::Manufacturing, &["lookup"]),
        )
        .record(
            "retail-analyst.md",
            agent_doc("retail-analyst", Domain::Retail, &["lookup", "run_report"]),
        )
        .record(
            "academic-admin.md",
            agent_doc("academic-admin", Domain::Education, &["lookup"]),
        )
        .record(
            "deep-research.md",
            agent_doc("deep-research", Domain::General, &["lookup", "run_report"]),
        )
}

pub(crate) fn sample_registry() -> Arc<SubagentRegistry> {
    Arc::new(SubagentRegistry::load(&[&sample_source()]).unwrap())
}

/// Echoes its `key` input back as `value:<key>`.
pub(crate) struct LookupTool;

#[async_trait]
impl Tool for LookupTool {
    fn name(&self) -> &str {
        "lookup"
    }

    fn description(&self) -> &str {
        "Look up a value by key"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"key": {"type": "string"}},
            "required": ["key"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let key = params["key"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing key"))?;
        Ok(ToolResult::text(format!("value:{}", key)))
    }
}

pub(crate) fn sample_tools() -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::builder().register(LookupTool).unwrap().build())
}
