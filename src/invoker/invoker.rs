// ABOUTME: Invoker - executes a named subagent's think-act loop against the
// ABOUTME: transport, bounded by max_turns, emitting an event per step.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::event::{EventKind, InvocationEvent, InvocationResult};
use crate::llm::{ContentBlock, LlmClient, Message, Request, Role, ToolDefinition, Usage};
use crate::registry::{SubagentConfig, SubagentRegistry};
use crate::tool::{FilteredTools, ToolRegistry};

pub const DEFAULT_MAX_TURNS: u32 = 10;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// A finite stream of invocation events.
pub type EventStream = Pin<Box<dyn Stream<Item = InvocationEvent> + Send>>;

/// Where an invocation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    /// Resolving the subagent and its tools.
    Init,
    /// Waiting on the transport for the next turn.
    RequestingCompletion,
    /// The model stopped asking for tools.
    Completed,
    /// The turn bound was hit while tools were still requested.
    MaxTurnsReached,
    /// Unknown subagent or transport failure.
    Failed,
}

/// Runs subagents by name.
///
/// Holds only shared, read-only collaborators, so one invoker can serve
/// any number of concurrent invocations.
pub struct Invoker {
    registry: Arc<SubagentRegistry>,
    tools: Arc<ToolRegistry>,
    client: Arc<dyn LlmClient>,
    max_turns: u32,
    max_tokens: u32,
}

impl Invoker {
    pub fn new(
        registry: Arc<SubagentRegistry>,
        tools: Arc<ToolRegistry>,
        client: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            registry,
            tools,
            client,
            max_turns: DEFAULT_MAX_TURNS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the maximum number of transport calls per invocation.
    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set the per-call token budget.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn registry(&self) -> &Arc<SubagentRegistry> {
        &self.registry
    }

    /// Run a subagent to completion and fold its trace into a result.
    pub async fn run(
        &self,
        subagent: &str,
        task: &str,
        context: Option<&serde_json::Value>,
    ) -> InvocationResult {
        let invocation_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let trace: Vec<InvocationEvent> = self.stream(subagent, task, context).collect().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = InvocationResult::from_trace(invocation_id, subagent, task, trace, elapsed_ms);
        info!(
            invocation_id = %result.invocation_id,
            subagent,
            success = result.success,
            turns = result.turns,
            truncated = result.truncated,
            elapsed_ms,
            "invocation finished"
        );
        result
    }

    /// Run a subagent, yielding events as they happen.
    ///
    /// The stream owns everything it needs and ends after exactly one
    /// terminal event (`Complete` or `Error`).
    pub fn stream(
        &self,
        subagent: &str,
        task: &str,
        context: Option<&serde_json::Value>,
    ) -> EventStream {
        let registry = self.registry.clone();
        let tools = self.tools.clone();
        let client = self.client.clone();
        let max_turns = self.max_turns;
        let max_tokens = self.max_tokens;
        let name = subagent.to_string();
        let opening = task_message(task, context);

        Box::pin(async_stream::stream! {
            let mut state = InvocationState::Init;
            let mut config: Option<Arc<SubagentConfig>> = None;
            let mut definitions: Vec<ToolDefinition> = Vec::new();
            let mut messages = vec![Message::user(opening)];
            let mut usage = Usage::default();
            let mut turns: u32 = 0;

            loop {
                match state {
                    InvocationState::Init => match registry.get(&name) {
                        Some(found) => {
                            let view = FilteredTools::new(&tools, &found.allowed_tools);
                            let missing = view.missing();
                            if !missing.is_empty() {
                                warn!(subagent = %name, ?missing, "allowed tools are not registered");
                            }
                            definitions = view.definitions();
                            config = Some(found);
                            state = InvocationState::RequestingCompletion;
                        }
                        None => {
                            warn!(subagent = %name, "unknown subagent");
                            yield InvocationEvent::new(EventKind::Error {
                                message: format!("unknown subagent: {}", name),
                                turns,
                                usage,
                            });
                            state = InvocationState::Failed;
                        }
                    },

                    InvocationState::RequestingCompletion => {
                        let Some(config) = config.as_ref() else {
                            state = InvocationState::Failed;
                            continue;
                        };
                        if turns >= max_turns {
                            state = InvocationState::MaxTurnsReached;
                            continue;
                        }
                        turns += 1;
                        debug!(subagent = %name, turn = turns, "requesting completion");

                        let request = Request::new(&config.model)
                            .system(&config.system_prompt)
                            .messages(messages.clone())
                            .tools(definitions.clone())
                            .max_tokens(max_tokens);

                        let response = match client.create_message(&request).await {
                            Ok(response) => response,
                            Err(e) => {
                                warn!(subagent = %name, turn = turns, error = %e, "transport failed");
                                yield InvocationEvent::new(EventKind::Error {
                                    message: e.to_string(),
                                    turns,
                                    usage,
                                });
                                state = InvocationState::Failed;
                                continue;
                            }
                        };
                        usage.accumulate(&response.usage);
                        let wants_tools = response.has_tool_use();

                        let mut results = Vec::new();
                        for block in &response.content {
                            match block {
                                ContentBlock::Text { text } if !text.is_empty() => {
                                    yield InvocationEvent::new(EventKind::Text { text: text.clone() });
                                }
                                ContentBlock::ToolUse { id, name: tool, input } => {
                                    yield InvocationEvent::new(EventKind::ToolRequest {
                                        id: id.clone(),
                                        name: tool.clone(),
                                        input: input.clone(),
                                    });
                                    let view = FilteredTools::new(&tools, &config.allowed_tools);
                                    let (content, is_error) = execute_tool(&view, tool, input).await;
                                    yield InvocationEvent::new(EventKind::ToolResult {
                                        id: id.clone(),
                                        name: tool.clone(),
                                        content: content.clone(),
                                        is_error,
                                    });
                                    results.push(if is_error {
                                        ContentBlock::tool_error(id, content)
                                    } else {
                                        ContentBlock::tool_result(id, content)
                                    });
                                }
                                _ => {}
                            }
                        }

                        if !wants_tools {
                            yield InvocationEvent::new(EventKind::Complete {
                                turns,
                                truncated: false,
                                usage,
                            });
                            state = InvocationState::Completed;
                        } else {
                            messages.push(Message {
                                role: Role::Assistant,
                                content: response.content,
                            });
                            messages.push(Message::tool_results(results));
                        }
                    }

                    InvocationState::MaxTurnsReached => {
                        info!(subagent = %name, max_turns, "turn bound reached");
                        yield InvocationEvent::new(EventKind::Complete {
                            turns,
                            truncated: true,
                            usage,
                        });
                        break;
                    }

                    InvocationState::Completed | InvocationState::Failed => break,
                }
            }
        })
    }
}

/// Execute one tool call. Failures of any kind become error content.
async fn execute_tool(
    view: &FilteredTools<'_>,
    name: &str,
    input: &serde_json::Value,
) -> (String, bool) {
    match view.get(name) {
        Some(tool) => match tool.execute(input.clone()).await {
            Ok(result) => (result.content, result.is_error),
            Err(e) => (format!("Tool '{}' failed: {}", name, e), true),
        },
        None if view.is_allowed(name) => (format!("Tool '{}' is not registered", name), true),
        None => (format!("Tool '{}' is not allowed for this subagent", name), true),
    }
}

/// The first user message: pretty-printed context, then the task.
fn task_message(task: &str, context: Option<&serde_json::Value>) -> String {
    match context {
        Some(context) => {
            let rendered =
                serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
            format!("Context:\n```json\n{}\n```\n\n{}", rendered, task)
        }
        None => task.to_string(),
    }
}
