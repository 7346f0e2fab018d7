// ABOUTME: Event trace types - what happened during one invocation, in order,
// ABOUTME: and the summary result folded from a finished trace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::Usage;

/// One entry in an invocation's append-only event trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl InvocationEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Whether this event ends the trace.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Complete { .. } | EventKind::Error { .. })
    }
}

/// What an event records.
///
/// `Complete` and `Error` are terminal and carry the totals for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Text {
        text: String,
    },
    ToolRequest {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        id: String,
        name: String,
        content: String,
        is_error: bool,
    },
    Error {
        message: String,
        turns: u32,
        usage: Usage,
    },
    Complete {
        turns: u32,
        /// The turn bound stopped the loop while tools were still requested.
        truncated: bool,
        usage: Usage,
    },
}

/// Summary of a finished invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    pub invocation_id: String,
    pub subagent: String,
    pub task: String,
    pub event_trace: Vec<InvocationEvent>,
    /// Text events joined by newlines.
    pub final_text: String,
    /// Tool names in first-use order, without repeats.
    pub tools_used: Vec<String>,
    pub success: bool,
    /// Set exactly when `success` is false.
    pub error: Option<String>,
    pub elapsed_ms: u64,
    /// Transport calls made.
    pub turns: u32,
    pub truncated: bool,
    pub usage: Usage,
}

impl InvocationResult {
    /// Fold a finished trace into a result.
    ///
    /// A trace that does not end in `Complete` is a failure; a trace with no
    /// terminal event at all (a dropped stream) gets a generic error.
    pub fn from_trace(
        invocation_id: impl Into<String>,
        subagent: impl Into<String>,
        task: impl Into<String>,
        event_trace: Vec<InvocationEvent>,
        elapsed_ms: u64,
    ) -> Self {
        let mut texts = Vec::new();
        let mut tools_used: Vec<String> = Vec::new();
        for event in &event_trace {
            match &event.kind {
                EventKind::Text { text } => texts.push(text.as_str()),
                EventKind::ToolRequest { name, .. } => {
                    if !tools_used.contains(name) {
                        tools_used.push(name.clone());
                    }
                }
                _ => {}
            }
        }

        let (success, error, turns, truncated, usage) =
            match event_trace.last().map(|e| &e.kind) {
                Some(EventKind::Complete {
                    turns,
                    truncated,
                    usage,
                }) => (true, None, *turns, *truncated, *usage),
                Some(EventKind::Error {
                    message,
                    turns,
                    usage,
                }) => (false, Some(message.clone()), *turns, false, *usage),
                _ => (
                    false,
                    Some("invocation ended without a terminal event".to_string()),
                    0,
                    false,
                    Usage::default(),
                ),
            };

        Self {
            invocation_id: invocation_id.into(),
            subagent: subagent.into(),
            task: task.into(),
            final_text: texts.join("\n"),
            event_trace,
            tools_used,
            success,
            error,
            elapsed_ms,
            turns,
            truncated,
            usage,
        }
    }

    /// Number of `ToolRequest` events.
    pub fn tool_call_count(&self) -> usize {
        self.event_trace
            .iter()
            .filter(|e| matches!(e.kind, EventKind::ToolRequest { .. }))
            .count()
    }
}
