// ABOUTME: ToolResult - what a tool hands back to the invoker, which relays
// ABOUTME: it to the model as a tool_result block.

use serde::Serialize;

/// Output of one tool execution.
///
/// An error result is still a normal return: the model sees the message
/// and may retry or change course. Reserve `Err` from `Tool::execute` for
/// failures the tool cannot describe itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Serialize `value` as the content. An unserializable value becomes
    /// an error result.
    pub fn json(value: &impl Serialize) -> Self {
        match serde_json::to_string(value) {
            Ok(content) => Self::text(content),
            Err(e) => Self::error(format!("unserializable tool output: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
        }
    }
}
