// ABOUTME: Tests for ToolRegistry - building, lookup, duplicates, definitions.
// ABOUTME: Uses a mock tool for testing.

use super::*;
use crate::error::ToolError;

/// A simple test tool.
struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes input back"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let message = params["message"].as_str().unwrap_or("");
        Ok(ToolResult::text(message))
    }
}

#[test]
fn test_register_and_get() {
    let registry = ToolRegistry::builder().register(EchoTool).unwrap().build();

    let tool = registry.get("echo");
    assert!(tool.is_some());
    assert_eq!(tool.unwrap().name(), "echo");
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_get_nonexistent() {
    let registry = ToolRegistry::empty();
    assert!(registry.get("nonexistent").is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_rejected() {
    let result = ToolRegistry::builder()
        .register(EchoTool)
        .unwrap()
        .register(EchoTool);

    assert!(matches!(result, Err(ToolError::Duplicate(name)) if name == "echo"));
}

#[test]
fn test_definitions() {
    let registry = ToolRegistry::builder().register(EchoTool).unwrap().build();

    let defs = registry.definitions();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "echo");
    assert_eq!(defs[0].description, "Echoes input back");
}

#[tokio::test]
async fn test_execute_through_registry() {
    let registry = ToolRegistry::builder().register(EchoTool).unwrap().build();
    let tool = registry.get("echo").unwrap();

    let result = tool
        .execute(serde_json::json!({"message": "hi"}))
        .await
        .unwrap();
    assert_eq!(result.content, "hi");
}
