// ABOUTME: Implements ToolRegistry - the immutable set of tools shared by
// ABOUTME: every invocation. Built once, then only read.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Tool;
use crate::error::ToolError;
use crate::llm::ToolDefinition;

/// An immutable registry of tools, keyed by name.
///
/// Invocations share one registry behind an `Arc`; there is no way to add
/// or remove tools after [`ToolRegistryBuilder::build`].
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Start building a registry.
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// A registry with no tools.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool names, sorted alphabetically.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Convert all tools to LLM tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| definition_of(t.as_ref())).collect()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

/// Builder for [`ToolRegistry`]. Rejects duplicate tool names.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Register a tool.
    pub fn register<T: Tool + 'static>(self, tool: T) -> Result<Self, ToolError> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool from an Arc.
    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Result<Self, ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }
        self.tools.insert(name, tool);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

pub(crate) fn definition_of(tool: &dyn Tool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        input_schema: tool.schema(),
    }
}
