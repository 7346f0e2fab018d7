// ABOUTME: FilteredTools - a read-only view restricting a ToolRegistry to
// ABOUTME: one subagent's allowlist, preserving the allowlist's order.

use std::sync::Arc;

use super::registry::definition_of;
use super::{Tool, ToolRegistry};
use crate::llm::ToolDefinition;

/// A filtered view of a [`ToolRegistry`].
///
/// Only names on the allowlist and present in the registry are visible.
/// Allowed names with no registered tool are reported by [`missing`](Self::missing).
#[derive(Clone)]
pub struct FilteredTools<'a> {
    source: &'a ToolRegistry,
    allowed: &'a [String],
}

impl<'a> FilteredTools<'a> {
    pub fn new(source: &'a ToolRegistry, allowed: &'a [String]) -> Self {
        Self { source, allowed }
    }

    /// Check if a tool name passes the filter.
    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.iter().any(|a| a == name)
    }

    /// Get a tool by name if it passes the filter.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        if !self.is_allowed(name) {
            return None;
        }
        self.source.get(name)
    }

    /// Names of visible tools, in allowlist order.
    pub fn names(&self) -> Vec<String> {
        self.allowed
            .iter()
            .filter(|name| self.source.get(name).is_some())
            .cloned()
            .collect()
    }

    /// Allowed names that have no registered tool.
    pub fn missing(&self) -> Vec<String> {
        self.allowed
            .iter()
            .filter(|name| self.source.get(name).is_none())
            .cloned()
            .collect()
    }

    /// Convert visible tools to LLM tool definitions, in allowlist order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.allowed
            .iter()
            .filter_map(|name| self.source.get(name))
            .map(|t| definition_of(t.as_ref()))
            .collect()
    }
}
