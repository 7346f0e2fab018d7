// ABOUTME: SubagentConfig - one worker's prompt, tool allowlist, and model binding.
// ABOUTME: Validation enforces the non-empty fields a usable subagent needs.

use serde::Serialize;

use crate::domain::Domain;
use crate::error::ConfigError;

/// Configuration of a subagent that can be invoked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubagentConfig {
    /// Unique identifier used for routing and invocation.
    pub name: String,

    /// Free text shown to the classifier when routing.
    pub description: String,

    /// Domain this subagent serves.
    pub domain: Domain,

    /// Tools this subagent may call, in declaration order, without duplicates.
    pub allowed_tools: Vec<String>,

    /// Model identifier passed to the transport.
    pub model: String,

    /// System prompt for every turn of an invocation.
    pub system_prompt: String,

    /// Where this configuration was loaded from. Provenance only.
    pub source_path: String,
}

impl SubagentConfig {
    /// Create a config with required fields; everything else via builders.
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            domain: Domain::General,
            allowed_tools: Vec::new(),
            model: String::new(),
            system_prompt: system_prompt.into(),
            source_path: String::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the tool allowlist. Duplicates and blank names are dropped.
    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools.clear();
        for tool in tools {
            let tool = tool.into().trim().to_string();
            if !tool.is_empty() && !self.allowed_tools.contains(&tool) {
                self.allowed_tools.push(tool);
            }
        }
        self
    }

    pub fn source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Check the invariants every registered subagent must satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let record = if self.source_path.is_empty() {
            self.name.clone()
        } else {
            self.source_path.clone()
        };
        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("model", &self.model),
            ("system_prompt", &self.system_prompt),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField { record, field });
            }
        }
        if self.allowed_tools.is_empty() {
            return Err(ConfigError::NoTools { record });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SubagentConfig {
        SubagentConfig::new("patient-intake", "You register patients.")
            .description("Handles patient registration")
            .domain(Domain::Healthcare)
            .model("claude-sonnet-4-20250514")
            .tools(["get_document", "create_document"])
    }

    #[test]
    fn test_builder_dedupes_tools() {
        let config = valid().tools(["get_document", " get_document ", "", "list_documents"]);
        assert_eq!(config.allowed_tools, vec!["get_document", "list_documents"]);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_prompt() {
        let mut config = valid();
        config.system_prompt = "   ".into();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingField {
                record: "patient-intake".into(),
                field: "system_prompt"
            })
        );
    }

    #[test]
    fn test_validate_rejects_no_tools() {
        let config = valid().tools(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(ConfigError::NoTools { .. })));
    }
}
