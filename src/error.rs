// ABOUTME: Defines all error types for the triage library using thiserror.
// ABOUTME: Per-concern enums (LLM, tool, config, registry) unified under TriageError.

use std::path::PathBuf;

/// Top-level error type for the triage library.
///
/// Only registry loading and unknown subagent names surface as hard
/// failures to callers; transport and parse problems are absorbed into
/// `success` flags and confidence scores by the components that hit them.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Unknown subagent: {0}")]
    UnknownSubagent(String),
}

/// Errors from LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors from building a tool registry.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Duplicate tool name: {0}")]
    Duplicate(String),
}

/// A single subagent record that failed validation.
///
/// Record-level problems reject only the offending record; the rest of
/// the load continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{record}: missing frontmatter block")]
    MissingFrontmatter { record: String },

    #[error("{record}: missing or empty field `{field}`")]
    MissingField { record: String, field: &'static str },

    #[error("{record}: at least one allowed tool is required")]
    NoTools { record: String },

    #[error("{record}: unknown domain `{domain}`")]
    UnknownDomain { record: String, domain: String },
}

impl ConfigError {
    /// The record this error refers to.
    pub fn record(&self) -> &str {
        match self {
            Self::MissingFrontmatter { record }
            | Self::MissingField { record, .. }
            | Self::NoTools { record }
            | Self::UnknownDomain { record, .. } => record,
        }
    }
}

/// Errors that abort a whole registry load.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("cannot read source {location}: {source}")]
    Source {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt frontmatter in {record}: {source}")]
    Corrupt {
        record: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors from loading `TriageConfig`.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    Syntax(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}
