// ABOUTME: TriageConfig - runtime settings for the orchestration layer.
// ABOUTME: Loaded from YAML or TRIAGE_* environment variables over defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregator::{Strategy, DEFAULT_CONFLICT_THRESHOLD, DEFAULT_SYNTHESIS_MODEL};
use crate::classifier::DEEP_RESEARCH_SUBAGENT;
use crate::error::{RegistryError, SettingsError};
use crate::invoker::{DEFAULT_MAX_TOKENS, DEFAULT_MAX_TURNS};
use crate::registry::{DirectorySource, SubagentRegistry};

/// Settings for the classifier, invoker, aggregator, and research driver.
///
/// Every field has a default, so a YAML file only needs the keys it
/// changes. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Directory of subagent records.
    pub agents_dir: PathBuf,
    pub classifier_model: String,
    pub synthesis_model: String,
    /// Transport calls allowed per invocation.
    pub max_turns: u32,
    pub max_tokens: u32,
    /// Relative spread above which numeric figures conflict.
    pub conflict_threshold: f64,
    pub research_subagent: String,
    pub default_strategy: Strategy,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            agents_dir: PathBuf::from(".claude/agents"),
            classifier_model: DEFAULT_SYNTHESIS_MODEL.to_string(),
            synthesis_model: DEFAULT_SYNTHESIS_MODEL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            max_tokens: DEFAULT_MAX_TOKENS,
            conflict_threshold: DEFAULT_CONFLICT_THRESHOLD,
            research_subagent: DEEP_RESEARCH_SUBAGENT.to_string(),
            default_strategy: Strategy::default(),
        }
    }
}

impl TriageConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Defaults overridden by `TRIAGE_*` environment variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `TRIAGE_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("TRIAGE_AGENTS_DIR") {
            config.agents_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup("TRIAGE_CLASSIFIER_MODEL") {
            config.classifier_model = model;
        }
        if let Some(model) = lookup("TRIAGE_SYNTHESIS_MODEL") {
            config.synthesis_model = model;
        }
        if let Some(name) = lookup("TRIAGE_RESEARCH_SUBAGENT") {
            config.research_subagent = name;
        }
        if let Some(raw) = lookup("TRIAGE_MAX_TURNS") {
            config.max_turns = parse_setting("TRIAGE_MAX_TURNS", &raw)?;
        }
        if let Some(raw) = lookup("TRIAGE_MAX_TOKENS") {
            config.max_tokens = parse_setting("TRIAGE_MAX_TOKENS", &raw)?;
        }
        if let Some(raw) = lookup("TRIAGE_CONFLICT_THRESHOLD") {
            config.conflict_threshold = parse_setting("TRIAGE_CONFLICT_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("TRIAGE_DEFAULT_STRATEGY") {
            config.default_strategy = parse_setting("TRIAGE_DEFAULT_STRATEGY", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_turns == 0 {
            return Err(invalid("max_turns", self.max_turns));
        }
        if self.max_tokens == 0 {
            return Err(invalid("max_tokens", self.max_tokens));
        }
        if !self.conflict_threshold.is_finite() || self.conflict_threshold < 0.0 {
            return Err(invalid("conflict_threshold", self.conflict_threshold));
        }
        if self.research_subagent.trim().is_empty() {
            return Err(invalid("research_subagent", "\"\""));
        }
        Ok(())
    }

    /// Load the subagent registry from `agents_dir`.
    pub fn load_registry(&self) -> Result<SubagentRegistry, RegistryError> {
        SubagentRegistry::load(&[&DirectorySource::new(&self.agents_dir)])
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, SettingsError> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}

fn invalid(key: &str, value: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}
