// ABOUTME: SubagentRegistry - the immutable name -> config map built at startup.
// ABOUTME: Loading is all-or-nothing per record; stats are derived on demand.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::SubagentConfig;
use super::parser::parse_record;
use super::source::ConfigSource;
use crate::domain::Domain;
use crate::error::{ConfigError, RegistryError};

/// Summary numbers for observability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub per_domain_count: BTreeMap<Domain, usize>,
    pub unique_tool_count: usize,
    pub avg_tools_per_subagent: f64,
}

/// Registry of subagent configurations.
///
/// Built once and read-only afterwards. To pick up changed records, load
/// a new registry and swap the `Arc` holding the old one; readers never
/// observe a half-updated map.
#[derive(Debug, Clone, Default)]
pub struct SubagentRegistry {
    agents: BTreeMap<String, Arc<SubagentConfig>>,
    rejected: Vec<ConfigError>,
}

impl SubagentRegistry {
    /// Load every record from the given sources.
    ///
    /// Later sources override earlier ones when names collide. Invalid
    /// records are skipped and kept in [`rejected`](Self::rejected); an
    /// unreadable source or unparseable frontmatter fails the whole load.
    pub fn load(sources: &[&dyn ConfigSource]) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        for source in sources {
            let location = source.location();
            let ids = source.enumerate().map_err(|e| RegistryError::Source {
                location: location.clone(),
                source: e,
            })?;

            for id in ids {
                let contents = source.read(&id).map_err(|e| RegistryError::Source {
                    location: format!("{}/{}", location, id),
                    source: e,
                })?;

                match parse_record(&id, &contents, domain_hint(&id))? {
                    Ok(config) => registry.insert(config),
                    Err(err) => {
                        warn!(error = %err, "rejected subagent record");
                        registry.rejected.push(err);
                    }
                }
            }
        }

        info!(
            loaded = registry.agents.len(),
            rejected = registry.rejected.len(),
            "subagent registry loaded"
        );
        Ok(registry)
    }

    /// Build a registry from configs constructed in code.
    ///
    /// Configs are validated exactly like loaded records.
    pub fn from_configs(configs: impl IntoIterator<Item = SubagentConfig>) -> Self {
        let mut registry = Self::default();
        for config in configs {
            match config.validate() {
                Ok(()) => registry.insert(config),
                Err(err) => registry.rejected.push(err),
            }
        }
        registry
    }

    fn insert(&mut self, config: SubagentConfig) {
        if let Some(previous) = self.agents.get(&config.name) {
            debug!(
                name = %config.name,
                previous = %previous.source_path,
                replacement = %config.source_path,
                "subagent overridden"
            );
        }
        self.agents.insert(config.name.clone(), Arc::new(config));
    }

    /// Get a subagent by name.
    pub fn get(&self, name: &str) -> Option<Arc<SubagentConfig>> {
        self.agents.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// All subagents, in name order.
    pub fn list_all(&self) -> Vec<Arc<SubagentConfig>> {
        self.agents.values().cloned().collect()
    }

    /// All subagent names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    /// Subagents serving a domain, in name order.
    pub fn for_domain(&self, domain: Domain) -> Vec<Arc<SubagentConfig>> {
        self.agents
            .values()
            .filter(|c| c.domain == domain)
            .cloned()
            .collect()
    }

    /// Records rejected during loading.
    pub fn rejected(&self) -> &[ConfigError] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut per_domain_count = BTreeMap::new();
        let mut tools = BTreeSet::new();
        let mut tool_total = 0usize;

        for config in self.agents.values() {
            *per_domain_count.entry(config.domain).or_insert(0) += 1;
            tool_total += config.allowed_tools.len();
            tools.extend(config.allowed_tools.iter().map(String::as_str));
        }

        let total = self.agents.len();
        RegistryStats {
            total,
            per_domain_count,
            unique_tool_count: tools.len(),
            avg_tools_per_subagent: if total == 0 {
                0.0
            } else {
                tool_total as f64 / total as f64
            },
        }
    }
}

/// A record id's first path component may name its domain.
fn domain_hint(id: &str) -> Option<Domain> {
    let (first, _) = id.split_once('/')?;
    first.parse().ok()
}
