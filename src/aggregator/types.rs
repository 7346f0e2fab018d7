// ABOUTME: Aggregation types - strategies, conflicts, and the combined result.
// ABOUTME: All serializable so callers can persist or forward them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How results from several subagents are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One coherent answer drawing on every result.
    #[default]
    Synthesis,
    /// Side-by-side view highlighting agreement and difference.
    Comparison,
    /// Deduplicated union of facts, grouped by topic.
    Consolidation,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Synthesis => "synthesis",
            Strategy::Comparison => "comparison",
            Strategy::Consolidation => "consolidation",
        }
    }

    pub(crate) fn instructions(&self) -> &'static str {
        match self {
            Strategy::Synthesis => {
                "Write one coherent answer to the original question that integrates every \
                 specialist's findings. Attribute figures to the specialist that produced them."
            }
            Strategy::Comparison => {
                "Compare the specialists' findings side by side. State where they agree, \
                 where they differ, and which differences matter for the original question."
            }
            Strategy::Consolidation => {
                "Merge the specialists' findings into a single deduplicated list of facts, \
                 grouped by topic. Keep every distinct fact exactly once."
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synthesis" => Ok(Strategy::Synthesis),
            "comparison" => Ok(Strategy::Comparison),
            "consolidation" => Ok(Strategy::Consolidation),
            other => Err(other.to_string()),
        }
    }
}

/// A disagreement between subagents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub issue: String,
    pub involved_subagents: Vec<String>,
    #[serde(default)]
    pub resolution: Option<String>,
}

/// Short per-subagent view of what it contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubagentSummary {
    pub summary: String,
    pub tools_used: Vec<String>,
    pub elapsed_ms: u64,
    pub success: bool,
}

/// Combined answer from several invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub synthesis: String,
    /// Subagents whose successful output fed the synthesis, in input order.
    pub sources: Vec<String>,
    pub per_subagent_summary: BTreeMap<String, SubagentSummary>,
    pub conflicts: Vec<Conflict>,
    pub confidence: f64,
    pub total_elapsed_ms: u64,
    pub strategy: Strategy,
    /// The model synthesis was not used (transport failure or nothing to
    /// synthesize).
    pub fallback: bool,
}
