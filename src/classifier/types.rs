// ABOUTME: Classification result types - complexity tiers, routing decisions,
// ABOUTME: and the result record with its routing invariants.

use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// Name of the subagent every deep-research route targets.
pub const DEEP_RESEARCH_SUBAGENT: &str = "deep-research";

/// How much work a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    #[serde(alias = "multi-step")]
    MultiStep,
    #[serde(alias = "deep-research")]
    DeepResearch,
}

/// Where a request gets dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Answer without any subagent.
    Direct,
    /// Hand off to exactly one subagent.
    Delegate,
    /// Run the deep-research subagent.
    DeepResearch,
    /// Fan out to several subagents and aggregate.
    MultiDomain,
}

/// Which path produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    Model,
    Pattern,
}

/// Output of [`Classifier::classify`](super::Classifier::classify).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub domain: Domain,
    pub complexity: Complexity,
    pub required_subagents: Vec<String>,
    pub confidence: f64,
    pub reasoning: String,
    pub routing_decision: RoutingDecision,
    pub method: ClassificationMethod,
}

impl ClassificationResult {
    /// Check the relationship between the routing decision and the
    /// subagent list that every returned result must satisfy.
    pub fn is_consistent(&self) -> bool {
        let count = self.required_subagents.len();
        let routed = match self.routing_decision {
            RoutingDecision::Direct => count == 0,
            RoutingDecision::Delegate => count == 1,
            RoutingDecision::MultiDomain => count >= 2,
            RoutingDecision::DeepResearch => {
                self.required_subagents == [DEEP_RESEARCH_SUBAGENT]
            }
        };
        routed && (0.0..=1.0).contains(&self.confidence)
    }
}
