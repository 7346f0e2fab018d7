// ABOUTME: Orchestrator - classification followed by direct, delegated,
// ABOUTME: fan-out, or deep-research execution.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::aggregator::{AggregatedResult, Aggregator, Strategy};
use crate::classifier::{ClassificationResult, Classifier, RoutingDecision};
use crate::config::TriageConfig;
use crate::error::TriageError;
use crate::invoker::{InvocationResult, Invoker};
use crate::llm::{LlmClient, Message};
use crate::registry::SubagentRegistry;
use crate::research::{DeepResearch, DeepResearchResult, ResearchOptions, ResearchScope};
use crate::tool::ToolRegistry;

/// What happened to a request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Outcome {
    /// No subagent was needed; the caller answers itself.
    Direct { classification: ClassificationResult },
    Delegated {
        classification: ClassificationResult,
        result: InvocationResult,
    },
    MultiDomain {
        classification: ClassificationResult,
        /// One slot per required subagent, in classification order.
        results: Vec<InvocationResult>,
        aggregated: AggregatedResult,
    },
    DeepResearch {
        classification: ClassificationResult,
        report: DeepResearchResult,
    },
}

impl Outcome {
    pub fn classification(&self) -> &ClassificationResult {
        match self {
            Outcome::Direct { classification }
            | Outcome::Delegated { classification, .. }
            | Outcome::MultiDomain { classification, .. }
            | Outcome::DeepResearch { classification, .. } => classification,
        }
    }

    /// The text a caller would show, if any subagent produced one.
    pub fn answer(&self) -> Option<&str> {
        match self {
            Outcome::Direct { .. } => None,
            Outcome::Delegated { result, .. } => Some(&result.final_text),
            Outcome::MultiDomain { aggregated, .. } => Some(&aggregated.synthesis),
            Outcome::DeepResearch { report, .. } => Some(&report.invocation.final_text),
        }
    }
}

/// Routes requests through the classifier to subagents.
pub struct Orchestrator {
    registry: Arc<SubagentRegistry>,
    classifier: Classifier,
    invoker: Arc<Invoker>,
    aggregator: Aggregator,
    research: DeepResearch,
    strategy: Strategy,
    research_options: ResearchOptions,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<SubagentRegistry>,
        classifier: Classifier,
        invoker: Arc<Invoker>,
        aggregator: Aggregator,
        research: DeepResearch,
    ) -> Self {
        Self {
            registry,
            classifier,
            invoker,
            aggregator,
            research,
            strategy: Strategy::default(),
            research_options: ResearchOptions::default(),
        }
    }

    /// Wire every component from one config and one transport.
    pub fn from_config(
        config: &TriageConfig,
        registry: Arc<SubagentRegistry>,
        tools: Arc<ToolRegistry>,
        client: Arc<dyn LlmClient>,
    ) -> Self {
        let classifier = Classifier::new(registry.clone())
            .with_client(client.clone(), &config.classifier_model);
        let invoker = Arc::new(
            Invoker::new(registry.clone(), tools, client.clone())
                .max_turns(config.max_turns)
                .max_tokens(config.max_tokens),
        );
        let aggregator = Aggregator::new(client)
            .model(&config.synthesis_model)
            .conflict_threshold(config.conflict_threshold);
        let research = DeepResearch::new(invoker.clone()).subagent(&config.research_subagent);

        Self::new(registry, classifier, invoker, aggregator, research)
            .strategy(config.default_strategy)
    }

    /// Strategy used to merge multi-domain results.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn research_options(mut self, options: ResearchOptions) -> Self {
        self.research_options = options;
        self
    }

    pub fn registry(&self) -> &Arc<SubagentRegistry> {
        &self.registry
    }

    /// Classify and execute a request.
    ///
    /// Subagent failures stay inside the returned outcome. Only a
    /// subagent name missing from the registry is an error.
    pub async fn handle(
        &self,
        request: &str,
        context_hint: Option<&str>,
        history: Option<&[Message]>,
    ) -> Result<Outcome, TriageError> {
        let classification = self.classifier.classify(request, context_hint, history).await;
        info!(
            domain = %classification.domain,
            routing = ?classification.routing_decision,
            confidence = classification.confidence,
            method = ?classification.method,
            "request classified"
        );

        let context = context_hint.map(|hint| json!({ "current_view": hint }));

        match classification.routing_decision {
            RoutingDecision::Direct => Ok(Outcome::Direct { classification }),
            RoutingDecision::Delegate => {
                let Some(name) = classification.required_subagents.first() else {
                    return Ok(Outcome::Direct { classification });
                };
                self.ensure_known(name)?;
                let result = self.invoker.run(name, request, context.as_ref()).await;
                Ok(Outcome::Delegated {
                    classification,
                    result,
                })
            }
            RoutingDecision::MultiDomain => {
                for name in &classification.required_subagents {
                    self.ensure_known(name)?;
                }
                debug!(
                    subagents = classification.required_subagents.len(),
                    "fanning out"
                );
                let runs = classification
                    .required_subagents
                    .iter()
                    .map(|name| self.invoker.run(name, request, context.as_ref()));
                let results = join_all(runs).await;
                let aggregated = self
                    .aggregator
                    .combine(&results, request, self.strategy)
                    .await;
                Ok(Outcome::MultiDomain {
                    classification,
                    results,
                    aggregated,
                })
            }
            RoutingDecision::DeepResearch => {
                let report = self
                    .research
                    .investigate(request, &ResearchScope::default(), &self.research_options)
                    .await?;
                Ok(Outcome::DeepResearch {
                    classification,
                    report,
                })
            }
        }
    }

    fn ensure_known(&self, name: &str) -> Result<(), TriageError> {
        if self.registry.contains(name) {
            Ok(())
        } else {
            Err(TriageError::UnknownSubagent(name.to_string()))
        }
    }
}
