// ABOUTME: Classifier - decides domain, complexity, and routing for a request.
// ABOUTME: Tries the model first when one is attached, else scores patterns.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::patterns::{confidence_band, detect_complexity, score_domains};
use super::types::{
    ClassificationMethod, ClassificationResult, Complexity, RoutingDecision,
    DEEP_RESEARCH_SUBAGENT,
};
use crate::domain::Domain;
use crate::extract;
use crate::llm::{LlmClient, Message, Request, Role};
use crate::registry::SubagentRegistry;

/// How many trailing history messages the model sees.
const HISTORY_WINDOW: usize = 6;

const CLASSIFIER_MAX_TOKENS: u32 = 1024;

/// Routes requests against a subagent registry.
pub struct Classifier {
    registry: Arc<SubagentRegistry>,
    client: Option<Arc<dyn LlmClient>>,
    model: String,
}

impl Classifier {
    /// A pattern-only classifier.
    pub fn new(registry: Arc<SubagentRegistry>) -> Self {
        Self {
            registry,
            client: None,
            model: String::new(),
        }
    }

    /// Ask `model` through `client` first, falling back to patterns.
    pub fn with_client(mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        self.client = Some(client);
        self.model = model.into();
        self
    }

    /// Classify a request. Never fails; the worst case is a pattern
    /// classification with low confidence.
    pub async fn classify(
        &self,
        request: &str,
        context_hint: Option<&str>,
        history: Option<&[Message]>,
    ) -> ClassificationResult {
        if let Some(client) = &self.client {
            match self
                .classify_with_model(client.as_ref(), request, context_hint, history)
                .await
            {
                Ok(result) => return self.normalize(result),
                Err(reason) => warn!(%reason, "model classification failed, using patterns"),
            }
        }
        self.classify_by_patterns(request, context_hint)
    }

    /// Deterministic keyword and regex classification.
    pub fn classify_by_patterns(
        &self,
        request: &str,
        context_hint: Option<&str>,
    ) -> ClassificationResult {
        let mut scores = score_domains(request, context_hint);
        // Stable sort keeps table order among equal scores.
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        let positive: Vec<_> = scores.iter().filter(|s| s.score > 0).collect();

        let (complexity, pattern) = detect_complexity(request);
        let top = positive.first();
        let top_score = top.map(|s| s.score).unwrap_or(0);

        let (domain, routing_decision, required_subagents) = if complexity
            == Complexity::DeepResearch
        {
            let domain = top.map(|s| s.domain).unwrap_or(Domain::General);
            (
                domain,
                RoutingDecision::DeepResearch,
                vec![DEEP_RESEARCH_SUBAGENT.to_string()],
            )
        } else if positive.len() > 1 {
            let agents = positive
                .iter()
                .filter_map(|s| self.first_for_domain(s.domain))
                .collect();
            (Domain::MultiDomain, RoutingDecision::MultiDomain, agents)
        } else if let Some(top) = top.filter(|_| complexity != Complexity::Simple) {
            let agents = self.first_for_domain(top.domain).into_iter().collect();
            (top.domain, RoutingDecision::Delegate, agents)
        } else {
            let domain = top.map(|s| s.domain).unwrap_or(Domain::General);
            (domain, RoutingDecision::Direct, Vec::new())
        };

        let mut reasoning = String::new();
        match top {
            Some(_) => {
                let parts: Vec<_> = positive
                    .iter()
                    .map(|s| format!("{}={} ({})", s.domain, s.score, s.matched.join(", ")))
                    .collect();
                let _ = write!(reasoning, "domain scores: {}", parts.join("; "));
            }
            None => reasoning.push_str("no domain vocabulary matched"),
        }
        match pattern {
            Some(p) => {
                let _ = write!(reasoning, "; complexity {:?} via {}", complexity, p);
            }
            None => reasoning.push_str("; no complexity pattern matched"),
        }

        let result = ClassificationResult {
            domain,
            complexity,
            required_subagents,
            confidence: confidence_band(top_score),
            reasoning,
            routing_decision,
            method: ClassificationMethod::Pattern,
        };
        debug!(
            domain = %result.domain,
            routing = ?result.routing_decision,
            score = top_score,
            "pattern classification"
        );
        self.normalize(result)
    }

    fn first_for_domain(&self, domain: Domain) -> Option<String> {
        self.registry
            .for_domain(domain)
            .first()
            .map(|c| c.name.clone())
    }

    async fn classify_with_model(
        &self,
        client: &dyn LlmClient,
        request: &str,
        context_hint: Option<&str>,
        history: Option<&[Message]>,
    ) -> Result<ClassificationResult, String> {
        let req = Request::new(&self.model)
            .system(self.system_prompt())
            .message(Message::user(user_prompt(request, context_hint, history)))
            .max_tokens(CLASSIFIER_MAX_TOKENS)
            .temperature(0.0);

        let response = client
            .create_message(&req)
            .await
            .map_err(|e| e.to_string())?;
        let text = response.text();
        let json = extract::json_object(&text).ok_or("reply contained no JSON object")?;
        let verdict: ModelVerdict = serde_json::from_str(json).map_err(|e| e.to_string())?;

        Ok(ClassificationResult {
            domain: verdict.domain,
            complexity: verdict.complexity,
            required_subagents: verdict.required_subagents,
            confidence: verdict.confidence,
            reasoning: verdict.reasoning,
            routing_decision: verdict.routing_decision,
            method: ClassificationMethod::Model,
        })
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You route business requests to specialist subagents.\n\n\
             Domains: hospitality, healthcare, manufacturing, retail, education, general, multi_domain.\n\
             Complexity: simple (a single lookup or action), multi_step (several dependent steps), \
             deep_research (explaining causes or trends across data).\n\
             Routing decisions: direct (no subagent), delegate (exactly one subagent), \
             multi_domain (two or more subagents), deep_research (the deep-research subagent).\n\n\
             Available subagents:\n",
        );
        for config in self.registry.list_all() {
            let _ = writeln!(
                prompt,
                "- {} [{}]: {}",
                config.name, config.domain, config.description
            );
        }
        prompt.push_str(
            "\nReply with a single JSON object and nothing else:\n\
             {\"domain\": \"...\", \"complexity\": \"...\", \"required_subagents\": [\"...\"], \
             \"confidence\": 0.0, \"reasoning\": \"...\", \"routing_decision\": \"...\"}",
        );
        prompt
    }

    /// Re-establish the routing invariants on any candidate result.
    fn normalize(&self, mut result: ClassificationResult) -> ClassificationResult {
        let before = result.required_subagents.len();
        let mut seen = Vec::with_capacity(before);
        for name in result.required_subagents.drain(..) {
            let known = name == DEEP_RESEARCH_SUBAGENT || self.registry.contains(&name);
            if known && !seen.contains(&name) {
                seen.push(name);
            }
        }
        result.required_subagents = seen;
        if result.required_subagents.len() < before {
            debug!(
                dropped = before - result.required_subagents.len(),
                "dropped unknown subagents from classification"
            );
        }

        if result.complexity == Complexity::DeepResearch
            || result.routing_decision == RoutingDecision::DeepResearch
        {
            result.complexity = Complexity::DeepResearch;
            result.routing_decision = RoutingDecision::DeepResearch;
            result.required_subagents = vec![DEEP_RESEARCH_SUBAGENT.to_string()];
        } else {
            result
                .required_subagents
                .retain(|name| name != DEEP_RESEARCH_SUBAGENT);
        }

        if result.routing_decision == RoutingDecision::MultiDomain
            && result.required_subagents.len() < 2
        {
            result.routing_decision = match result.required_subagents.len() {
                1 => RoutingDecision::Delegate,
                _ => RoutingDecision::Direct,
            };
        }

        match result.routing_decision {
            RoutingDecision::Delegate => {
                result.required_subagents.truncate(1);
                if result.required_subagents.is_empty() {
                    result.routing_decision = RoutingDecision::Direct;
                }
            }
            RoutingDecision::Direct => result.required_subagents.clear(),
            RoutingDecision::MultiDomain | RoutingDecision::DeepResearch => {}
        }

        // Single-subagent and direct routes name a concrete domain.
        if result.domain == Domain::MultiDomain
            && matches!(
                result.routing_decision,
                RoutingDecision::Delegate | RoutingDecision::Direct
            )
        {
            result.domain = self.domain_of_first(&result.required_subagents);
        }

        result.confidence = if result.confidence.is_finite() {
            result.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        result
    }

    fn domain_of_first(&self, names: &[String]) -> Domain {
        names
            .first()
            .and_then(|name| self.registry.get(name))
            .map(|c| c.domain)
            .unwrap_or(Domain::General)
    }
}

/// The JSON object the model is asked to return.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    domain: Domain,
    complexity: Complexity,
    #[serde(default)]
    required_subagents: Vec<String>,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    routing_decision: RoutingDecision,
}

fn user_prompt(request: &str, context_hint: Option<&str>, history: Option<&[Message]>) -> String {
    let mut prompt = String::new();

    if let Some(history) = history.filter(|h| !h.is_empty()) {
        prompt.push_str("Recent conversation:\n");
        let skip = history.len().saturating_sub(HISTORY_WINDOW);
        for message in &history[skip..] {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            let _ = writeln!(prompt, "{}: {}", role, message.text());
        }
        prompt.push('\n');
    }
    if let Some(hint) = context_hint {
        let _ = writeln!(prompt, "The user is currently viewing: {}\n", hint);
    }
    let _ = write!(prompt, "Request: {}", request);
    prompt
}
