// ABOUTME: Aggregator - asks the model to merge subagent results, falling
// ABOUTME: back to attributed concatenation when the model is unavailable.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::conflict::{ConflictDetector, MetricKey};
use super::types::{AggregatedResult, Conflict, Strategy, SubagentSummary};
use crate::extract;
use crate::invoker::InvocationResult;
use crate::llm::{LlmClient, Message, Request};

pub const DEFAULT_SYNTHESIS_MODEL: &str = "claude-sonnet-4-20250514";

const SYNTHESIS_MAX_TOKENS: u32 = 4096;
const SUMMARY_CHARS: usize = 280;

/// Combines invocation results.
pub struct Aggregator {
    client: Arc<dyn LlmClient>,
    model: String,
    detector: ConflictDetector,
}

#[derive(Debug, Deserialize)]
struct ModelSynthesis {
    synthesis: String,
    #[serde(default)]
    conflicts: Vec<Conflict>,
    confidence: f64,
}

impl Aggregator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            model: DEFAULT_SYNTHESIS_MODEL.to_string(),
            detector: ConflictDetector::default(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Relative spread above which numeric figures count as conflicting.
    pub fn conflict_threshold(mut self, threshold: f64) -> Self {
        self.detector = ConflictDetector::new(threshold);
        self
    }

    /// Heuristic conflicts among the successful results.
    pub fn detect_conflicts(&self, results: &[InvocationResult]) -> Vec<Conflict> {
        self.detector.detect(results)
    }

    /// Merge results into one answer. Never fails.
    pub async fn combine(
        &self,
        results: &[InvocationResult],
        original_query: &str,
        strategy: Strategy,
    ) -> AggregatedResult {
        let started = Instant::now();
        let successful: Vec<&InvocationResult> = results.iter().filter(|r| r.success).collect();
        let ratio = if results.is_empty() {
            0.0
        } else {
            successful.len() as f64 / results.len() as f64
        };

        let mut aggregated = AggregatedResult {
            synthesis: String::new(),
            sources: successful.iter().map(|r| r.subagent.clone()).collect(),
            per_subagent_summary: summarize(results),
            conflicts: Vec::new(),
            confidence: ratio,
            total_elapsed_ms: 0,
            strategy,
            fallback: true,
        };

        if successful.is_empty() {
            debug!(results = results.len(), "no successful results to aggregate");
            aggregated.synthesis = nothing_to_synthesize(results);
            aggregated.confidence = 0.0;
        } else {
            let heuristic = self.detector.detect_keyed(results);
            let request = Request::new(&self.model)
                .system(system_prompt(strategy))
                .message(Message::user(user_prompt(original_query, &successful)))
                .max_tokens(SYNTHESIS_MAX_TOKENS);

            match self.client.create_message(&request).await {
                Ok(response) => {
                    let text = response.text();
                    match parse_synthesis(&text) {
                        Some(parsed) => {
                            aggregated.synthesis = parsed.synthesis;
                            aggregated.confidence = clamp_unit(parsed.confidence);
                            aggregated.conflicts = merge_conflicts(parsed.conflicts, heuristic);
                            aggregated.fallback = false;
                        }
                        None => {
                            warn!("synthesis reply was not valid JSON, using raw text");
                            aggregated.synthesis = text.trim().to_string();
                            aggregated.conflicts = strip_keys(heuristic);
                            aggregated.fallback = false;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "synthesis transport failed, concatenating results");
                    aggregated.synthesis = concatenate(&successful);
                    aggregated.conflicts = strip_keys(heuristic);
                }
            }
        }

        let longest = results.iter().map(|r| r.elapsed_ms).max().unwrap_or(0);
        aggregated.total_elapsed_ms = longest + started.elapsed().as_millis() as u64;

        info!(
            strategy = %strategy,
            sources = aggregated.sources.len(),
            conflicts = aggregated.conflicts.len(),
            confidence = aggregated.confidence,
            fallback = aggregated.fallback,
            "results aggregated"
        );
        aggregated
    }
}

fn system_prompt(strategy: Strategy) -> String {
    format!(
        "You combine answers from specialist subagents into a single response.\n\n{}\n\n\
         Reply with a single JSON object and nothing else:\n\
         {{\"synthesis\": \"...\", \"conflicts\": [{{\"issue\": \"...\", \
         \"involved_subagents\": [\"...\"], \"resolution\": \"...\"}}], \"confidence\": 0.0}}",
        strategy.instructions()
    )
}

fn user_prompt(original_query: &str, successful: &[&InvocationResult]) -> String {
    let mut prompt = format!("Original question: {}\n\n", original_query);
    for result in successful {
        let tools = if result.tools_used.is_empty() {
            "none".to_string()
        } else {
            result.tools_used.join(", ")
        };
        let _ = write!(
            prompt,
            "### {}\nTools: {}\nElapsed: {} ms\n\n{}\n\n",
            result.subagent, tools, result.elapsed_ms, result.final_text
        );
    }
    prompt
}

fn parse_synthesis(text: &str) -> Option<ModelSynthesis> {
    let json = extract::json_object(text)?;
    serde_json::from_str(json).ok()
}

fn concatenate(successful: &[&InvocationResult]) -> String {
    successful
        .iter()
        .map(|r| format!("## {}\n\n{}", r.subagent, r.final_text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn nothing_to_synthesize(results: &[InvocationResult]) -> String {
    let mut text = String::from("No subagent produced a usable result.");
    for result in results {
        let _ = write!(
            text,
            "\n- {}: {}",
            result.subagent,
            result.error.as_deref().unwrap_or("no output")
        );
    }
    text
}

fn summarize(results: &[InvocationResult]) -> BTreeMap<String, SubagentSummary> {
    results
        .iter()
        .map(|r| {
            let source = if r.success {
                r.final_text.trim()
            } else {
                r.error.as_deref().unwrap_or("failed")
            };
            let mut summary: String = source.chars().take(SUMMARY_CHARS).collect();
            if source.chars().count() > SUMMARY_CHARS {
                summary.push_str("...");
            }
            (
                r.subagent.clone(),
                SubagentSummary {
                    summary,
                    tools_used: r.tools_used.clone(),
                    elapsed_ms: r.elapsed_ms,
                    success: r.success,
                },
            )
        })
        .collect()
}

/// Model conflicts first, then heuristic ones the model did not already
/// report for the same subagents and metric.
fn merge_conflicts(mut reported: Vec<Conflict>, heuristic: Vec<(MetricKey, Conflict)>) -> Vec<Conflict> {
    for (key, conflict) in heuristic {
        let covered = reported.iter().any(|existing| {
            conflict
                .involved_subagents
                .iter()
                .all(|name| existing.involved_subagents.contains(name))
                && existing.issue.to_lowercase().contains(&key.word)
        });
        if !covered {
            reported.push(conflict);
        }
    }
    reported
}

fn strip_keys(keyed: Vec<(MetricKey, Conflict)>) -> Vec<Conflict> {
    keyed.into_iter().map(|(_, conflict)| conflict).collect()
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
