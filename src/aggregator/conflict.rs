// ABOUTME: ConflictDetector - flags numbers that subagents disagree on.
// ABOUTME: Numbers are grouped by the word before them and their unit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use super::types::Conflict;
use crate::invoker::InvocationResult;

pub const DEFAULT_CONFLICT_THRESHOLD: f64 = 0.10;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\$)?\b(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?(\s?%)?").expect("number regex")
});

const STOPWORDS: &[&str] = &[
    "a", "about", "almost", "an", "and", "approximately", "are", "around", "at", "be", "been",
    "by", "down", "for", "from", "in", "is", "just", "nearly", "of", "on", "only", "or", "over",
    "roughly", "some", "than", "the", "to", "under", "up", "was", "were", "with",
];

/// Key a number is grouped under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MetricKey {
    pub(crate) word: String,
    pub(crate) unit: &'static str,
}

/// Numeric disagreement heuristic.
///
/// A group of numbers sharing a key conflicts when it spans at least two
/// subagents and its population standard deviation exceeds
/// `threshold * |mean|`. Differently phrased figures land in different
/// groups, so misses are expected.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    threshold: f64,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CONFLICT_THRESHOLD)
    }
}

impl ConflictDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Conflicts among successful results.
    pub fn detect(&self, results: &[InvocationResult]) -> Vec<Conflict> {
        self.detect_keyed(results)
            .into_iter()
            .map(|(_, conflict)| conflict)
            .collect()
    }

    pub(crate) fn detect_keyed(&self, results: &[InvocationResult]) -> Vec<(MetricKey, Conflict)> {
        let mut groups: BTreeMap<MetricKey, Vec<(&str, f64)>> = BTreeMap::new();
        for result in results.iter().filter(|r| r.success) {
            for (key, value) in extract_metrics(&result.final_text) {
                groups
                    .entry(key)
                    .or_default()
                    .push((result.subagent.as_str(), value));
            }
        }

        let mut conflicts = Vec::new();
        for (key, values) in groups {
            let involved: BTreeSet<&str> = values.iter().map(|(name, _)| *name).collect();
            if involved.len() < 2 {
                continue;
            }

            let n = values.len() as f64;
            let mean = values.iter().map(|(_, v)| v).sum::<f64>() / n;
            let variance = values.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n;
            if variance.sqrt() <= self.threshold * mean.abs() {
                continue;
            }

            let reported = values
                .iter()
                .map(|(name, v)| format!("{} reports {}", name, format_value(*v, key.unit)))
                .collect::<Vec<_>>()
                .join(", ");
            conflicts.push((
                key.clone(),
                Conflict {
                    issue: format!("Disagreement on \"{}\": {}", key.word, reported),
                    involved_subagents: involved.into_iter().map(String::from).collect(),
                    resolution: Some(
                        "Figures differ beyond tolerance; check the underlying records.".into(),
                    ),
                },
            ));
        }
        conflicts
    }
}

/// Pull `(key, value)` pairs out of free text.
pub(crate) fn extract_metrics(text: &str) -> Vec<(MetricKey, f64)> {
    let mut metrics = Vec::new();

    for caps in NUMBER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(digits) = caps.get(2) else { continue };

        // Identifier fragments like INV-001 or Q3 are not measurements.
        // A sign after whitespace or punctuation belongs to the number.
        if text[..digits.start()].ends_with(|c: char| c == '_' || c.is_alphanumeric()) {
            continue;
        }
        let lead = &text[..whole.start()];
        let negative = match lead.chars().next_back() {
            Some(sign @ ('-' | '+' | '\u{2212}')) => {
                let before = &lead[..lead.len() - sign.len_utf8()];
                if before.ends_with(|c: char| c == '_' || c.is_alphanumeric()) {
                    continue;
                }
                sign != '+'
            }
            _ => false,
        };

        let unit = if caps.get(4).is_some() {
            "%"
        } else if caps.get(1).is_some() {
            "$"
        } else {
            ""
        };

        let raw = format!(
            "{}{}",
            digits.as_str().replace(',', ""),
            caps.get(3).map(|m| m.as_str()).unwrap_or("")
        );
        let Ok(value) = raw.parse::<f64>() else { continue };
        if unit.is_empty() && caps.get(3).is_none() && (1900.0..=2100.0).contains(&value) {
            continue;
        }

        let Some(word) = key_word(lead) else { continue };
        let value = if negative { -value } else { value };
        metrics.push((MetricKey { word, unit }, value));
    }
    metrics
}

fn key_word(preceding: &str) -> Option<String> {
    preceding
        .split(|c: char| !c.is_alphabetic())
        .rev()
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .find(|w| !STOPWORDS.contains(&w.as_str()))
}

fn format_value(value: f64, unit: &str) -> String {
    match unit {
        "$" => format!("${}", value),
        "%" => format!("{}%", value),
        _ => value.to_string(),
    }
}
