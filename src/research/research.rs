// ABOUTME: DeepResearch - one invocation of the research subagent with a
// ABOUTME: scoped task, followed by report parsing and verification counts.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::parser::{parse_report, ParsedReport, VerificationSummary};
use crate::classifier::DEEP_RESEARCH_SUBAGENT;
use crate::error::TriageError;
use crate::invoker::{InvocationResult, Invoker};

/// What the investigation may look at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchScope {
    pub time_range: Option<String>,
    pub modules: Vec<String>,
    pub doctypes: Vec<String>,
    pub focus_areas: Vec<String>,
}

impl ResearchScope {
    pub fn time_range(mut self, range: impl Into<String>) -> Self {
        self.time_range = Some(range.into());
        self
    }

    pub fn modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules.extend(modules.into_iter().map(Into::into));
        self
    }

    pub fn doctypes<I, S>(mut self, doctypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.doctypes.extend(doctypes.into_iter().map(Into::into));
        self
    }

    pub fn focus_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_areas.extend(areas.into_iter().map(Into::into));
        self
    }

    fn is_empty(&self) -> bool {
        self.time_range.is_none()
            && self.modules.is_empty()
            && self.doctypes.is_empty()
            && self.focus_areas.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchOptions {
    pub include_recommendations: bool,
    pub max_findings: usize,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            include_recommendations: true,
            max_findings: 5,
        }
    }
}

/// Outcome of an investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepResearchResult {
    pub question: String,
    pub scope: ResearchScope,
    pub report: ParsedReport,
    pub verification: VerificationSummary,
    /// False only when the research invocation itself failed. Whatever
    /// text it produced before failing is still parsed.
    pub success: bool,
    pub invocation: InvocationResult,
}

/// Runs investigations through the research subagent.
pub struct DeepResearch {
    invoker: Arc<Invoker>,
    subagent: String,
}

impl DeepResearch {
    pub fn new(invoker: Arc<Invoker>) -> Self {
        Self {
            invoker,
            subagent: DEEP_RESEARCH_SUBAGENT.to_string(),
        }
    }

    /// Use a differently named research subagent.
    pub fn subagent(mut self, name: impl Into<String>) -> Self {
        self.subagent = name.into();
        self
    }

    pub async fn investigate(
        &self,
        question: &str,
        scope: &ResearchScope,
        options: &ResearchOptions,
    ) -> Result<DeepResearchResult, TriageError> {
        if !self.invoker.registry().contains(&self.subagent) {
            return Err(TriageError::UnknownSubagent(self.subagent.clone()));
        }

        let task = research_task(question, scope, options);
        let invocation = self.invoker.run(&self.subagent, &task, None).await;
        if !invocation.success {
            warn!(
                subagent = %self.subagent,
                error = invocation.error.as_deref().unwrap_or_default(),
                "research invocation failed"
            );
        }

        let mut report = parse_report(&invocation.final_text);
        report.findings.truncate(options.max_findings);
        if !options.include_recommendations {
            report.recommendations.clear();
        }
        let verification = VerificationSummary::from_evidence(&report.evidence_trail);

        info!(
            findings = report.findings.len(),
            evidence = verification.total,
            verified_ratio = verification.ratio,
            "research report parsed"
        );

        Ok(DeepResearchResult {
            question: question.to_string(),
            scope: scope.clone(),
            report,
            verification,
            success: invocation.success,
            invocation,
        })
    }
}

fn research_task(question: &str, scope: &ResearchScope, options: &ResearchOptions) -> String {
    let mut task = format!("Research question: {}\n", question);

    if !scope.is_empty() {
        task.push_str("\nScope:\n");
        if let Some(range) = &scope.time_range {
            let _ = writeln!(task, "- Time range: {}", range);
        }
        for (label, values) in [
            ("Modules", &scope.modules),
            ("Document types", &scope.doctypes),
            ("Focus areas", &scope.focus_areas),
        ] {
            if !values.is_empty() {
                let _ = writeln!(task, "- {}: {}", label, values.join(", "));
            }
        }
    }

    let _ = write!(
        task,
        "\nStructure your answer with these markdown headings, in this order:\n\n\
         ## Executive Summary\n\
         Two or three sentences answering the question.\n\n\
         ## Findings\n\
         At most {} numbered findings. Label the main driver \"Primary cause\" and the \
         others \"Contributing factor\". End each title with its impact and your confidence, \
         for example: (Impact: 40%, Confidence: 85%).\n\n\
         ## Evidence Trail\n\
         One bullet per source, written as `source: finding`. Mark verified evidence with ✓ \
         and evidence that conflicts with another source with ⚠.\n\n",
        options.max_findings
    );
    if options.include_recommendations {
        task.push_str(
            "## Recommendations\n\
             Numbered actions, each labelled immediate, short-term, or long-term.\n\n",
        );
    }
    task.push_str("## Methodology\nA bulleted list of the steps you took.\n");
    task
}
