// ABOUTME: Tests for deep research - report parsing and the investigate flow.
// ABOUTME: Reports are hand-written samples of what a research model returns.

use std::sync::Arc;

use super::*;
use crate::error::TriageError;
use crate::invoker::Invoker;
use crate::llm::LlmClient;
use crate::test_support::{sample_registry, sample_tools, ScriptedClient};

const REPORT: &str = "\
# Patient Wait Time Analysis

## Executive Summary
Average wait times rose 18% in Q3, driven mainly by physician under-staffing.

## Findings
1. **Primary cause: Physician under-staffing** (Impact: 45%, Confidence: 85%)
   - Two practitioners left in July.
2. Appointment overbooking - Impact: 30%, confidence high
3. Lab test turnaround
   Slower results added roughly 10% to visit length.

## Evidence Trail
- Patient Appointment log: average wait up from 22 to 26 minutes ✓
- Healthcare Practitioner roster: two departures in July [verified]
- Staff survey: morale unchanged ⚠
- Lab Test records: turnaround increased

## Recommendations
1. Immediate: approve two locum physicians
2. Cap daily bookings per practitioner
3. Long-term: redesign the appointment template

## Methodology
- Compared Q2 and Q3 appointment timestamps
- Reviewed practitioner rosters
1. Sampled lab test turnaround
";

#[test]
fn test_parse_full_report() {
    let report = parse_report(REPORT);

    assert_eq!(
        report.executive_summary,
        "Average wait times rose 18% in Q3, driven mainly by physician under-staffing."
    );

    assert_eq!(report.findings.len(), 3);
    let primary = &report.findings[0];
    assert_eq!(primary.title, "Primary cause: Physician under-staffing");
    assert_eq!(primary.impact, Some(45.0));
    assert_eq!(primary.confidence, Some(0.85));
    assert_eq!(primary.category, FindingCategory::PrimaryCause);
    assert_eq!(primary.detail, "Two practitioners left in July.");

    let overbooking = &report.findings[1];
    assert_eq!(overbooking.title, "Appointment overbooking");
    assert_eq!(overbooking.impact, Some(30.0));
    assert_eq!(overbooking.confidence, Some(0.9));
    assert_eq!(overbooking.category, FindingCategory::ContributingFactor);

    let lab = &report.findings[2];
    assert_eq!(lab.title, "Lab test turnaround");
    assert_eq!(lab.impact, Some(10.0));
    assert_eq!(lab.confidence, None);

    let statuses: Vec<_> = report.evidence_trail.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            EvidenceStatus::Verified,
            EvidenceStatus::Verified,
            EvidenceStatus::Conflicting,
            EvidenceStatus::Unverified,
        ]
    );
    assert_eq!(report.evidence_trail[0].source, "Patient Appointment log");
    assert_eq!(
        report.evidence_trail[0].finding,
        "average wait up from 22 to 26 minutes"
    );
    assert_eq!(
        report.evidence_trail[1].finding,
        "two departures in July"
    );

    let priorities: Vec<_> = report.recommendations.iter().map(|r| r.priority).collect();
    assert_eq!(
        priorities,
        vec![Priority::Immediate, Priority::ShortTerm, Priority::LongTerm]
    );
    assert_eq!(
        report.recommendations[1].action,
        "Cap daily bookings per practitioner"
    );

    assert_eq!(
        report.methodology,
        vec![
            "Compared Q2 and Q3 appointment timestamps",
            "Reviewed practitioner rosters",
            "Sampled lab test turnaround",
        ]
    );
}

#[test]
fn test_verification_summary_is_arithmetic() {
    let report = parse_report(REPORT);
    let summary = VerificationSummary::from_evidence(&report.evidence_trail);

    assert_eq!(summary.verified, 2);
    assert_eq!(summary.conflicting, 1);
    assert_eq!(summary.unverified, 1);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.ratio, 0.5);
}

#[test]
fn test_bold_labels_work_as_sections() {
    let report = parse_report(
        "**Executive Summary**\nYield fell.\n\n**Findings:**\n1. Machine downtime (Impact: 60%)\n\n**Methodology**\n- Reviewed job cards\n",
    );

    assert_eq!(report.executive_summary, "Yield fell.");
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].title, "Machine downtime");
    assert_eq!(report.findings[0].impact, Some(60.0));
    assert_eq!(report.methodology, vec!["Reviewed job cards"]);
    assert!(report.evidence_trail.is_empty());
}

#[test]
fn test_numbered_subheadings_stay_inside_findings() {
    let report = parse_report(
        "## Findings\n### 1. Limited evidence of seasonality (Confidence: 0.4)\nNothing stood out.\n### 2. Primary: new intake process, 25% impact\n\n## Methodology\n- Read logs\n",
    );

    assert_eq!(report.findings.len(), 2);
    assert_eq!(report.findings[0].title, "Limited evidence of seasonality");
    assert_eq!(report.findings[0].confidence, Some(0.4));
    assert_eq!(report.findings[0].impact, None);
    assert_eq!(report.findings[1].title, "Primary: new intake process");
    assert_eq!(report.findings[1].impact, Some(25.0));
    assert_eq!(report.findings[1].category, FindingCategory::PrimaryCause);
    assert!(report.evidence_trail.is_empty());
}

#[test]
fn test_bold_label_inside_finding_does_not_claim_evidence() {
    let report = parse_report(
        "## Findings\n\
         1. Primary cause: staffing (Impact: 40%)\n\
         **Evidence:**\n\
         - roster: two left\n\
         \n\
         ## Evidence Trail\n\
         - Patient Appointment log: waits up ✓\n\
         - Survey: unchanged ⚠\n\
         \n\
         ## Methodology\n\
         - Compared rosters\n",
    );

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].impact, Some(40.0));
    assert!(report.findings[0].detail.contains("roster: two left"));

    let sources: Vec<_> = report.evidence_trail.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["Patient Appointment log", "Survey"]);
    let statuses: Vec<_> = report.evidence_trail.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![EvidenceStatus::Verified, EvidenceStatus::Conflicting]
    );
    assert_eq!(report.methodology, vec!["Compared rosters"]);
}

#[test]
fn test_heading_replaces_earlier_bold_label_section() {
    let report = parse_report(
        "**Evidence:**\n- draft: ignore me\n\n# Evidence Trail\n- Lab Test records: turnaround up ✓\n",
    );

    assert_eq!(report.evidence_trail.len(), 1);
    assert_eq!(report.evidence_trail[0].source, "Lab Test records");
    assert_eq!(report.evidence_trail[0].status, EvidenceStatus::Verified);
}

#[test]
fn test_unstructured_text_yields_empty_report() {
    let report = parse_report("The model just rambled without any headings.");

    assert_eq!(report, ParsedReport::default());
    assert_eq!(
        VerificationSummary::from_evidence(&report.evidence_trail).ratio,
        0.0
    );
}

fn research(client: &Arc<ScriptedClient>) -> DeepResearch {
    let client: Arc<dyn LlmClient> = client.clone();
    let invoker = Invoker::new(sample_registry(), sample_tools(), client);
    DeepResearch::new(Arc::new(invoker))
}

#[tokio::test]
async fn test_investigate_parses_reply() {
    let client = Arc::new(ScriptedClient::text(REPORT));
    let scope = ResearchScope::default()
        .time_range("2025-Q3")
        .modules(["Healthcare"])
        .doctypes(["Patient Appointment", "Patient Encounter"])
        .focus_areas(["staffing"]);

    let result = research(&client)
        .investigate(
            "Why did patient wait times increase last quarter?",
            &scope,
            &ResearchOptions::default(),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.report.findings.len(), 3);
    assert_eq!(result.report.recommendations.len(), 3);
    assert_eq!(result.verification.ratio, 0.5);
    assert_eq!(result.invocation.subagent, "deep-research");

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].system.as_deref(),
        Some("You are the deep-research subagent.")
    );
    let task = requests[0].messages[0].text();
    assert!(task.starts_with("Research question: Why did patient wait times increase"));
    assert!(task.contains("- Time range: 2025-Q3"));
    assert!(task.contains("- Document types: Patient Appointment, Patient Encounter"));
    assert!(task.contains("At most 5 numbered findings"));
    assert!(task.contains("## Recommendations"));
}

#[tokio::test]
async fn test_options_limit_findings_and_drop_recommendations() {
    let client = Arc::new(ScriptedClient::text(REPORT));
    let options = ResearchOptions {
        include_recommendations: false,
        max_findings: 2,
    };

    let result = research(&client)
        .investigate("Why?", &ResearchScope::default(), &options)
        .await
        .unwrap();

    assert_eq!(result.report.findings.len(), 2);
    assert!(result.report.recommendations.is_empty());

    let task = client.requests()[0].messages[0].text();
    assert!(!task.contains("Recommendations"));
    assert!(!task.contains("Scope:"));
    assert!(task.contains("At most 2 numbered findings"));
}

#[tokio::test]
async fn test_unknown_research_subagent_fails_before_transport() {
    let client = Arc::new(ScriptedClient::text(REPORT));

    let err = research(&client)
        .subagent("oracle")
        .investigate("Why?", &ResearchScope::default(), &ResearchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, TriageError::UnknownSubagent(name) if name == "oracle"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_transport_failure_reports_unsuccessful() {
    let client = Arc::new(ScriptedClient::failing());

    let result = research(&client)
        .investigate("Why?", &ResearchScope::default(), &ResearchOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.invocation.error.is_some());
    assert_eq!(result.report, ParsedReport::default());
    assert_eq!(result.verification.total, 0);
}
