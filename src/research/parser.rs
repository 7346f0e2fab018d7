// ABOUTME: Parses a free-text research report into findings, evidence,
// ABOUTME: recommendations, and methodology. Missing parts come back empty.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Whether a finding is the main driver or one of several contributors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    PrimaryCause,
    ContributingFactor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    /// Impact in percent, as written (40.0 means 40%).
    pub impact: Option<f64>,
    /// Confidence in [0, 1].
    pub confidence: Option<f64>,
    pub category: FindingCategory,
    /// Continuation lines under the numbered item.
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Verified,
    Conflicting,
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source: String,
    pub finding: String,
    pub status: EvidenceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Immediate,
    ShortTerm,
    LongTerm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub priority: Priority,
}

/// Structured view of a research report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub executive_summary: String,
    pub findings: Vec<Finding>,
    pub evidence_trail: Vec<Evidence>,
    pub recommendations: Vec<Recommendation>,
    pub methodology: Vec<String>,
}

/// Evidence counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub verified: usize,
    pub conflicting: usize,
    pub unverified: usize,
    pub total: usize,
    /// `verified / total`, or 0 with no evidence.
    pub ratio: f64,
}

impl VerificationSummary {
    pub fn from_evidence(evidence: &[Evidence]) -> Self {
        let count = |status| evidence.iter().filter(|e| e.status == status).count();
        let verified = count(EvidenceStatus::Verified);
        let total = evidence.len();
        Self {
            verified,
            conflicting: count(EvidenceStatus::Conflicting),
            unverified: count(EvidenceStatus::Unverified),
            total,
            ratio: if total == 0 {
                0.0
            } else {
                verified as f64 / total as f64
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ExecutiveSummary,
    Findings,
    EvidenceTrail,
    Recommendations,
    Methodology,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::ExecutiveSummary,
        Section::Findings,
        Section::EvidenceTrail,
        Section::Recommendations,
        Section::Methodology,
    ];

    fn label(&self) -> &'static str {
        match self {
            Section::ExecutiveSummary => "executive summary",
            Section::Findings => "findings",
            Section::EvidenceTrail => "evidence",
            Section::Recommendations => "recommendation",
            Section::Methodology => "methodology",
        }
    }

    fn from_heading(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::ALL.into_iter().find(|s| lower.contains(s.label()))
    }
}

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(#{1,4})\s+(.+?)\s*#*\s*$").expect("heading regex"));
static BOLD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*\*|__)([^*_]+?)(?:\*\*|__)\s*:?\s*$").expect("bold label regex")
});
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s*)?(?:\*\*)?(\d+)[.)](?:\*\*)?\s+(.+)$").expect("numbered regex")
});
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+•]\s+(.+)$").expect("bullet regex"));
static IMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)impact[^0-9%\n]{0,20}?(\d+(?:\.\d+)?)\s*%").expect("impact regex")
});
static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("percent regex"));
static CONFIDENCE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)confidence(?:\s+(?:level|score))?\W{0,3}(\d+(?:\.\d+)?)\s*(%)?")
        .expect("confidence regex")
});
static CONFIDENCE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)confidence\W{0,3}(high|medium|low)\b|\b(high|medium|low)\s+confidence")
        .expect("confidence word regex")
});
// Parenthesized annotations plus "- Impact: 40%" and ", 40% impact" tails.
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\s*\([^)]*(?:impact|confidence|%)[^)]*\)",
        r"|\s*[-–—|,;]?\s*\b(?:impact|confidence)\b\s*[:=]?\s*(?:of\s+)?[~+-]?(?:\d|high|medium|low).*$",
        r"|\s*[-–—|,;]\s*[~+-]?\d+(?:\.\d+)?\s*%.*$",
    ))
    .expect("annotation regex")
});
static STATUS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\s*(verified|conflicting|conflict|disputed|unverified)\s*\]")
        .expect("status tag regex")
});

const VERIFIED_GLYPHS: &[char] = &['✓', '✔', '✅'];
const CONFLICT_GLYPHS: &[char] = &['⚠', '✗', '✘', '❌'];

struct Heading {
    level: usize,
    section: Option<Section>,
}

/// Rank of a bold label; below every markdown heading.
const BOLD_LEVEL: usize = 5;

/// Heading level (`#` count, bold labels rank below `####`) and the
/// section it names, if any.
fn heading(line: &str) -> Option<Heading> {
    if let Some(caps) = HEADING.captures(line) {
        return Some(Heading {
            level: caps[1].len(),
            section: Section::from_heading(&caps[2]),
        });
    }
    BOLD_LABEL.captures(line).map(|caps| Heading {
        level: BOLD_LEVEL,
        section: Section::from_heading(&caps[1]),
    })
}

/// Body lines of each section. A section runs until the next heading that
/// names a section or sits at the same or a higher level.
///
/// Inside a section opened by a markdown heading, bold labels are body
/// text. A section first opened by a bold label is replaced when a real
/// heading names it later.
fn split_sections(text: &str) -> Vec<(Section, Vec<&str>)> {
    let mut sections: Vec<(Section, usize, Vec<&str>)> = Vec::new();
    // Index into `sections` and the level that opened it.
    let mut current: Option<(usize, usize)> = None;

    for line in text.lines() {
        // "### 2. Limited evidence ..." is a numbered item, not a section.
        let is_item = NUMBERED.is_match(line);
        if let Some(h) = heading(line).filter(|_| !is_item) {
            let open_level = current.map(|(_, level)| level);
            match h.section {
                Some(_) if h.level == BOLD_LEVEL && open_level.is_some_and(|l| l < BOLD_LEVEL) => {}
                Some(section) => {
                    current = match sections.iter().position(|(s, _, _)| *s == section) {
                        None => {
                            sections.push((section, h.level, Vec::new()));
                            Some((sections.len() - 1, h.level))
                        }
                        Some(idx) if h.level < sections[idx].1 => {
                            sections[idx].1 = h.level;
                            sections[idx].2.clear();
                            Some((idx, h.level))
                        }
                        Some(_) => None,
                    };
                    continue;
                }
                None if open_level.is_some_and(|l| h.level <= l) => {
                    current = None;
                    continue;
                }
                None => {}
            }
        }
        if let Some((idx, _)) = current {
            sections[idx].2.push(line);
        }
    }
    sections
        .into_iter()
        .map(|(section, _, body)| (section, body))
        .collect()
}

/// Parse a report. Never fails; sections that cannot be found are empty.
pub fn parse_report(text: &str) -> ParsedReport {
    let mut report = ParsedReport::default();

    for (section, body) in split_sections(text) {
        match section {
            Section::ExecutiveSummary => {
                report.executive_summary = body.join("\n").trim().to_string();
            }
            Section::Findings => {
                report.findings = numbered_items(&body).into_iter().map(finding).collect();
            }
            Section::EvidenceTrail => {
                report.evidence_trail = body.iter().filter_map(|l| evidence(l)).collect();
            }
            Section::Recommendations => {
                report.recommendations = numbered_items(&body)
                    .into_iter()
                    .map(recommendation)
                    .collect();
            }
            Section::Methodology => {
                report.methodology = body
                    .iter()
                    .filter_map(|l| list_item(l))
                    .map(|item| strip_emphasis(&item))
                    .filter(|item| !item.is_empty())
                    .collect();
            }
        }
    }
    report
}

/// A numbered item: its first line and the continuation lines below it.
struct Item {
    head: String,
    rest: Vec<String>,
}

impl Item {
    fn block(&self) -> String {
        let mut block = self.head.clone();
        for line in &self.rest {
            block.push('\n');
            block.push_str(line);
        }
        block
    }
}

fn numbered_items(body: &[&str]) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();
    for line in body {
        if let Some(caps) = NUMBERED.captures(line) {
            items.push(Item {
                head: caps[2].trim().to_string(),
                rest: Vec::new(),
            });
        } else if let Some(item) = items.last_mut() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                item.rest.push(trimmed.to_string());
            }
        }
    }
    items
}

fn finding(item: Item) -> Finding {
    let block = item.block();
    let title = ANNOTATION.replace_all(&item.head, "");
    let title = strip_emphasis(&title)
        .trim_end_matches(|c: char| matches!(c, ':' | '-' | '–' | '—' | '|') || c.is_whitespace())
        .to_string();

    let detail = item
        .rest
        .iter()
        .map(|line| {
            BULLET
                .captures(line)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| line.clone())
        })
        .collect::<Vec<_>>()
        .join(" ");

    Finding {
        title,
        impact: impact(&block),
        confidence: confidence(&block),
        category: if block.to_lowercase().contains("primary") {
            FindingCategory::PrimaryCause
        } else {
            FindingCategory::ContributingFactor
        },
        detail,
    }
}

fn impact(block: &str) -> Option<f64> {
    if let Some(caps) = IMPACT.captures(block) {
        return caps[1].parse().ok();
    }
    // First percentage that is not a confidence figure.
    PERCENT.captures_iter(block).find_map(|caps| {
        let m = caps.get(0)?;
        let window_start = block[..m.start()]
            .char_indices()
            .rev()
            .nth(24)
            .map(|(i, _)| i)
            .unwrap_or(0);
        if block[window_start..m.start()].to_lowercase().contains("confidence") {
            None
        } else {
            caps[1].parse().ok()
        }
    })
}

fn confidence(block: &str) -> Option<f64> {
    if let Some(caps) = CONFIDENCE_NUMBER.captures(block) {
        let value: f64 = caps[1].parse().ok()?;
        let value = if caps.get(2).is_some() || value > 1.0 {
            value / 100.0
        } else {
            value
        };
        return Some(value.clamp(0.0, 1.0));
    }
    let caps = CONFIDENCE_WORD.captures(block)?;
    let word = caps.get(1).or_else(|| caps.get(2))?.as_str().to_lowercase();
    match word.as_str() {
        "high" => Some(0.9),
        "medium" => Some(0.7),
        "low" => Some(0.5),
        _ => None,
    }
}

fn evidence(line: &str) -> Option<Evidence> {
    let content = list_item(line)?;

    let tagged = STATUS_TAG
        .captures(&content)
        .map(|caps| caps[1].to_lowercase());
    let status = match tagged.as_deref() {
        Some("verified") => EvidenceStatus::Verified,
        Some("unverified") => EvidenceStatus::Unverified,
        Some(_) => EvidenceStatus::Conflicting,
        None if content.contains(VERIFIED_GLYPHS) => EvidenceStatus::Verified,
        None if content.contains(CONFLICT_GLYPHS) => EvidenceStatus::Conflicting,
        None => EvidenceStatus::Unverified,
    };

    let cleaned = STATUS_TAG.replace_all(&content, "");
    let cleaned: String = cleaned
        .chars()
        .filter(|c| !VERIFIED_GLYPHS.contains(c) && !CONFLICT_GLYPHS.contains(c) && *c != '\u{fe0f}')
        .collect();
    let cleaned = strip_emphasis(&cleaned);

    let (source, finding) = match cleaned.split_once(':') {
        Some((source, finding)) => (source.trim().to_string(), finding.trim().to_string()),
        None => ("unspecified".to_string(), cleaned.trim().to_string()),
    };
    if finding.is_empty() {
        return None;
    }
    Some(Evidence {
        source,
        finding,
        status,
    })
}

fn recommendation(item: Item) -> Recommendation {
    let lower = item.block().to_lowercase();
    let priority = if lower.contains("immediate") {
        Priority::Immediate
    } else if lower.contains("long") {
        Priority::LongTerm
    } else {
        Priority::ShortTerm
    };
    Recommendation {
        action: strip_emphasis(&item.head),
        priority,
    }
}

/// Text of a bullet or numbered line.
fn list_item(line: &str) -> Option<String> {
    BULLET
        .captures(line)
        .or_else(|| NUMBERED.captures(line))
        .map(|caps| caps[caps.len() - 1].trim().to_string())
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .replace('`', "")
        .trim()
        .to_string()
}
