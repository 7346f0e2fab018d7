// ABOUTME: Keyword, doctype, and workflow tables for pattern classification,
// ABOUTME: plus the ordered complexity regexes.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Complexity;
use crate::domain::Domain;

/// Vocabulary that points a request at one domain.
#[derive(Debug)]
pub struct DomainPatterns {
    pub domain: Domain,
    pub keywords: &'static [&'static str],
    /// Reference document types; an exact context-hint match is a strong signal.
    pub doctypes: &'static [&'static str],
    /// Workflow names, matched with `_`, `-`, or spaces between words.
    pub workflows: &'static [&'static str],
}

/// One table per specialized domain, in scoring order.
pub static DOMAIN_PATTERNS: [DomainPatterns; 5] = [
    DomainPatterns {
        domain: Domain::Hospitality,
        keywords: &[
            "restaurant",
            "hotel",
            "reservation",
            "room",
            "guest",
            "menu",
            "booking",
            "occupancy",
            "housekeeping",
            "kitchen",
            "check-in",
            "front desk",
            "banquet",
        ],
        doctypes: &[
            "Restaurant",
            "Restaurant Order",
            "Hotel Room",
            "Hotel Room Reservation",
            "Menu Item",
            "Table Reservation",
        ],
        workflows: &["reservation_flow", "check_in", "check_out", "order_to_kitchen"],
    },
    DomainPatterns {
        domain: Domain::Healthcare,
        keywords: &[
            "patient",
            "appointment",
            "doctor",
            "physician",
            "practitioner",
            "diagnosis",
            "clinical",
            "encounter",
            "vital sign",
            "lab test",
            "prescription",
            "medication",
            "hospital",
            "wait time",
            "admission",
            "discharge",
        ],
        doctypes: &[
            "Patient",
            "Patient Appointment",
            "Patient Encounter",
            "Lab Test",
            "Healthcare Practitioner",
            "Vital Signs",
            "Clinical Procedure",
        ],
        workflows: &["patient_admission", "appointment_booking", "patient_discharge"],
    },
    DomainPatterns {
        domain: Domain::Manufacturing,
        keywords: &[
            "production",
            "work order",
            "bom",
            "bill of materials",
            "manufacturing",
            "workstation",
            "quality inspection",
            "job card",
            "raw material",
            "yield",
            "downtime",
            "machine",
            "scrap",
        ],
        doctypes: &[
            "Work Order",
            "BOM",
            "Job Card",
            "Workstation",
            "Quality Inspection",
            "Production Plan",
        ],
        workflows: &["production_planning", "quality_check", "material_request"],
    },
    DomainPatterns {
        domain: Domain::Retail,
        keywords: &[
            "store",
            "pos",
            "point of sale",
            "loyalty",
            "sku",
            "promotion",
            "discount",
            "footfall",
            "basket",
            "shelf",
            "merchandise",
            "retail",
        ],
        doctypes: &[
            "POS Invoice",
            "POS Profile",
            "Item",
            "Loyalty Program",
            "Pricing Rule",
        ],
        workflows: &["pos_checkout", "returns_processing", "loyalty_redemption"],
    },
    DomainPatterns {
        domain: Domain::Education,
        keywords: &[
            "student",
            "course",
            "enrollment",
            "enrolment",
            "teacher",
            "instructor",
            "grade",
            "exam",
            "assessment",
            "curriculum",
            "attendance",
            "school",
            "semester",
            "tuition",
        ],
        doctypes: &[
            "Student",
            "Course",
            "Program Enrollment",
            "Assessment Result",
            "Student Attendance",
            "Instructor",
        ],
        workflows: &["student_enrollment", "assessment_grading", "fee_collection"],
    },
];

struct CompiledDomain {
    keywords: Vec<(&'static str, Regex)>,
    workflows: Vec<(&'static str, Regex)>,
}

static COMPILED: LazyLock<Vec<CompiledDomain>> = LazyLock::new(|| {
    DOMAIN_PATTERNS
        .iter()
        .map(|table| CompiledDomain {
            keywords: table
                .keywords
                .iter()
                .map(|kw| (*kw, word_regex(&regex::escape(kw))))
                .collect(),
            workflows: table
                .workflows
                .iter()
                .map(|wf| (*wf, word_regex(&regex::escape(wf).replace('_', "[ _-]"))))
                .collect(),
        })
        .collect()
});

fn word_regex(body: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}s?\b", body)).expect("escaped table entry")
}

const KEYWORD_POINTS: u32 = 2;
const DOCTYPE_POINTS: u32 = 5;
const WORKFLOW_POINTS: u32 = 3;

/// A domain's pattern score and what matched.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternScore {
    pub domain: Domain,
    pub score: u32,
    pub matched: Vec<String>,
}

/// Score every specialized domain, in table order.
pub(crate) fn score_domains(request: &str, context_hint: Option<&str>) -> Vec<PatternScore> {
    let hint = context_hint.map(str::trim).filter(|h| !h.is_empty());

    DOMAIN_PATTERNS
        .iter()
        .zip(COMPILED.iter())
        .map(|(table, compiled)| {
            let mut score = 0;
            let mut matched = Vec::new();

            for (keyword, re) in &compiled.keywords {
                if re.is_match(request) {
                    score += KEYWORD_POINTS;
                    matched.push((*keyword).to_string());
                }
            }
            for (workflow, re) in &compiled.workflows {
                if re.is_match(request) {
                    score += WORKFLOW_POINTS;
                    matched.push(format!("workflow:{}", workflow));
                }
            }
            if let Some(hint) = hint {
                if let Some(doctype) = table.doctypes.iter().find(|d| d.eq_ignore_ascii_case(hint)) {
                    score += DOCTYPE_POINTS;
                    matched.push(format!("doctype:{}", doctype));
                }
            }

            PatternScore {
                domain: table.domain,
                score,
                matched,
            }
        })
        .collect()
}

/// Banded confidence for a winning pattern score.
pub(crate) fn confidence_band(top_score: u32) -> f64 {
    match top_score {
        s if s >= 7 => 0.85,
        s if s >= 4 => 0.70,
        _ => 0.60,
    }
}

const SIMPLE: &[&str] = &[
    r"^\s*(show|get|list|find|display|open|view|fetch|print)\b",
    r"^\s*what\s+is\s+the\s+(status|total|balance|price|number)\b",
];

const MULTI_STEP: &[&str] = &[
    r"\b(and then|then|after that|followed by|afterwards)\b",
    r"\b(compare|versus|vs)\b",
    r"\b(create|update|generate|prepare)\b.+\band\b.+\b(send|notify|email|assign|schedule)\b",
    r"\b(report|summary|summari[sz]e|breakdown|trend)s?\b",
    r"\bstep[- ]by[- ]step\b",
];

const DEEP_RESEARCH: &[&str] = &[
    r"^\s*why\b",
    r"\b(root|underlying) causes?\b",
    r"\b(investigate|investigation|diagnose)\b",
    r"\bwhat\s+(caused|drove|is driving|led to|contributed to)\b",
    r"\bdeep[- ](dive|research|analysis)\b",
    r"\b(explain|understand)\s+(the\s+)?(drop|decline|increase|spike|rise|fall|change)\b",
];

type Tier = (Complexity, Vec<(&'static str, Regex)>);

static COMPLEXITY_TIERS: LazyLock<Vec<Tier>> = LazyLock::new(|| {
    [
        (Complexity::Simple, SIMPLE),
        (Complexity::MultiStep, MULTI_STEP),
        (Complexity::DeepResearch, DEEP_RESEARCH),
    ]
    .into_iter()
    .map(|(tier, patterns)| {
        let compiled = patterns
            .iter()
            .map(|p| {
                let re = Regex::new(&format!("(?i){}", p)).expect("complexity pattern");
                (*p, re)
            })
            .collect();
        (tier, compiled)
    })
    .collect()
});

/// First tier with a matching pattern, and that pattern. Defaults to simple.
pub(crate) fn detect_complexity(request: &str) -> (Complexity, Option<&'static str>) {
    for (tier, patterns) in COMPLEXITY_TIERS.iter() {
        if let Some((pattern, _)) = patterns.iter().find(|(_, re)| re.is_match(request)) {
            return (*tier, Some(*pattern));
        }
    }
    (Complexity::Simple, None)
}
