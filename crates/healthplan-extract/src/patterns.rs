//! Keyword and numeric pattern extraction.
//!
//! Needs nothing beyond the document text, so it always produces a record.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use healthplan_core::{HealthRecord, MetricKind};

const NUM: &str = r"(\d+(?:\.\d+)?)";
const MAX_CONCERNS: usize = 10;
const MAX_CONCERN_CHARS: usize = 200;

fn pattern(prefix: &str) -> Regex {
    Regex::new(&format!(r"(?i){prefix}\s*:?\s*{NUM}")).expect("static metric pattern")
}

/// Group 1 marks an LDL/HDL prefix; those matches are not total cholesterol.
static TOTAL_CHOLESTEROL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(ldl|hdl)[\s-]*)?(?:total\s+)?cholesterol(?:\s*,?\s*total)?\s*:?\s*{NUM}"
    ))
    .expect("static cholesterol pattern")
});

static BLOOD_PRESSURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:blood\s+pressure|bp)\s*:?\s*(\d{2,3})\s*/\s*(\d{2,3})")
        .expect("static blood pressure pattern")
});

static SIMPLE_PATTERNS: Lazy<Vec<(MetricKind, Regex)>> = Lazy::new(|| {
    vec![
        (MetricKind::CholesterolLdl, pattern(r"\bldl(?:[\s-]*(?:cholesterol|c))?")),
        (MetricKind::CholesterolHdl, pattern(r"\bhdl(?:[\s-]*(?:cholesterol|c))?")),
        (MetricKind::Triglycerides, pattern(r"\btriglycerides?")),
        (MetricKind::Glucose, pattern(r"\b(?:fasting\s+)?(?:blood\s+)?glucose")),
        (MetricKind::Hba1c, pattern(r"\b(?:hb\s*a1c|a1c)")),
        (MetricKind::VitaminD, pattern(r"\bvitamin\s*d3?\b")),
        (MetricKind::VitaminB12, pattern(r"\b(?:vitamin\s*)?b12\b")),
        (MetricKind::Ferritin, pattern(r"\bferritin")),
        (MetricKind::Iron, pattern(r"\b(?:serum\s+)?iron")),
        (MetricKind::Tsh, pattern(r"\btsh")),
        (MetricKind::Creatinine, pattern(r"\bcreatinine")),
        (MetricKind::BodyFatPercentage, pattern(r"\bbody\s*fat(?:\s*percentage|\s*%)?")),
        (MetricKind::Bmi, pattern(r"\bbmi")),
        (MetricKind::RestingHeartRate, pattern(r"\b(?:resting\s+heart\s+rate|rhr)")),
    ]
});

static CONCERN_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:high|elevated|low|deficient|abnormal",
        r"|outside\s+(?:the\s+)?(?:normal\s+)?range)\b"
    ))
    .expect("static concern pattern")
});

/// Fixed-pattern extractor used when generation is unavailable or unusable.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Never fails; with no matches every metric is null and concerns are empty.
    pub fn extract(&self, text: &str) -> HealthRecord {
        let mut record = HealthRecord::default();

        if let Some(value) = total_cholesterol(text) {
            record.metrics.set(MetricKind::CholesterolTotal, Some(value));
        }
        for (kind, regex) in SIMPLE_PATTERNS.iter() {
            if let Some(value) = first_number(regex, text) {
                record.metrics.set(*kind, Some(value));
            }
        }
        if let Some(caps) = BLOOD_PRESSURE.captures(text) {
            let systolic = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let diastolic = caps.get(2).and_then(|m| m.as_str().parse().ok());
            record.metrics.set(MetricKind::BloodPressureSystolic, systolic);
            record.metrics.set(MetricKind::BloodPressureDiastolic, diastolic);
        }

        record.health_concerns = concern_lines(text);
        let found = record.metrics.count_present();
        record.raw_summary = format!(
            "Pattern-based extraction found {} metric value(s) and {} flagged line(s)",
            found,
            record.health_concerns.len()
        );
        debug!("{}", record.raw_summary);
        record
    }
}

fn first_number(regex: &Regex, text: &str) -> Option<f64> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn total_cholesterol(text: &str) -> Option<f64> {
    TOTAL_CHOLESTEROL
        .captures_iter(text)
        .find(|caps| caps.get(1).is_none())
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// Lines mentioning a concern keyword, trimmed and de-duplicated.
fn concern_lines(text: &str) -> Vec<String> {
    let mut concerns: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || !CONCERN_KEYWORDS.is_match(line) {
            continue;
        }
        let line: String = line.chars().take(MAX_CONCERN_CHARS).collect();
        if !concerns.contains(&line) {
            concerns.push(line);
        }
        if concerns.len() == MAX_CONCERNS {
            break;
        }
    }
    concerns
}
