//! Extraction prompt construction.

use healthplan_analyze::REFERENCE_RANGES;
use healthplan_core::MetricKind;

/// Documents longer than this are truncated before prompting.
pub const MAX_DOCUMENT_CHARS: usize = 12_000;

/// Build the extraction prompt for one document.
pub fn build_extraction_prompt(document_text: &str, document_type: &str) -> String {
    let metric_keys: Vec<String> = MetricKind::ALL
        .iter()
        .map(|kind| format!("    \"{}\": null", kind.key()))
        .collect();

    let units: Vec<String> = MetricKind::ALL
        .iter()
        .map(|kind| format!("- {}: {} ({})", kind.key(), kind.label(), kind.unit()))
        .collect();

    format!(
        "Extract health metrics from this {doc_type} document.\n\n\
Return ONLY a JSON object with exactly this shape. Use a number for every metric \
found in the document, converted to the listed unit, and null for every metric \
that is absent. Do not guess values.\n\n\
{{\n{keys},\n    \"dietaryRecommendations\": [],\n    \"healthConcerns\": [],\n    \
\"abnormalValues\": [],\n    \"rawSummary\": \"\"\n}}\n\n\
Metric units:\n{units}\n\n\
Reference ranges (use them to fill abnormalValues and healthConcerns):\n{ranges}\n\n\
dietaryRecommendations: dietary advice stated in the document.\n\
healthConcerns: clinically relevant findings, one short sentence each.\n\
abnormalValues: each out-of-range metric as \"name: value unit\".\n\
rawSummary: two sentences summarising the document.\n\n\
Document:\n\"\"\"\n{text}\n\"\"\"",
        doc_type = document_type,
        keys = metric_keys.join(",\n"),
        units = units.join("\n"),
        ranges = REFERENCE_RANGES.describe().join("\n"),
        text = truncate_chars(document_text.trim(), MAX_DOCUMENT_CHARS),
    )
}

/// Truncate on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_metric() {
        let prompt = build_extraction_prompt("Cholesterol: 220", "lab_report");
        for kind in MetricKind::ALL {
            assert!(prompt.contains(&format!("\"{}\": null", kind.key())));
        }
        assert!(prompt.contains("lab_report"));
        assert!(prompt.contains("Cholesterol: 220"));
        assert!(prompt.contains("cholesterolTotal (mg/dL): normal 125-200"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
