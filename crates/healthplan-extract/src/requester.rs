//! Metric extraction through the text-generation service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use healthplan_core::json::parse_json_block;
use healthplan_core::{Error, HealthRecord, Result};
use healthplan_generate::{generate_with_timeout, TextGenerator};

use crate::prompt::build_extraction_prompt;

/// Caller input for the extraction entrypoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    #[serde(default, rename = "documentText")]
    pub document_text: String,
    #[serde(default = "default_document_type", rename = "documentType")]
    pub document_type: String,
}

fn default_document_type() -> String {
    "health_document".into()
}

impl ExtractionRequest {
    pub fn new(document_text: impl Into<String>, document_type: impl Into<String>) -> Self {
        Self {
            document_text: document_text.into(),
            document_type: document_type.into(),
        }
    }

    /// Reject requests without document text.
    pub fn validate(&self) -> Result<()> {
        if self.document_text.trim().is_empty() {
            return Err(Error::InputMissing("documentText".into()));
        }
        Ok(())
    }
}

/// Sends one extraction request and parses the reply into a candidate record.
pub struct ExtractionRequester<'a> {
    generator: &'a dyn TextGenerator,
    timeout: Duration,
}

impl<'a> ExtractionRequester<'a> {
    pub fn new(generator: &'a dyn TextGenerator, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Every failure is reported as `ExtractionFailed`.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<HealthRecord> {
        let prompt = build_extraction_prompt(&request.document_text, &request.document_type);
        let reply = generate_with_timeout(self.generator, &prompt, self.timeout)
            .await
            .map_err(|e| {
                warn!("Extraction request via {} failed: {}", self.generator.name(), e);
                Error::ExtractionFailed(e.to_string())
            })?;
        parse_extraction_reply(&reply)
    }
}

/// Parse a generated reply into a record over the all-null template.
pub fn parse_extraction_reply(reply: &str) -> Result<HealthRecord> {
    let object = parse_json_block(reply).map_err(|e| {
        warn!("Unusable extraction reply ({} chars): {}", reply.len(), e);
        Error::ExtractionFailed(e.to_string())
    })?;
    let record = HealthRecord::from_json_lenient(&object);
    debug!(
        "Parsed extraction reply: {} metrics present",
        record.metrics.count_present()
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthplan_generate::{NoopGenerator, StaticGenerator};

    const REPLY: &str = r#"Sure! Here is the data:
```json
{
  "cholesterolTotal": 232,
  "cholesterolLDL": "151 mg/dL",
  "glucose": null,
  "BMI": 28.4,
  "healthConcerns": ["Elevated LDL"],
  "dietaryRecommendations": ["Reduce saturated fat"],
  "rawSummary": "Lipid panel with elevated LDL."
}
```"#;

    #[tokio::test]
    async fn test_extract_success() {
        let generator = StaticGenerator::new(REPLY);
        let requester = ExtractionRequester::new(&generator, Duration::from_secs(1));
        let record = requester
            .extract(&ExtractionRequest::new("Total cholesterol 232", "lab_report"))
            .await
            .unwrap();
        assert_eq!(record.metrics.cholesterol_total, Some(232.0));
        assert_eq!(record.metrics.cholesterol_ldl, Some(151.0));
        assert_eq!(record.metrics.glucose, None);
        assert_eq!(record.metrics.bmi, Some(28.4));
        assert_eq!(record.health_concerns, vec!["Elevated LDL"]);
        assert_eq!(record.raw_summary, "Lipid panel with elevated LDL.");
    }

    #[tokio::test]
    async fn test_service_error_is_extraction_failed() {
        let requester = ExtractionRequester::new(&NoopGenerator, Duration::from_secs(1));
        let err = requester
            .extract(&ExtractionRequest::new("text", "lab_report"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_extraction_failed() {
        let generator = StaticGenerator::new(REPLY).with_delay(Duration::from_millis(200));
        let requester = ExtractionRequester::new(&generator, Duration::from_millis(10));
        let err = requester
            .extract(&ExtractionRequest::new("text", "lab_report"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_unparsable_replies() {
        assert!(parse_extraction_reply("I could not read this document.").is_err());
        assert!(parse_extraction_reply("{\"cholesterolTotal\": 220,").is_err());
        assert!(parse_extraction_reply("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_empty_object_is_all_null() {
        let record = parse_extraction_reply("{}").unwrap();
        assert_eq!(record, HealthRecord::default());
    }

    #[test]
    fn test_request_validation() {
        assert!(ExtractionRequest::new("   ", "lab_report").validate().is_err());
        assert!(ExtractionRequest::new("BMI 22", "lab_report").validate().is_ok());
        let parsed: ExtractionRequest =
            serde_json::from_str(r#"{"documentText": "BMI 22"}"#).unwrap();
        assert_eq!(parsed.document_type, "health_document");
    }
}
