//! Error types for HealthPlan.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required input: {0}")]
    InputMissing(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Rejected {metric} = {value}: outside physiological bounds {min}-{max}")]
    ValidationRejected {
        metric: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Goal suggestion parse failed: {0}")]
    GoalParseFailed(String),

    #[error("Rate limit exceeded for {action}; retry after {retry_after_secs}s")]
    RateLimited {
        action: String,
        retry_after_secs: u64,
    },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Generation timed out after {0}ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the pipeline recovers from this error through a fallback path.
    ///
    /// `InputMissing` and `RateLimited` are fatal to the request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InputMissing(_) | Self::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(!Error::InputMissing("documentText".into()).is_recoverable());
        assert!(!Error::RateLimited {
            action: "document_upload".into(),
            retry_after_secs: 60,
        }
        .is_recoverable());
        assert!(Error::Timeout(30_000).is_recoverable());
        assert!(Error::GoalParseFailed("no block".into()).is_recoverable());
    }

    #[test]
    fn test_validation_message() {
        let err = Error::ValidationRejected {
            metric: "BMI".into(),
            value: 95.0,
            min: 10.0,
            max: 80.0,
        };
        assert_eq!(
            err.to_string(),
            "Rejected BMI = 95: outside physiological bounds 10-80"
        );
    }
}
