//! HealthPlan Extract: turns raw document text into a validated health record.
//!
//! The generation-backed requester is tried first; the keyword pattern
//! extractor is the dependency-free floor when it fails.

pub mod patterns;
pub mod prompt;
pub mod requester;
pub mod validate;

pub use patterns::PatternExtractor;
pub use requester::{ExtractionRequest, ExtractionRequester};
pub use validate::{validate_record, RejectedValue, ValidatedRecord};

use sha2::{Digest, Sha256};

/// SHA-256 fingerprint of a document, insensitive to whitespace layout.
pub fn document_fingerprint(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}
