//! Health analysis: clinical reference ranges and the rule engine that
//! turns validated records into concerns, positives and dietary guidance.

pub mod ranges;
pub mod rules;
pub mod types;

pub use ranges::{HealthMetricRange, Polarity, ReferenceRanges, Sex, REFERENCE_RANGES};
pub use rules::RuleEngine;
pub use types::*;
