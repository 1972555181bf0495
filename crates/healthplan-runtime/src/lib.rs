//! Runtime orchestrator: the caller-facing entrypoints of the pipeline.
//!
//! Document text flows through extraction (or the pattern fallback),
//! validation, the rule engine and goal suggestion (or the rule-based
//! fallback). Weekly nutrition aggregation runs independently.

pub mod planner;
pub mod types;

pub use planner::HealthPlanner;
pub use types::*;
