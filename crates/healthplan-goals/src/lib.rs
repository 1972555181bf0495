//! HealthPlan Goals: nutrition goal suggestions from analyzed health records.
//!
//! `GoalRequester` asks the generation service for a suggestion;
//! `synthesize_goal` is the deterministic path used when that fails.

pub mod fallback;
pub mod prompt;
pub mod requester;
pub mod types;

pub use fallback::synthesize_goal;
pub use requester::{parse_goal_reply, GoalRequester};
pub use types::*;
