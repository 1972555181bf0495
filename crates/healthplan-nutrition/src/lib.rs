//! HealthPlan Nutrition: sums a week of planned meals into daily and weekly
//! totals and tracks progress against a goal's daily targets.

pub mod aggregate;
pub mod types;

pub use aggregate::aggregate_week;
pub use types::*;
