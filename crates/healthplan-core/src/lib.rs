//! HealthPlan Core: error type, configuration, the closed metric set,
//! health records, and the tagged `Outcome` threaded through every stage.

pub mod config;
pub mod error;
pub mod json;
pub mod metric;
pub mod outcome;
pub mod record;

pub use config::{DataPaths, HealthPlanConfig, RateLimits};
pub use error::{Error, Result};
pub use metric::{format_value, MetricBounds, MetricKind};
pub use outcome::Outcome;
pub use record::{HealthMetrics, HealthRecord};
