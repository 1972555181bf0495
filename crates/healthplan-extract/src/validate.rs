//! Physiological-bounds validation of candidate records.

use serde::Serialize;
use tracing::warn;

use healthplan_core::{Error, HealthRecord, MetricKind};

/// A metric value discarded because it fell outside its bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedValue {
    pub metric: MetricKind,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&RejectedValue> for Error {
    fn from(rejected: &RejectedValue) -> Self {
        Error::ValidationRejected {
            metric: rejected.metric.key().to_string(),
            value: rejected.value,
            min: rejected.min,
            max: rejected.max,
        }
    }
}

/// A record whose present values all lie within bounds, plus what was dropped.
#[derive(Debug, Clone, Default)]
pub struct ValidatedRecord {
    pub record: HealthRecord,
    pub rejected: Vec<RejectedValue>,
}

impl ValidatedRecord {
    /// Human-readable warnings for the rejected values.
    pub fn warnings(&self) -> Vec<String> {
        self.rejected
            .iter()
            .map(|r| Error::from(r).to_string())
            .collect()
    }
}

/// Null every value outside its physiological bounds. Never fails.
pub fn validate_record(mut record: HealthRecord) -> ValidatedRecord {
    let mut rejected = Vec::new();
    for kind in MetricKind::ALL {
        let Some(value) = record.metrics.get(kind) else {
            continue;
        };
        let bounds = kind.bounds();
        if bounds.contains(value) {
            continue;
        }
        warn!(
            "Rejected {} = {}: outside physiological bounds {}-{}",
            kind, value, bounds.min, bounds.max
        );
        record.metrics.set(kind, None);
        rejected.push(RejectedValue {
            metric: kind,
            value,
            min: bounds.min,
            max: bounds.max,
        });
    }

    clean_list(&mut record.dietary_recommendations);
    clean_list(&mut record.health_concerns);
    clean_list(&mut record.abnormal_values);
    record.raw_summary = record.raw_summary.trim().to_string();

    ValidatedRecord { record, rejected }
}

fn clean_list(items: &mut Vec<String>) {
    *items = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(kind: MetricKind, value: f64) -> HealthRecord {
        let mut record = HealthRecord::default();
        record.metrics.set(kind, Some(value));
        record
    }

    #[test]
    fn test_out_of_bounds_bmi_nulled() {
        for bmi in [9.9, 80.1, -3.0, 250.0] {
            let validated = validate_record(record_with(MetricKind::Bmi, bmi));
            assert_eq!(validated.record.metrics.bmi, None, "bmi {bmi}");
            assert_eq!(validated.rejected.len(), 1);
        }
        for bmi in [10.0, 22.5, 80.0] {
            let validated = validate_record(record_with(MetricKind::Bmi, bmi));
            assert_eq!(validated.record.metrics.bmi, Some(bmi));
            assert!(validated.rejected.is_empty());
        }
    }

    #[test]
    fn test_every_surviving_value_in_bounds() {
        let mut record = HealthRecord::default();
        for (i, kind) in MetricKind::ALL.into_iter().enumerate() {
            let value = match i % 4 {
                0 => kind.bounds().min - 1.0,
                1 => kind.bounds().max + 1.0,
                2 => f64::NAN,
                _ => (kind.bounds().min + kind.bounds().max) / 2.0,
            };
            record.metrics.set(kind, Some(value));
        }
        let validated = validate_record(record);
        for (kind, value) in validated.record.metrics.present() {
            assert!(kind.bounds().contains(value), "{kind} = {value}");
        }
        assert_eq!(
            validated.record.metrics.count_present() + validated.rejected.len(),
            MetricKind::ALL.len()
        );
    }

    #[test]
    fn test_no_clamping() {
        let validated = validate_record(record_with(MetricKind::CholesterolTotal, 620.0));
        assert_eq!(validated.record.metrics.cholesterol_total, None);
        assert_eq!(
            validated.warnings(),
            vec!["Rejected cholesterolTotal = 620: outside physiological bounds 50-500"]
        );
    }

    #[test]
    fn test_lists_cleaned() {
        let mut record = HealthRecord::default();
        record.health_concerns = vec!["  High LDL ".into(), "".into(), "   ".into()];
        record.raw_summary = " summary \n".into();
        let validated = validate_record(record);
        assert_eq!(validated.record.health_concerns, vec!["High LDL"]);
        assert_eq!(validated.record.raw_summary, "summary");
    }
}
