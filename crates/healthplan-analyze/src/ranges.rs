//! Clinical reference ranges and metric classification.
//!
//! The table is static data. Metrics the rule engine consults are named
//! fields, so a missing entry fails to compile rather than at runtime.

use healthplan_core::{format_value, MetricKind};
use serde::{Deserialize, Serialize};

use crate::types::MetricStatus;

/// Values beyond `high * CONCERNING_FACTOR` (or below `low / CONCERNING_FACTOR`)
/// are classified as concerning rather than elevated/low.
const CONCERNING_FACTOR: f64 = 1.25;

/// Which side of the range is favourable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
    /// Best near `optimal`, within 10% of the range width.
    Band,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthMetricRange {
    pub low: f64,
    pub high: f64,
    pub optimal: f64,
    pub polarity: Polarity,
}

impl HealthMetricRange {
    const fn new(low: f64, high: f64, optimal: f64, polarity: Polarity) -> Self {
        Self {
            low,
            high,
            optimal,
            polarity,
        }
    }

    pub fn classify(&self, value: f64) -> MetricStatus {
        if value > self.high {
            return if value >= self.high * CONCERNING_FACTOR {
                MetricStatus::Concerning
            } else {
                MetricStatus::Elevated
            };
        }
        if value < self.low {
            return if value <= self.low / CONCERNING_FACTOR {
                MetricStatus::Concerning
            } else {
                MetricStatus::Low
            };
        }
        let optimal = match self.polarity {
            Polarity::LowerIsBetter => value <= self.optimal,
            Polarity::HigherIsBetter => value >= self.optimal,
            Polarity::Band => (value - self.optimal).abs() <= (self.high - self.low) * 0.1,
        };
        if optimal {
            MetricStatus::Optimal
        } else {
            MetricStatus::Normal
        }
    }
}

/// Upper boundaries of the BMI categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BmiCategories {
    pub underweight: f64,
    pub normal: f64,
    pub overweight: f64,
}

/// Upper boundaries of the body-fat categories; above `average` is obese.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyFatCategories {
    pub athletic: f64,
    pub fitness: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PressurePair {
    pub systolic: f64,
    pub diastolic: f64,
}

/// `low`: below is hypotension; `normal`: at or below is optimal;
/// `high`: above is hypertension; `crisis`: at or above is concerning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BloodPressureCategories {
    pub low: PressurePair,
    pub normal: PressurePair,
    pub high: PressurePair,
    pub crisis: PressurePair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// The full reference table.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceRanges {
    pub cholesterol_total: HealthMetricRange,
    pub cholesterol_ldl: HealthMetricRange,
    pub cholesterol_hdl: HealthMetricRange,
    pub triglycerides: HealthMetricRange,
    pub glucose: HealthMetricRange,
    pub hba1c: HealthMetricRange,
    pub vitamin_d: HealthMetricRange,
    pub vitamin_b12: HealthMetricRange,
    pub iron: HealthMetricRange,
    pub ferritin: HealthMetricRange,
    pub tsh: HealthMetricRange,
    pub creatinine: HealthMetricRange,
    pub visceral_fat: HealthMetricRange,
    pub resting_heart_rate: HealthMetricRange,
    pub bmi: BmiCategories,
    pub body_fat_male: BodyFatCategories,
    pub body_fat_female: BodyFatCategories,
    pub blood_pressure: BloodPressureCategories,
}

pub static REFERENCE_RANGES: ReferenceRanges = ReferenceRanges {
    cholesterol_total: HealthMetricRange::new(125.0, 200.0, 180.0, Polarity::LowerIsBetter),
    cholesterol_ldl: HealthMetricRange::new(0.0, 130.0, 100.0, Polarity::LowerIsBetter),
    cholesterol_hdl: HealthMetricRange::new(40.0, 150.0, 60.0, Polarity::HigherIsBetter),
    triglycerides: HealthMetricRange::new(0.0, 150.0, 100.0, Polarity::LowerIsBetter),
    glucose: HealthMetricRange::new(70.0, 126.0, 100.0, Polarity::LowerIsBetter),
    hba1c: HealthMetricRange::new(4.0, 6.5, 5.7, Polarity::LowerIsBetter),
    vitamin_d: HealthMetricRange::new(30.0, 100.0, 50.0, Polarity::HigherIsBetter),
    vitamin_b12: HealthMetricRange::new(200.0, 900.0, 500.0, Polarity::Band),
    iron: HealthMetricRange::new(60.0, 170.0, 115.0, Polarity::Band),
    ferritin: HealthMetricRange::new(30.0, 300.0, 100.0, Polarity::Band),
    tsh: HealthMetricRange::new(0.4, 4.0, 2.0, Polarity::Band),
    creatinine: HealthMetricRange::new(0.6, 1.3, 0.9, Polarity::Band),
    visceral_fat: HealthMetricRange::new(1.0, 12.0, 9.0, Polarity::LowerIsBetter),
    resting_heart_rate: HealthMetricRange::new(50.0, 100.0, 65.0, Polarity::Band),
    bmi: BmiCategories {
        underweight: 18.5,
        normal: 25.0,
        overweight: 30.0,
    },
    body_fat_male: BodyFatCategories {
        athletic: 13.0,
        fitness: 17.0,
        average: 24.0,
    },
    body_fat_female: BodyFatCategories {
        athletic: 20.0,
        fitness: 24.0,
        average: 31.0,
    },
    blood_pressure: BloodPressureCategories {
        low: PressurePair {
            systolic: 90.0,
            diastolic: 60.0,
        },
        normal: PressurePair {
            systolic: 120.0,
            diastolic: 80.0,
        },
        high: PressurePair {
            systolic: 140.0,
            diastolic: 90.0,
        },
        crisis: PressurePair {
            systolic: 180.0,
            diastolic: 120.0,
        },
    },
};

impl ReferenceRanges {
    /// Simple `{low, high, optimal}` range for a metric, if it has one.
    pub fn range(&self, kind: MetricKind) -> Option<&HealthMetricRange> {
        match kind {
            MetricKind::CholesterolTotal => Some(&self.cholesterol_total),
            MetricKind::CholesterolLdl => Some(&self.cholesterol_ldl),
            MetricKind::CholesterolHdl => Some(&self.cholesterol_hdl),
            MetricKind::Triglycerides => Some(&self.triglycerides),
            MetricKind::Glucose => Some(&self.glucose),
            MetricKind::Hba1c => Some(&self.hba1c),
            MetricKind::VitaminD => Some(&self.vitamin_d),
            MetricKind::VitaminB12 => Some(&self.vitamin_b12),
            MetricKind::Iron => Some(&self.iron),
            MetricKind::Ferritin => Some(&self.ferritin),
            MetricKind::Tsh => Some(&self.tsh),
            MetricKind::Creatinine => Some(&self.creatinine),
            MetricKind::VisceralFat => Some(&self.visceral_fat),
            MetricKind::RestingHeartRate => Some(&self.resting_heart_rate),
            MetricKind::BodyFatPercentage
            | MetricKind::MuscleMass
            | MetricKind::BodyWeight
            | MetricKind::Bmi
            | MetricKind::BasalMetabolicRate
            | MetricKind::BloodPressureSystolic
            | MetricKind::BloodPressureDiastolic => None,
        }
    }

    pub fn body_fat(&self, sex: Option<Sex>) -> &BodyFatCategories {
        match sex {
            Some(Sex::Male) => &self.body_fat_male,
            // Unknown sex uses the female table, whose thresholds are higher.
            Some(Sex::Female) | None => &self.body_fat_female,
        }
    }

    /// Classify a value. Muscle mass, body weight and BMR carry no range.
    pub fn classify(&self, kind: MetricKind, value: f64, sex: Option<Sex>) -> Option<MetricStatus> {
        if let Some(range) = self.range(kind) {
            return Some(range.classify(value));
        }
        let bp = &self.blood_pressure;
        let status = match kind {
            MetricKind::Bmi => {
                if value < self.bmi.underweight {
                    MetricStatus::Low
                } else if value < self.bmi.normal {
                    MetricStatus::Optimal
                } else if value < self.bmi.overweight {
                    MetricStatus::Elevated
                } else {
                    MetricStatus::Concerning
                }
            }
            MetricKind::BodyFatPercentage => {
                let cats = self.body_fat(sex);
                if value <= cats.fitness {
                    MetricStatus::Optimal
                } else if value <= cats.average {
                    MetricStatus::Normal
                } else {
                    MetricStatus::Elevated
                }
            }
            MetricKind::BloodPressureSystolic => pressure_status(
                value,
                bp.low.systolic,
                bp.normal.systolic,
                bp.high.systolic,
                bp.crisis.systolic,
            ),
            MetricKind::BloodPressureDiastolic => pressure_status(
                value,
                bp.low.diastolic,
                bp.normal.diastolic,
                bp.high.diastolic,
                bp.crisis.diastolic,
            ),
            _ => return None,
        };
        Some(status)
    }

    /// One line per metric, for generation prompts.
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = MetricKind::ALL
            .iter()
            .filter_map(|kind| {
                self.range(*kind).map(|r| {
                    format!(
                        "- {} ({}): normal {}-{}, optimal {}",
                        kind.key(),
                        kind.unit(),
                        format_value(r.low),
                        format_value(r.high),
                        format_value(r.optimal)
                    )
                })
            })
            .collect();
        lines.push(format!(
            "- BMI: underweight < {}, normal < {}, overweight < {}, obese above",
            format_value(self.bmi.underweight),
            format_value(self.bmi.normal),
            format_value(self.bmi.overweight)
        ));
        lines.push(format!(
            concat!(
                "- bloodPressureSystolic/bloodPressureDiastolic (mmHg): ",
                "low < {}/{}, normal <= {}/{}, high > {}/{}"
            ),
            format_value(self.blood_pressure.low.systolic),
            format_value(self.blood_pressure.low.diastolic),
            format_value(self.blood_pressure.normal.systolic),
            format_value(self.blood_pressure.normal.diastolic),
            format_value(self.blood_pressure.high.systolic),
            format_value(self.blood_pressure.high.diastolic)
        ));
        lines.push(format!(
            "- bodyFatPercentage (%): men average <= {}, women average <= {}",
            format_value(self.body_fat_male.average),
            format_value(self.body_fat_female.average)
        ));
        lines
    }
}

fn pressure_status(value: f64, low: f64, normal: f64, high: f64, crisis: f64) -> MetricStatus {
    if value >= crisis {
        MetricStatus::Concerning
    } else if value > high {
        MetricStatus::Elevated
    } else if value < low {
        MetricStatus::Low
    } else if value <= normal {
        MetricStatus::Optimal
    } else {
        MetricStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::MetricKind as K;
    use super::MetricStatus as S;

    #[test]
    fn test_simple_classification() {
        let r = &REFERENCE_RANGES;
        assert_eq!(r.classify(K::CholesterolTotal, 170.0, None), Some(S::Optimal));
        assert_eq!(r.classify(K::CholesterolTotal, 190.0, None), Some(S::Normal));
        assert_eq!(r.classify(K::CholesterolTotal, 220.0, None), Some(S::Elevated));
        assert_eq!(r.classify(K::CholesterolTotal, 260.0, None), Some(S::Concerning));
        assert_eq!(r.classify(K::VitaminD, 25.0, None), Some(S::Low));
        assert_eq!(r.classify(K::VitaminD, 20.0, None), Some(S::Concerning));
        assert_eq!(r.classify(K::CholesterolHdl, 75.0, None), Some(S::Optimal));
        assert_eq!(r.classify(K::Tsh, 2.1, None), Some(S::Optimal));
        assert_eq!(r.classify(K::Tsh, 3.5, None), Some(S::Normal));
    }

    #[test]
    fn test_composite_classification() {
        let r = &REFERENCE_RANGES;
        assert_eq!(r.classify(K::Bmi, 17.0, None), Some(S::Low));
        assert_eq!(r.classify(K::Bmi, 22.0, None), Some(S::Optimal));
        assert_eq!(r.classify(K::Bmi, 27.0, None), Some(S::Elevated));
        assert_eq!(r.classify(K::Bmi, 32.0, None), Some(S::Concerning));

        assert_eq!(r.classify(K::BloodPressureSystolic, 118.0, None), Some(S::Optimal));
        assert_eq!(r.classify(K::BloodPressureSystolic, 140.0, None), Some(S::Normal));
        assert_eq!(r.classify(K::BloodPressureSystolic, 150.0, None), Some(S::Elevated));
        assert_eq!(r.classify(K::BloodPressureDiastolic, 125.0, None), Some(S::Concerning));
        assert_eq!(r.classify(K::BloodPressureDiastolic, 55.0, None), Some(S::Low));
    }

    #[test]
    fn test_body_fat_by_sex() {
        let r = &REFERENCE_RANGES;
        let fat = K::BodyFatPercentage;
        assert_eq!(r.classify(fat, 28.0, Some(Sex::Male)), Some(S::Elevated));
        assert_eq!(r.classify(fat, 28.0, Some(Sex::Female)), Some(S::Normal));
        assert_eq!(r.classify(fat, 15.0, None), Some(S::Optimal));
        // Unknown sex follows the female thresholds.
        assert_eq!(r.classify(fat, 28.0, None), Some(S::Normal));
    }

    #[test]
    fn test_unranged_metrics() {
        assert_eq!(REFERENCE_RANGES.classify(K::BodyWeight, 80.0, None), None);
        assert_eq!(REFERENCE_RANGES.classify(K::MuscleMass, 35.0, None), None);
    }

    #[test]
    fn test_describe_mentions_thresholds() {
        let lines = REFERENCE_RANGES.describe();
        assert!(lines.iter().any(|l| l.starts_with("- cholesterolTotal (mg/dL): normal 125-200")));
        assert!(lines.iter().any(|l| l.contains("high > 140/90")));
    }
}
