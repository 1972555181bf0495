//! Structured health records extracted from one document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json::{coerce_number, coerce_string_list};
use crate::metric::MetricKind;

/// One nullable value per metric. Every key is always present on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthMetrics {
    #[serde(rename = "cholesterolTotal")]
    pub cholesterol_total: Option<f64>,
    #[serde(rename = "cholesterolLDL")]
    pub cholesterol_ldl: Option<f64>,
    #[serde(rename = "cholesterolHDL")]
    pub cholesterol_hdl: Option<f64>,
    pub triglycerides: Option<f64>,
    pub glucose: Option<f64>,
    #[serde(rename = "HbA1c")]
    pub hba1c: Option<f64>,
    #[serde(rename = "vitaminD")]
    pub vitamin_d: Option<f64>,
    #[serde(rename = "vitaminB12")]
    pub vitamin_b12: Option<f64>,
    pub iron: Option<f64>,
    pub ferritin: Option<f64>,
    #[serde(rename = "TSH")]
    pub tsh: Option<f64>,
    pub creatinine: Option<f64>,
    #[serde(rename = "bodyFatPercentage")]
    pub body_fat_percentage: Option<f64>,
    #[serde(rename = "muscleMass")]
    pub muscle_mass: Option<f64>,
    #[serde(rename = "bodyWeight")]
    pub body_weight: Option<f64>,
    #[serde(rename = "BMI")]
    pub bmi: Option<f64>,
    #[serde(rename = "visceralFat")]
    pub visceral_fat: Option<f64>,
    #[serde(rename = "basalMetabolicRate")]
    pub basal_metabolic_rate: Option<f64>,
    #[serde(rename = "bloodPressureSystolic")]
    pub blood_pressure_systolic: Option<f64>,
    #[serde(rename = "bloodPressureDiastolic")]
    pub blood_pressure_diastolic: Option<f64>,
    #[serde(rename = "restingHeartRate")]
    pub resting_heart_rate: Option<f64>,
}

impl HealthMetrics {
    fn slot(&mut self, kind: MetricKind) -> &mut Option<f64> {
        match kind {
            MetricKind::CholesterolTotal => &mut self.cholesterol_total,
            MetricKind::CholesterolLdl => &mut self.cholesterol_ldl,
            MetricKind::CholesterolHdl => &mut self.cholesterol_hdl,
            MetricKind::Triglycerides => &mut self.triglycerides,
            MetricKind::Glucose => &mut self.glucose,
            MetricKind::Hba1c => &mut self.hba1c,
            MetricKind::VitaminD => &mut self.vitamin_d,
            MetricKind::VitaminB12 => &mut self.vitamin_b12,
            MetricKind::Iron => &mut self.iron,
            MetricKind::Ferritin => &mut self.ferritin,
            MetricKind::Tsh => &mut self.tsh,
            MetricKind::Creatinine => &mut self.creatinine,
            MetricKind::BodyFatPercentage => &mut self.body_fat_percentage,
            MetricKind::MuscleMass => &mut self.muscle_mass,
            MetricKind::BodyWeight => &mut self.body_weight,
            MetricKind::Bmi => &mut self.bmi,
            MetricKind::VisceralFat => &mut self.visceral_fat,
            MetricKind::BasalMetabolicRate => &mut self.basal_metabolic_rate,
            MetricKind::BloodPressureSystolic => &mut self.blood_pressure_systolic,
            MetricKind::BloodPressureDiastolic => &mut self.blood_pressure_diastolic,
            MetricKind::RestingHeartRate => &mut self.resting_heart_rate,
        }
    }

    pub fn get(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::CholesterolTotal => self.cholesterol_total,
            MetricKind::CholesterolLdl => self.cholesterol_ldl,
            MetricKind::CholesterolHdl => self.cholesterol_hdl,
            MetricKind::Triglycerides => self.triglycerides,
            MetricKind::Glucose => self.glucose,
            MetricKind::Hba1c => self.hba1c,
            MetricKind::VitaminD => self.vitamin_d,
            MetricKind::VitaminB12 => self.vitamin_b12,
            MetricKind::Iron => self.iron,
            MetricKind::Ferritin => self.ferritin,
            MetricKind::Tsh => self.tsh,
            MetricKind::Creatinine => self.creatinine,
            MetricKind::BodyFatPercentage => self.body_fat_percentage,
            MetricKind::MuscleMass => self.muscle_mass,
            MetricKind::BodyWeight => self.body_weight,
            MetricKind::Bmi => self.bmi,
            MetricKind::VisceralFat => self.visceral_fat,
            MetricKind::BasalMetabolicRate => self.basal_metabolic_rate,
            MetricKind::BloodPressureSystolic => self.blood_pressure_systolic,
            MetricKind::BloodPressureDiastolic => self.blood_pressure_diastolic,
            MetricKind::RestingHeartRate => self.resting_heart_rate,
        }
    }

    pub fn set(&mut self, kind: MetricKind, value: Option<f64>) {
        *self.slot(kind) = value;
    }

    /// Present metrics in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (MetricKind, f64)> + '_ {
        MetricKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|v| (kind, v)))
    }

    pub fn count_present(&self) -> usize {
        self.present().count()
    }

    /// Build from a loosely-typed object, coercing each metric leniently.
    /// Unknown keys are ignored; unusable values become `None`.
    pub fn from_json_lenient(object: &Map<String, Value>) -> Self {
        let mut metrics = Self::default();
        for kind in MetricKind::ALL {
            let value = object.get(kind.key()).and_then(coerce_number);
            metrics.set(kind, value);
        }
        metrics
    }
}

/// Validated snapshot of numeric health metrics from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    #[serde(flatten)]
    pub metrics: HealthMetrics,
    #[serde(default, rename = "dietaryRecommendations")]
    pub dietary_recommendations: Vec<String>,
    #[serde(default, rename = "healthConcerns")]
    pub health_concerns: Vec<String>,
    #[serde(default, rename = "abnormalValues")]
    pub abnormal_values: Vec<String>,
    #[serde(default, rename = "rawSummary")]
    pub raw_summary: String,
}

impl HealthRecord {
    /// Merge a loosely-typed object over the all-null template.
    ///
    /// Metric values may sit at the top level or under a `metrics` object;
    /// top-level values win.
    pub fn from_json_lenient(object: &Map<String, Value>) -> Self {
        let mut metrics = match object.get("metrics") {
            Some(Value::Object(nested)) => HealthMetrics::from_json_lenient(nested),
            _ => HealthMetrics::default(),
        };
        for (kind, value) in HealthMetrics::from_json_lenient(object).present() {
            metrics.set(kind, Some(value));
        }

        Self {
            metrics,
            dietary_recommendations: coerce_string_list(object.get("dietaryRecommendations")),
            health_concerns: coerce_string_list(object.get("healthConcerns")),
            abnormal_values: coerce_string_list(object.get("abnormalValues")),
            raw_summary: object
                .get("rawSummary")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_key_serialized() {
        let record = HealthRecord::default();
        let value = serde_json::to_value(&record).unwrap();
        for kind in MetricKind::ALL {
            assert!(value.get(kind.key()).unwrap().is_null(), "{}", kind);
        }
        assert!(value["dietaryRecommendations"].is_array());
        assert_eq!(value["rawSummary"], "");
    }

    #[test]
    fn test_deserialize_partial() {
        let record: HealthRecord =
            serde_json::from_value(json!({"cholesterolTotal": 220, "BMI": 27.5})).unwrap();
        assert_eq!(record.metrics.cholesterol_total, Some(220.0));
        assert_eq!(record.metrics.bmi, Some(27.5));
        assert_eq!(record.metrics.glucose, None);
        assert!(record.health_concerns.is_empty());
    }

    #[test]
    fn test_get_set_cover_all() {
        let mut metrics = HealthMetrics::default();
        for (i, kind) in MetricKind::ALL.into_iter().enumerate() {
            metrics.set(kind, Some(i as f64));
        }
        for (i, kind) in MetricKind::ALL.into_iter().enumerate() {
            assert_eq!(metrics.get(kind), Some(i as f64));
        }
        assert_eq!(metrics.count_present(), MetricKind::ALL.len());
    }

    #[test]
    fn test_lenient_merge() {
        let object = json!({
            "metrics": {"glucose": "95 mg/dL", "HbA1c": 5.4},
            "HbA1c": 5.9,
            "vitaminD": "unknown",
            "healthConcerns": ["Borderline HbA1c"],
            "rawSummary": "  Annual panel  ",
            "unrelated": 1
        });
        let record = HealthRecord::from_json_lenient(object.as_object().unwrap());
        assert_eq!(record.metrics.glucose, Some(95.0));
        assert_eq!(record.metrics.hba1c, Some(5.9));
        assert_eq!(record.metrics.vitamin_d, None);
        assert_eq!(record.health_concerns, vec!["Borderline HbA1c"]);
        assert_eq!(record.raw_summary, "Annual panel");
    }
}
