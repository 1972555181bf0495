//! The closed set of health metrics and their physiological bounds.

use serde::{Deserialize, Serialize};

/// Hard physiological bounds. Values outside are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricBounds {
    pub min: f64,
    pub max: f64,
}

impl MetricBounds {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Every metric a health record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "cholesterolTotal")]
    CholesterolTotal,
    #[serde(rename = "cholesterolLDL")]
    CholesterolLdl,
    #[serde(rename = "cholesterolHDL")]
    CholesterolHdl,
    #[serde(rename = "triglycerides")]
    Triglycerides,
    #[serde(rename = "glucose")]
    Glucose,
    #[serde(rename = "HbA1c")]
    Hba1c,
    #[serde(rename = "vitaminD")]
    VitaminD,
    #[serde(rename = "vitaminB12")]
    VitaminB12,
    #[serde(rename = "iron")]
    Iron,
    #[serde(rename = "ferritin")]
    Ferritin,
    #[serde(rename = "TSH")]
    Tsh,
    #[serde(rename = "creatinine")]
    Creatinine,
    #[serde(rename = "bodyFatPercentage")]
    BodyFatPercentage,
    #[serde(rename = "muscleMass")]
    MuscleMass,
    #[serde(rename = "bodyWeight")]
    BodyWeight,
    #[serde(rename = "BMI")]
    Bmi,
    #[serde(rename = "visceralFat")]
    VisceralFat,
    #[serde(rename = "basalMetabolicRate")]
    BasalMetabolicRate,
    #[serde(rename = "bloodPressureSystolic")]
    BloodPressureSystolic,
    #[serde(rename = "bloodPressureDiastolic")]
    BloodPressureDiastolic,
    #[serde(rename = "restingHeartRate")]
    RestingHeartRate,
}

impl MetricKind {
    pub const ALL: [MetricKind; 21] = [
        Self::CholesterolTotal,
        Self::CholesterolLdl,
        Self::CholesterolHdl,
        Self::Triglycerides,
        Self::Glucose,
        Self::Hba1c,
        Self::VitaminD,
        Self::VitaminB12,
        Self::Iron,
        Self::Ferritin,
        Self::Tsh,
        Self::Creatinine,
        Self::BodyFatPercentage,
        Self::MuscleMass,
        Self::BodyWeight,
        Self::Bmi,
        Self::VisceralFat,
        Self::BasalMetabolicRate,
        Self::BloodPressureSystolic,
        Self::BloodPressureDiastolic,
        Self::RestingHeartRate,
    ];

    /// Wire key used in records and generation prompts.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CholesterolTotal => "cholesterolTotal",
            Self::CholesterolLdl => "cholesterolLDL",
            Self::CholesterolHdl => "cholesterolHDL",
            Self::Triglycerides => "triglycerides",
            Self::Glucose => "glucose",
            Self::Hba1c => "HbA1c",
            Self::VitaminD => "vitaminD",
            Self::VitaminB12 => "vitaminB12",
            Self::Iron => "iron",
            Self::Ferritin => "ferritin",
            Self::Tsh => "TSH",
            Self::Creatinine => "creatinine",
            Self::BodyFatPercentage => "bodyFatPercentage",
            Self::MuscleMass => "muscleMass",
            Self::BodyWeight => "bodyWeight",
            Self::Bmi => "BMI",
            Self::VisceralFat => "visceralFat",
            Self::BasalMetabolicRate => "basalMetabolicRate",
            Self::BloodPressureSystolic => "bloodPressureSystolic",
            Self::BloodPressureDiastolic => "bloodPressureDiastolic",
            Self::RestingHeartRate => "restingHeartRate",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CholesterolTotal => "Total cholesterol",
            Self::CholesterolLdl => "LDL cholesterol",
            Self::CholesterolHdl => "HDL cholesterol",
            Self::Triglycerides => "Triglycerides",
            Self::Glucose => "Fasting glucose",
            Self::Hba1c => "HbA1c",
            Self::VitaminD => "Vitamin D",
            Self::VitaminB12 => "Vitamin B12",
            Self::Iron => "Iron",
            Self::Ferritin => "Ferritin",
            Self::Tsh => "TSH",
            Self::Creatinine => "Creatinine",
            Self::BodyFatPercentage => "Body fat",
            Self::MuscleMass => "Muscle mass",
            Self::BodyWeight => "Body weight",
            Self::Bmi => "BMI",
            Self::VisceralFat => "Visceral fat",
            Self::BasalMetabolicRate => "Basal metabolic rate",
            Self::BloodPressureSystolic => "Systolic blood pressure",
            Self::BloodPressureDiastolic => "Diastolic blood pressure",
            Self::RestingHeartRate => "Resting heart rate",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::CholesterolTotal
            | Self::CholesterolLdl
            | Self::CholesterolHdl
            | Self::Triglycerides
            | Self::Glucose
            | Self::Creatinine => "mg/dL",
            Self::Hba1c | Self::BodyFatPercentage => "%",
            Self::VitaminD | Self::Ferritin => "ng/mL",
            Self::VitaminB12 => "pg/mL",
            Self::Iron => "mcg/dL",
            Self::Tsh => "mIU/L",
            Self::MuscleMass | Self::BodyWeight => "kg",
            Self::Bmi => "kg/m2",
            Self::VisceralFat => "level",
            Self::BasalMetabolicRate => "kcal",
            Self::BloodPressureSystolic | Self::BloodPressureDiastolic => "mmHg",
            Self::RestingHeartRate => "bpm",
        }
    }

    pub fn bounds(&self) -> MetricBounds {
        match self {
            Self::CholesterolTotal => MetricBounds::new(50.0, 500.0),
            Self::CholesterolLdl => MetricBounds::new(20.0, 400.0),
            Self::CholesterolHdl => MetricBounds::new(10.0, 150.0),
            Self::Triglycerides => MetricBounds::new(20.0, 2000.0),
            Self::Glucose => MetricBounds::new(20.0, 600.0),
            Self::Hba1c => MetricBounds::new(3.0, 20.0),
            Self::VitaminD => MetricBounds::new(4.0, 200.0),
            Self::VitaminB12 => MetricBounds::new(50.0, 3000.0),
            Self::Iron => MetricBounds::new(10.0, 500.0),
            Self::Ferritin => MetricBounds::new(1.0, 2000.0),
            Self::Tsh => MetricBounds::new(0.01, 100.0),
            Self::Creatinine => MetricBounds::new(0.1, 20.0),
            Self::BodyFatPercentage => MetricBounds::new(2.0, 60.0),
            Self::MuscleMass => MetricBounds::new(10.0, 150.0),
            Self::BodyWeight => MetricBounds::new(20.0, 400.0),
            Self::Bmi => MetricBounds::new(10.0, 80.0),
            Self::VisceralFat => MetricBounds::new(1.0, 60.0),
            Self::BasalMetabolicRate => MetricBounds::new(500.0, 5000.0),
            Self::BloodPressureSystolic | Self::BloodPressureDiastolic => {
                MetricBounds::new(50.0, 250.0)
            }
            Self::RestingHeartRate => MetricBounds::new(25.0, 250.0),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Format a metric value without a trailing `.0` for whole numbers.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rounded = format!("{:.2}", value);
        rounded.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
