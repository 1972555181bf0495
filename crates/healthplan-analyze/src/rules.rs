//! Health metric rule engine.
//!
//! Every present value in every record is evaluated independently, in
//! record order and then in a fixed rule order, so identical input yields
//! identical output. The same abnormality in two documents produces two
//! concerns; restriction and ingredient lists are de-duplicated.

use healthplan_core::{format_value, HealthRecord};
use tracing::debug;

use crate::ranges::{ReferenceRanges, Sex, REFERENCE_RANGES};
use crate::types::{HealthAnalysis, MetricAssessment};

pub const LOW_SATURATED_FAT: &str = "low_saturated_fat";
pub const LOW_SODIUM: &str = "low_sodium";
pub const DIABETIC_FRIENDLY: &str = "diabetic_friendly";
pub const LOW_GLYCEMIC: &str = "low_glycemic";
pub const HEART_HEALTHY: &str = "heart_healthy";

pub const VITAMIN_D_SUPPLEMENT: &str = "Vitamin D3 (1000–2000 IU daily)";
pub const VITAMIN_B12_SUPPLEMENT: &str = "Vitamin B12 (250–500 mcg daily)";

/// Stateless rule engine over the static reference table.
pub struct RuleEngine {
    ranges: &'static ReferenceRanges,
    sex: Option<Sex>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            ranges: &REFERENCE_RANGES,
            sex: None,
        }
    }

    /// Use sex-specific body-fat categories when classifying.
    pub fn with_sex(mut self, sex: Option<Sex>) -> Self {
        self.sex = sex;
        self
    }

    /// Analyze records in order into one aggregated analysis.
    pub fn analyze(&self, records: &[HealthRecord]) -> HealthAnalysis {
        let mut builder = AnalysisBuilder::default();
        for (index, record) in records.iter().enumerate() {
            self.assess(index, record, &mut builder);
            self.apply_rules(record, &mut builder);

            builder
                .analysis
                .macro_modifications
                .extend(record.dietary_recommendations.iter().cloned());
            builder
                .analysis
                .concerns
                .extend(record.health_concerns.iter().cloned());
        }

        let analysis = builder.analysis;
        debug!(
            "Analyzed {} records: {} concerns, {} restrictions",
            records.len(),
            analysis.concerns.len(),
            analysis.recommended_restrictions.len()
        );
        analysis
    }

    fn assess(&self, index: usize, record: &HealthRecord, builder: &mut AnalysisBuilder) {
        for (metric, value) in record.metrics.present() {
            if let Some(status) = self.ranges.classify(metric, value, self.sex) {
                builder.analysis.assessments.push(MetricAssessment {
                    metric,
                    value,
                    status,
                    document_index: index,
                });
            }
        }
    }

    fn apply_rules(&self, record: &HealthRecord, b: &mut AnalysisBuilder) {
        let m = &record.metrics;
        let r = self.ranges;

        if let Some(v) = m.cholesterol_total {
            if v > r.cholesterol_total.high {
                b.concern(format!("High total cholesterol: {} mg/dL", format_value(v)));
                b.restrict(&[LOW_SATURATED_FAT]);
                b.avoid(&["saturated fats", "processed meats", "fried foods"]);
                b.recommend(&["oats", "beans", "fatty fish", "nuts"]);
                b.macro_modification("Limit saturated fat to <7% of calories");
                b.reason(format!(
                    "Total cholesterol of {} mg/dL is above {} mg/dL; \
                     cutting saturated fat and adding soluble fiber helps lower it",
                    format_value(v),
                    format_value(r.cholesterol_total.high)
                ));
            } else if v < r.cholesterol_total.optimal {
                b.positive(format!(
                    "Total cholesterol of {} mg/dL is in the optimal range",
                    format_value(v)
                ));
            }
        }

        if let Some(v) = m.cholesterol_ldl {
            if v > r.cholesterol_ldl.high {
                b.concern(format!("Elevated LDL cholesterol: {} mg/dL", format_value(v)));
                b.restrict(&[HEART_HEALTHY]);
                b.avoid(&["trans fats", "full-fat dairy"]);
                b.recommend(&["olive oil", "avocado", "oats"]);
                b.reason(format!(
                    "LDL cholesterol of {} mg/dL is above {} mg/dL; \
                     unsaturated fats in place of saturated fats support lower LDL",
                    format_value(v),
                    format_value(r.cholesterol_ldl.high)
                ));
            }
        }

        if let Some(v) = m.cholesterol_hdl {
            if v < r.cholesterol_hdl.low {
                b.concern(format!("Low HDL cholesterol: {} mg/dL", format_value(v)));
                b.recommend(&["olive oil", "nuts", "fatty fish"]);
                b.reason(format!(
                    "HDL cholesterol of {} mg/dL is below {} mg/dL; \
                     omega-3 and monounsaturated fats support HDL",
                    format_value(v),
                    format_value(r.cholesterol_hdl.low)
                ));
            }
        }

        if let Some(v) = m.triglycerides {
            if v > r.triglycerides.high {
                b.concern(format!("Elevated triglycerides: {} mg/dL", format_value(v)));
                b.restrict(&[HEART_HEALTHY]);
                b.avoid(&["refined sugars", "alcohol"]);
                b.recommend(&["fatty fish", "whole grains"]);
                b.macro_modification("Limit added sugars to <25g per day");
                b.reason(format!(
                    "Triglycerides of {} mg/dL are above {} mg/dL; \
                     less added sugar and alcohol lowers them",
                    format_value(v),
                    format_value(r.triglycerides.high)
                ));
            }
        }

        if let Some(v) = m.glucose {
            if v > r.glucose.high {
                b.concern(format!("High fasting glucose: {} mg/dL", format_value(v)));
                b.restrict(&[DIABETIC_FRIENDLY, LOW_GLYCEMIC]);
                b.avoid(&["refined sugars", "white bread", "sugary drinks"]);
                b.recommend(&["whole grains", "lean protein", "non-starchy vegetables"]);
                b.reason(format!(
                    "Fasting glucose of {} mg/dL is above {} mg/dL; \
                     low-glycemic meals help stabilise blood sugar",
                    format_value(v),
                    format_value(r.glucose.high)
                ));
            }
        }

        if let Some(v) = m.hba1c {
            if v > r.hba1c.high {
                b.concern(format!("Elevated HbA1c: {}%", format_value(v)));
                b.restrict(&[DIABETIC_FRIENDLY]);
                b.macro_modification(
                    "Keep carbohydrates moderate (100-150g per day) and spread evenly across meals",
                );
                b.reason(format!(
                    "HbA1c of {}% is above {}%; \
                     moderate, evenly distributed carbohydrates improve long-term glucose control",
                    format_value(v),
                    format_value(r.hba1c.high)
                ));
            }
        }

        if let Some(v) = m.bmi {
            if v > r.bmi.overweight {
                b.reason(format!(
                    "BMI of {} is in the obese range; \
                     a moderate calorie deficit with adequate protein supports weight management",
                    format_value(v)
                ));
            } else if v < r.bmi.underweight {
                b.reason(format!(
                    "BMI of {} is underweight; \
                     a calorie surplus from nutrient-dense foods supports healthy weight gain",
                    format_value(v)
                ));
            }
        }

        if let Some(v) = m.vitamin_d {
            if v < r.vitamin_d.low {
                b.concern(format!("Low vitamin D: {} ng/mL", format_value(v)));
                b.recommend(&["fatty fish", "fortified dairy", "egg yolks"]);
                b.supplement(VITAMIN_D_SUPPLEMENT);
                b.reason(format!(
                    "Vitamin D of {} ng/mL is below {} ng/mL; \
                     dietary sources and supplementation restore levels",
                    format_value(v),
                    format_value(r.vitamin_d.low)
                ));
            }
        }

        if let Some(v) = m.vitamin_b12 {
            if v < r.vitamin_b12.low {
                b.concern(format!("Low vitamin B12: {} pg/mL", format_value(v)));
                b.recommend(&["eggs", "dairy", "fortified cereals"]);
                b.supplement(VITAMIN_B12_SUPPLEMENT);
                b.reason(format!(
                    "Vitamin B12 of {} pg/mL is below {} pg/mL; \
                     animal products or fortified foods raise intake",
                    format_value(v),
                    format_value(r.vitamin_b12.low)
                ));
            }
        }

        let low_iron = m.iron.filter(|v| *v < r.iron.low);
        let low_ferritin = m.ferritin.filter(|v| *v < r.ferritin.low);
        if let Some(v) = low_iron {
            b.concern(format!("Low iron: {} mcg/dL", format_value(v)));
        }
        if let Some(v) = low_ferritin {
            b.concern(format!("Low ferritin: {} ng/mL", format_value(v)));
        }
        if low_iron.is_some() || low_ferritin.is_some() {
            b.recommend(&["lean red meat", "lentils", "spinach", "vitamin C-rich fruits"]);
            b.reason(
                "Iron stores are low; pairing iron-rich foods with vitamin C improves absorption"
                    .to_string(),
            );
        }

        if let Some(v) = m.blood_pressure_systolic {
            if v > r.blood_pressure.high.systolic {
                b.concern(format!("High blood pressure: systolic {} mmHg", format_value(v)));
                b.restrict(&[LOW_SODIUM]);
                b.avoid(&["high-sodium foods", "processed foods", "canned foods"]);
                b.recommend(&["potassium-rich foods", "leafy greens", "bananas"]);
                b.macro_modification("Limit sodium to <2300mg per day");
                b.reason(format!(
                    "Systolic pressure of {} mmHg is above {} mmHg; \
                     lower sodium and more potassium help reduce it",
                    format_value(v),
                    format_value(r.blood_pressure.high.systolic)
                ));
            }
        }

        if let Some(v) = m.blood_pressure_diastolic {
            if v > r.blood_pressure.high.diastolic {
                b.concern(format!("High blood pressure: diastolic {} mmHg", format_value(v)));
                b.restrict(&[LOW_SODIUM]);
                b.reason(format!(
                    "Diastolic pressure of {} mmHg is above {} mmHg",
                    format_value(v),
                    format_value(r.blood_pressure.high.diastolic)
                ));
            }
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct AnalysisBuilder {
    analysis: HealthAnalysis,
}

fn push_unique(list: &mut Vec<String>, items: &[&str]) {
    for item in items {
        if !list.iter().any(|existing| existing == item) {
            list.push((*item).to_string());
        }
    }
}

impl AnalysisBuilder {
    fn concern(&mut self, text: String) {
        self.analysis.concerns.push(text);
    }

    fn positive(&mut self, text: String) {
        self.analysis.positives.push(text);
    }

    fn reason(&mut self, text: String) {
        self.analysis.reasoning_points.push(text);
    }

    fn macro_modification(&mut self, text: &str) {
        self.analysis.macro_modifications.push(text.to_string());
    }

    fn restrict(&mut self, items: &[&str]) {
        push_unique(&mut self.analysis.recommended_restrictions, items);
    }

    fn avoid(&mut self, items: &[&str]) {
        push_unique(&mut self.analysis.avoid_ingredients, items);
    }

    fn recommend(&mut self, items: &[&str]) {
        push_unique(&mut self.analysis.recommend_ingredients, items);
    }

    fn supplement(&mut self, text: &str) {
        push_unique(&mut self.analysis.supplement_suggestions, &[text]);
    }
}
