//! Rule-based goal synthesis. Never fails and never calls the service.

use tracing::info;

use healthplan_analyze::HealthAnalysis;
use healthplan_core::HealthRecord;

use crate::types::{GoalSuggestion, GoalType, HealthBasedAdjustments, MacroTarget, MacroTargets};

pub const FALLBACK_CONFIDENCE: u8 = 75;

const MIN_FAT_G: f64 = 50.0;
const FIBER_G: f64 = 30.0;

fn needs_weight_loss(record: &HealthRecord) -> bool {
    let m = &record.metrics;
    m.bmi.is_some_and(|v| v > 25.0)
        || m.body_fat_percentage.is_some_and(|v| v > 25.0)
        || m.glucose.is_some_and(|v| v > 100.0)
        || m.hba1c.is_some_and(|v| v > 5.7)
        || m.cholesterol_total.is_some_and(|v| v > 200.0)
}

fn has_metabolic_concern(record: &HealthRecord) -> bool {
    let m = &record.metrics;
    m.glucose.is_some_and(|v| v > 100.0) || m.hba1c.is_some_and(|v| v > 5.7)
}

/// Derive a goal directly from the records and their analysis.
pub fn synthesize_goal(records: &[HealthRecord], analysis: &HealthAnalysis) -> GoalSuggestion {
    let weight_loss = records.iter().any(needs_weight_loss);
    let metabolic = records.iter().any(has_metabolic_concern);

    let (goal_type, calories, protein): (GoalType, f64, f64) = if weight_loss {
        (GoalType::WeightLoss, 1600.0, 120.0)
    } else {
        (GoalType::Maintenance, 2000.0, 100.0)
    };
    let carbs: f64 = if metabolic { 120.0 } else { 200.0 };
    let fat = ((calories - protein * 4.0 - carbs * 4.0) / 9.0)
        .round()
        .max(MIN_FAT_G);

    let daily = MacroTarget::new(calories, protein, carbs, fat, FIBER_G);
    let (goal_name, description) = match goal_type {
        GoalType::WeightLoss => (
            "Health-Focused Weight Management",
            "A moderate calorie deficit with higher protein, \
             built from the markers in your health documents.",
        ),
        _ => (
            "Balanced Maintenance",
            "Balanced macros to maintain current weight and support overall health.",
        ),
    };

    info!(
        "Synthesized {} goal from {} record(s): {} kcal, {}g protein, {}g carbs, {}g fat",
        goal_type,
        records.len(),
        calories,
        protein,
        carbs,
        fat
    );

    GoalSuggestion {
        goal_type,
        goal_name: goal_name.to_string(),
        description: description.to_string(),
        macro_targets: MacroTargets::new(daily, None),
        dietary_restrictions: analysis.recommended_restrictions.clone(),
        health_based_adjustments: HealthBasedAdjustments::from(analysis),
        confidence: FALLBACK_CONFIDENCE,
        reasoning: analysis.reasoning_points.clone(),
    }
}
