//! Weekly aggregation. Pure and recomputed on every call.

use tracing::{debug, warn};

use healthplan_goals::{GoalSuggestion, MacroTarget};

use crate::types::{
    round1, MacroProgress, MealSources, NutritionTotals, WeekPlan, Weekday,
    WeeklyNutritionSummary,
};

const DAYS_PER_WEEK: f64 = 7.0;

/// Sum planned meals into per-day and weekly totals.
///
/// Every weekday appears in `daily`. Meals with non-positive or non-finite
/// servings are skipped.
pub fn aggregate_week(plan: &WeekPlan, goal: Option<&GoalSuggestion>) -> WeeklyNutritionSummary {
    let mut weekly = NutritionTotals::default();
    let mut sources = MealSources::default();
    let mut daily = std::collections::BTreeMap::new();

    for day in Weekday::ALL {
        let mut totals = NutritionTotals::default();
        for meal in plan.get(&day).map(Vec::as_slice).unwrap_or_default() {
            if !meal.servings.is_finite() || meal.servings <= 0.0 {
                warn!(
                    "Skipping {:?} on {:?}: invalid servings {}",
                    meal.meal_type, day, meal.servings
                );
                continue;
            }
            totals += meal.meal_type.base_nutrition().scaled(meal.servings);
            sources.total += 1;
            *sources.by_type.entry(meal.meal_type).or_insert(0) += 1;
        }
        weekly += totals;
        daily.insert(day, totals.rounded());
    }

    let percentages = goal.map(|g| progress(&weekly, &g.macro_targets.daily));
    debug!(
        "Aggregated {} meals: {} kcal for the week",
        sources.total, weekly.calories
    );

    WeeklyNutritionSummary {
        daily,
        weekly: weekly.rounded(),
        meal_sources: sources,
        percentages,
    }
}

fn percentage(actual: f64, daily_target: Option<f64>) -> Option<f64> {
    let target = daily_target.filter(|t| t.is_finite() && *t > 0.0)?;
    Some(round1((actual / (target * DAYS_PER_WEEK) * 100.0).min(100.0)))
}

fn progress(weekly: &NutritionTotals, daily: &MacroTarget) -> MacroProgress {
    MacroProgress {
        calories: percentage(weekly.calories, daily.calories),
        protein: percentage(weekly.protein, daily.protein),
        carbs: percentage(weekly.carbs, daily.carbs),
        fat: percentage(weekly.fat, daily.fat),
        fiber: percentage(weekly.fiber, daily.fiber),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MealType, PlannedMeal};
    use healthplan_goals::{GoalType, HealthBasedAdjustments, MacroTargets};

    fn goal(daily: MacroTarget) -> GoalSuggestion {
        GoalSuggestion {
            goal_type: GoalType::Maintenance,
            goal_name: "Maintain".into(),
            description: String::new(),
            macro_targets: MacroTargets::new(daily, None),
            dietary_restrictions: vec![],
            health_based_adjustments: HealthBasedAdjustments::default(),
            confidence: 80,
            reasoning: vec![],
        }
    }

    #[test]
    fn test_empty_week_all_zero() {
        let plan: WeekPlan = Weekday::ALL.into_iter().map(|d| (d, vec![])).collect();
        let summary = aggregate_week(&plan, None);
        assert_eq!(summary.daily.len(), 7);
        assert!(summary
            .daily
            .values()
            .all(|t| *t == NutritionTotals::default()));
        assert_eq!(summary.weekly, NutritionTotals::default());
        assert_eq!(summary.meal_sources.total, 0);
        assert!(summary.percentages.is_none());
    }

    #[test]
    fn test_servings_scale_linearly() {
        let mut plan = WeekPlan::new();
        plan.insert(
            Weekday::Monday,
            vec![
                PlannedMeal::new(MealType::Breakfast, 1.0),
                PlannedMeal::new(MealType::Breakfast, 2.0),
            ],
        );
        let summary = aggregate_week(&plan, None);
        let base = MealType::Breakfast.base_nutrition();
        assert_eq!(summary.daily[&Weekday::Monday].calories, 3.0 * base.calories);
        assert_eq!(summary.daily[&Weekday::Monday].sodium, 3.0 * base.sodium);
        assert_eq!(summary.daily[&Weekday::Tuesday].calories, 0.0);
        assert_eq!(summary.weekly.calories, 1200.0);
        assert_eq!(summary.meal_sources.total, 2);
        assert_eq!(summary.meal_sources.by_type[&MealType::Breakfast], 2);
    }

    #[test]
    fn test_invalid_servings_skipped() {
        let mut plan = WeekPlan::new();
        plan.insert(
            Weekday::Friday,
            vec![
                PlannedMeal::new(MealType::Snack, 0.0),
                PlannedMeal::new(MealType::Snack, -1.0),
                PlannedMeal::new(MealType::Snack, f64::NAN),
                PlannedMeal::new(MealType::Snack, 1.5),
            ],
        );
        let summary = aggregate_week(&plan, None);
        assert_eq!(summary.meal_sources.total, 1);
        assert_eq!(summary.weekly.calories, 300.0);
    }

    #[test]
    fn test_percentages_capped() {
        let mut plan = WeekPlan::new();
        for day in Weekday::ALL {
            plan.insert(
                day,
                vec![
                    PlannedMeal::new(MealType::Breakfast, 1.0),
                    PlannedMeal::new(MealType::Lunch, 1.0),
                    PlannedMeal::new(MealType::Dinner, 1.0),
                ],
            );
        }
        let daily = MacroTarget {
            calories: Some(2000.0),
            protein: Some(50.0),
            carbs: Some(0.0),
            fat: None,
            fiber: Some(30.0),
        };
        let summary = aggregate_week(&plan, Some(&goal(daily)));
        let pct = summary.percentages.unwrap();
        // 1600 kcal a day against 2000.
        assert_eq!(pct.calories, Some(80.0));
        assert_eq!(pct.protein, Some(100.0));
        assert_eq!(pct.carbs, None);
        assert_eq!(pct.fat, None);
        assert_eq!(pct.fiber, Some(76.7));
    }

    #[test]
    fn test_plan_from_json() {
        let plan: WeekPlan = serde_json::from_str(
            r#"{"Monday": [{"mealType": "Lunch", "servings": 2, "recipeName": "Lentil soup"}],
                "sunday": [{"mealType": "snack"}]}"#,
        )
        .unwrap();
        let summary = aggregate_week(&plan, None);
        assert_eq!(summary.daily[&Weekday::Monday].calories, 1100.0);
        assert_eq!(summary.daily[&Weekday::Sunday].calories, 200.0);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["mealSources"]["total"], 2);
        assert_eq!(value["mealSources"]["byType"]["Lunch"], 1);
        assert!(value.get("percentages").is_none());
    }
}
