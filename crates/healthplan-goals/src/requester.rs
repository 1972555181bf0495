//! Goal suggestion through the text-generation service.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use healthplan_analyze::HealthAnalysis;
use healthplan_core::json::{coerce_number, coerce_string_list, parse_json_block};
use healthplan_core::{Error, HealthRecord, Result};
use healthplan_generate::{generate_with_timeout, TextGenerator};

use crate::prompt::build_goal_prompt;
use crate::types::{
    clamp_confidence, GoalSuggestion, GoalType, HealthBasedAdjustments, MacroTarget,
    MacroTargets, UserProfile,
};

/// Confidence assumed when a reply omits it.
const DEFAULT_CONFIDENCE: f64 = 70.0;

pub struct GoalRequester<'a> {
    generator: &'a dyn TextGenerator,
    timeout: Duration,
}

impl<'a> GoalRequester<'a> {
    pub fn new(generator: &'a dyn TextGenerator, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// One generation attempt. Service errors pass through unchanged;
    /// unusable replies are `GoalParseFailed`.
    pub async fn suggest(
        &self,
        records: &[HealthRecord],
        analysis: &HealthAnalysis,
        profile: Option<&UserProfile>,
    ) -> Result<GoalSuggestion> {
        let prompt = build_goal_prompt(records, analysis, profile);
        let reply = generate_with_timeout(self.generator, &prompt, self.timeout).await?;
        parse_goal_reply(&reply)
    }
}

/// Parse and validate a generated goal suggestion.
///
/// `goalType`, `goalName` and `macroTargets.daily` are required; a reply
/// missing any of them is a parse failure, never a partial suggestion.
pub fn parse_goal_reply(reply: &str) -> Result<GoalSuggestion> {
    let object = parse_json_block(reply).map_err(|e| parse_failed(e.to_string()))?;

    let goal_type = object
        .get("goalType")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(GoalType::parse_lenient)
        .ok_or_else(|| parse_failed("missing goalType"))?;

    let goal_name = non_empty_str(&object, "goalName")
        .ok_or_else(|| parse_failed("missing goalName"))?;

    let targets = match object.get("macroTargets") {
        Some(Value::Object(targets)) => targets,
        _ => return Err(parse_failed("missing macroTargets")),
    };
    let daily = macro_target(targets.get("daily"))
        .filter(|daily| !daily.is_empty())
        .ok_or_else(|| parse_failed("missing macroTargets.daily"))?;
    let per_meal = macro_target(targets.get("perMeal"));

    let mut dietary_restrictions = Vec::new();
    for item in coerce_string_list(object.get("dietaryRestrictions")) {
        if !dietary_restrictions.contains(&item) {
            dietary_restrictions.push(item);
        }
    }

    let adjustments = match object.get("healthBasedAdjustments") {
        Some(Value::Object(adj)) => HealthBasedAdjustments {
            avoid_ingredients: coerce_string_list(adj.get("avoidIngredients")),
            recommend_ingredients: coerce_string_list(adj.get("recommendIngredients")),
            macro_modifications: coerce_string_list(adj.get("macroModifications")),
            supplement_suggestions: coerce_string_list(adj.get("supplementSuggestions")),
        },
        _ => HealthBasedAdjustments::default(),
    };

    let confidence = object
        .get("confidence")
        .and_then(coerce_number)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let suggestion = GoalSuggestion {
        goal_type,
        goal_name,
        description: non_empty_str(&object, "description").unwrap_or_default(),
        macro_targets: MacroTargets::new(daily, per_meal),
        dietary_restrictions,
        health_based_adjustments: adjustments,
        confidence: clamp_confidence(confidence),
        reasoning: coerce_string_list(object.get("reasoning")),
    };
    debug!(
        "Parsed goal suggestion {} ({}), confidence {}",
        suggestion.goal_name, suggestion.goal_type, suggestion.confidence
    );
    Ok(suggestion)
}

fn parse_failed(reason: impl Into<String>) -> Error {
    let reason = reason.into();
    warn!("Unusable goal suggestion reply: {}", reason);
    Error::GoalParseFailed(reason)
}

fn non_empty_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn macro_target(value: Option<&Value>) -> Option<MacroTarget> {
    let Some(Value::Object(fields)) = value else {
        return None;
    };
    let field = |key: &str| fields.get(key).and_then(coerce_number);
    Some(MacroTarget {
        calories: field("calories"),
        protein: field("protein"),
        carbs: field("carbs"),
        fat: field("fat"),
        fiber: field("fiber"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthplan_generate::{NoopGenerator, StaticGenerator};

    const REPLY: &str = r#"Here is my suggestion:
{
  "goalType": "weight_loss",
  "goalName": "Heart-Healthy Weight Loss",
  "description": "Gradual loss with lower saturated fat.",
  "macroTargets": {
    "daily": {"calories": 1700, "protein": 125, "carbs": "140g", "fat": 60, "fiber": 30}
  },
  "dietaryRestrictions": ["low_saturated_fat", "low_saturated_fat", "low_sodium"],
  "healthBasedAdjustments": {"avoidIngredients": ["fried foods"]},
  "confidence": 140,
  "reasoning": ["Cholesterol is elevated"]
}"#;

    #[test]
    fn test_parse_derives_per_meal() {
        let suggestion = parse_goal_reply(REPLY).unwrap();
        assert_eq!(suggestion.goal_type, GoalType::WeightLoss);
        assert_eq!(suggestion.macro_targets.daily.carbs, Some(140.0));
        assert_eq!(
            suggestion.macro_targets.per_meal,
            MacroTarget::new(567.0, 42.0, 47.0, 20.0, 10.0)
        );
        assert_eq!(suggestion.confidence, 100);
        assert_eq!(
            suggestion.dietary_restrictions,
            vec!["low_saturated_fat", "low_sodium"]
        );
        assert_eq!(
            suggestion.health_based_adjustments.avoid_ingredients,
            vec!["fried foods"]
        );
    }

    #[test]
    fn test_missing_required_fields_fail() {
        let cases = [
            r#"{"goalName": "x", "macroTargets": {"daily": {"calories": 1800}}}"#,
            r#"{"goalType": "maintenance", "macroTargets": {"daily": {"calories": 1800}}}"#,
            r#"{"goalType": "maintenance", "goalName": "x"}"#,
            r#"{"goalType": "maintenance", "goalName": "x", "macroTargets": {}}"#,
            "no json at all",
        ];
        for reply in cases {
            let err = parse_goal_reply(reply).unwrap_err();
            assert!(matches!(err, Error::GoalParseFailed(_)), "{reply}");
        }
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let reply = r#"{"goalType": "paleo", "goalName": "Custom plan",
            "macroTargets": {"daily": {"calories": 2000}, "perMeal": {"calories": 800}}}"#;
        let suggestion = parse_goal_reply(reply).unwrap();
        assert_eq!(suggestion.goal_type, GoalType::Custom);
        assert_eq!(suggestion.confidence, 70);
        assert_eq!(suggestion.macro_targets.per_meal.calories, Some(800.0));
        assert!(suggestion.reasoning.is_empty());
    }

    #[test]
    fn test_partial_per_meal_reply() {
        let reply = r#"{"goalType": "maintenance", "goalName": "Steady",
            "macroTargets": {
                "daily": {"calories": 1800, "protein": 120, "carbs": 180, "fat": 60, "fiber": 30},
                "perMeal": {"calories": 600}
            }}"#;
        let per_meal = parse_goal_reply(reply).unwrap().macro_targets.per_meal;
        assert_eq!(per_meal.calories, Some(600.0));
        assert_eq!(per_meal.protein, Some(40.0));
        assert_eq!(per_meal.carbs, Some(60.0));
        assert_eq!(per_meal.fat, Some(20.0));
        assert_eq!(per_meal.fiber, Some(10.0));
    }

    #[test]
    fn test_stored_suggestion_without_per_meal() {
        let suggestion: GoalSuggestion = serde_json::from_value(serde_json::json!({
            "goalType": "weight_loss",
            "goalName": "Cut",
            "macroTargets": {"daily": {"calories": 1600, "protein": 120}},
            "confidence": 75
        }))
        .unwrap();
        assert_eq!(suggestion.macro_targets.per_meal.calories, Some(533.0));
        assert_eq!(suggestion.macro_targets.per_meal.protein, Some(40.0));
    }

    #[tokio::test]
    async fn test_suggest_with_static_generator() {
        let generator = StaticGenerator::new(REPLY);
        let requester = GoalRequester::new(&generator, Duration::from_secs(1));
        let suggestion = requester
            .suggest(&[HealthRecord::default()], &HealthAnalysis::default(), None)
            .await
            .unwrap();
        assert_eq!(suggestion.goal_name, "Heart-Healthy Weight Loss");
    }

    #[tokio::test]
    async fn test_suggest_service_error_is_recoverable() {
        let requester = GoalRequester::new(&NoopGenerator, Duration::from_secs(1));
        let err = requester
            .suggest(&[], &HealthAnalysis::default(), None)
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
