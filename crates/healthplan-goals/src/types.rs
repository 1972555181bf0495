//! Goal suggestion types.

use serde::{Deserialize, Serialize};

use healthplan_analyze::{HealthAnalysis, Sex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    WeightLoss,
    MuscleGain,
    Maintenance,
    Custom,
}

impl GoalType {
    /// Unknown labels map to `Custom`.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "weight_loss" => Self::WeightLoss,
            "muscle_gain" => Self::MuscleGain,
            "maintenance" => Self::Maintenance,
            _ => Self::Custom,
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeightLoss => write!(f, "weight_loss"),
            Self::MuscleGain => write!(f, "muscle_gain"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Calories in kcal; protein, carbs, fat and fiber in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroTarget {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}

impl MacroTarget {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> Self {
        Self {
            calories: Some(calories),
            protein: Some(protein),
            carbs: Some(carbs),
            fat: Some(fat),
            fiber: Some(fiber),
        }
    }

    /// One third of each daily field, rounded half away from zero.
    pub fn per_meal_from(daily: &MacroTarget) -> MacroTarget {
        let third = |v: Option<f64>| v.map(|v| (v / 3.0).round());
        MacroTarget {
            calories: third(daily.calories),
            protein: third(daily.protein),
            carbs: third(daily.carbs),
            fat: third(daily.fat),
            fiber: third(daily.fiber),
        }
    }

    /// Fill fields missing here from `other`.
    pub fn or(self, other: MacroTarget) -> MacroTarget {
        MacroTarget {
            calories: self.calories.or(other.calories),
            protein: self.protein.or(other.protein),
            carbs: self.carbs.or(other.carbs),
            fat: self.fat.or(other.fat),
            fiber: self.fiber.or(other.fiber),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein.is_none()
            && self.carbs.is_none()
            && self.fat.is_none()
            && self.fiber.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMacroTargets")]
pub struct MacroTargets {
    pub daily: MacroTarget,
    #[serde(rename = "perMeal")]
    pub per_meal: MacroTarget,
}

impl MacroTargets {
    /// Each `perMeal` field not supplied is derived from `daily`.
    pub fn new(daily: MacroTarget, per_meal: Option<MacroTarget>) -> Self {
        let derived = MacroTarget::per_meal_from(&daily);
        let per_meal = match per_meal {
            Some(supplied) => supplied.or(derived),
            None => derived,
        };
        Self { daily, per_meal }
    }
}

/// Wire form; `perMeal` may be absent or partial.
#[derive(Deserialize)]
struct RawMacroTargets {
    #[serde(default)]
    daily: MacroTarget,
    #[serde(default, rename = "perMeal")]
    per_meal: Option<MacroTarget>,
}

impl From<RawMacroTargets> for MacroTargets {
    fn from(raw: RawMacroTargets) -> Self {
        Self::new(raw.daily, raw.per_meal)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthBasedAdjustments {
    #[serde(default, rename = "avoidIngredients")]
    pub avoid_ingredients: Vec<String>,
    #[serde(default, rename = "recommendIngredients")]
    pub recommend_ingredients: Vec<String>,
    #[serde(default, rename = "macroModifications")]
    pub macro_modifications: Vec<String>,
    #[serde(default, rename = "supplementSuggestions")]
    pub supplement_suggestions: Vec<String>,
}

impl From<&HealthAnalysis> for HealthBasedAdjustments {
    fn from(analysis: &HealthAnalysis) -> Self {
        Self {
            avoid_ingredients: analysis.avoid_ingredients.clone(),
            recommend_ingredients: analysis.recommend_ingredients.clone(),
            macro_modifications: analysis.macro_modifications.clone(),
            supplement_suggestions: analysis.supplement_suggestions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSuggestion {
    #[serde(rename = "goalType")]
    pub goal_type: GoalType,
    #[serde(rename = "goalName")]
    pub goal_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "macroTargets")]
    pub macro_targets: MacroTargets,
    #[serde(default, rename = "dietaryRestrictions")]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, rename = "healthBasedAdjustments")]
    pub health_based_adjustments: HealthBasedAdjustments,
    pub confidence: u8,
    #[serde(default)]
    pub reasoning: Vec<String>,
}

/// Clamp a raw confidence score into 0..=100.
pub fn clamp_confidence(raw: f64) -> u8 {
    if raw.is_finite() {
        raw.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default, rename = "activityLevel")]
    pub activity_level: Option<String>,
}

impl UserProfile {
    pub fn sex(&self) -> Option<Sex> {
        match self.sex.as_deref()?.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_meal_rounding() {
        let daily = MacroTarget::new(1600.0, 120.0, 121.0, 71.0, 30.0);
        let per_meal = MacroTarget::per_meal_from(&daily);
        assert_eq!(per_meal, MacroTarget::new(533.0, 40.0, 40.0, 24.0, 10.0));

        let half = MacroTarget {
            protein: Some(1.5),
            ..Default::default()
        };
        assert_eq!(MacroTarget::per_meal_from(&half).protein, Some(1.0));
        assert_eq!(MacroTarget::per_meal_from(&half).calories, None);
    }

    #[test]
    fn test_per_meal_idempotent() {
        let daily = MacroTarget::new(2150.0, 101.0, 250.0, 89.0, 35.0);
        let once = MacroTargets::new(daily, None);
        let twice = MacroTargets::new(once.daily, None);
        assert_eq!(once, twice);
        assert_eq!(
            MacroTarget::per_meal_from(&daily),
            MacroTarget::per_meal_from(&daily)
        );
    }

    #[test]
    fn test_explicit_per_meal_kept() {
        let daily = MacroTarget::new(1800.0, 130.0, 150.0, 60.0, 30.0);
        let explicit = MacroTarget::new(500.0, 35.0, 40.0, 15.0, 8.0);
        assert_eq!(MacroTargets::new(daily, Some(explicit)).per_meal, explicit);
        assert_eq!(
            MacroTargets::new(daily, Some(MacroTarget::default())).per_meal,
            MacroTarget::per_meal_from(&daily)
        );
    }

    #[test]
    fn test_partial_per_meal_filled_from_daily() {
        let daily = MacroTarget::new(1800.0, 120.0, 180.0, 60.0, 30.0);
        let supplied = MacroTarget {
            calories: Some(600.0),
            ..Default::default()
        };
        let targets = MacroTargets::new(daily, Some(supplied));
        assert_eq!(
            targets.per_meal,
            MacroTarget::new(600.0, 40.0, 60.0, 20.0, 10.0)
        );
    }

    #[test]
    fn test_deserialize_without_per_meal() {
        let targets: MacroTargets = serde_json::from_str(
            r#"{"daily": {"calories": 2000, "protein": 100, "carbs": 200,
                "fat": 89, "fiber": 30}}"#,
        )
        .unwrap();
        assert_eq!(
            targets.per_meal,
            MacroTarget::new(667.0, 33.0, 67.0, 30.0, 10.0)
        );

        let partial: MacroTargets = serde_json::from_str(
            r#"{"daily": {"calories": 1500, "protein": 90}, "perMeal": {"protein": 35}}"#,
        )
        .unwrap();
        assert_eq!(partial.per_meal.calories, Some(500.0));
        assert_eq!(partial.per_meal.protein, Some(35.0));
        assert_eq!(partial.per_meal.fat, None);
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(150.0), 100);
        assert_eq!(clamp_confidence(-4.0), 0);
        assert_eq!(clamp_confidence(84.6), 85);
        assert_eq!(clamp_confidence(f64::NAN), 0);
    }

    #[test]
    fn test_goal_type_lenient() {
        assert_eq!(GoalType::parse_lenient("Weight Loss"), GoalType::WeightLoss);
        assert_eq!(GoalType::parse_lenient("muscle-gain"), GoalType::MuscleGain);
        assert_eq!(GoalType::parse_lenient("keto"), GoalType::Custom);
    }

    #[test]
    fn test_profile_sex() {
        let profile = UserProfile {
            sex: Some("Female".into()),
            ..Default::default()
        };
        assert_eq!(profile.sex(), Some(Sex::Female));
        assert_eq!(UserProfile::default().sex(), None);
    }
}
