//! Meal planning types and the base nutrition table.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(alias = "monday")]
    Monday,
    #[serde(alias = "tuesday")]
    Tuesday,
    #[serde(alias = "wednesday")]
    Wednesday,
    #[serde(alias = "thursday")]
    Thursday,
    #[serde(alias = "friday")]
    Friday,
    #[serde(alias = "saturday")]
    Saturday,
    #[serde(alias = "sunday")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealType {
    #[serde(alias = "breakfast")]
    Breakfast,
    #[serde(alias = "lunch")]
    Lunch,
    #[serde(alias = "dinner")]
    Dinner,
    #[serde(alias = "snack")]
    Snack,
}

impl MealType {
    /// Estimated nutrition of one serving.
    pub fn base_nutrition(self) -> NutritionTotals {
        match self {
            Self::Breakfast => NutritionTotals::new(400.0, 20.0, 50.0, 12.0, 6.0, 10.0, 400.0),
            Self::Lunch => NutritionTotals::new(550.0, 30.0, 60.0, 18.0, 8.0, 8.0, 700.0),
            Self::Dinner => NutritionTotals::new(650.0, 35.0, 65.0, 22.0, 9.0, 8.0, 800.0),
            Self::Snack => NutritionTotals::new(200.0, 8.0, 22.0, 8.0, 3.0, 10.0, 150.0),
        }
    }
}

fn default_servings() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(default = "default_servings")]
    pub servings: f64,
    #[serde(default, rename = "recipeId", skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(default, rename = "recipeName", skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
}

impl PlannedMeal {
    pub fn new(meal_type: MealType, servings: f64) -> Self {
        Self {
            meal_type,
            servings,
            recipe_id: None,
            recipe_name: None,
        }
    }
}

/// A week of planned meals keyed by day.
pub type WeekPlan = BTreeMap<Weekday, Vec<PlannedMeal>>;

/// Calories in kcal; sodium in mg; everything else in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

impl NutritionTotals {
    pub const fn new(
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        fiber: f64,
        sugar: f64,
        sodium: f64,
    ) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            fiber,
            sugar,
            sodium,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    pub fn rounded(self) -> Self {
        self.map(round1)
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(
            f(self.calories),
            f(self.protein),
            f(self.carbs),
            f(self.fat),
            f(self.fiber),
            f(self.sugar),
            f(self.sodium),
        )
    }
}

impl AddAssign for NutritionTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.carbs += rhs.carbs;
        self.fat += rhs.fat;
        self.fiber += rhs.fiber;
        self.sugar += rhs.sugar;
        self.sodium += rhs.sodium;
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealSources {
    pub total: usize,
    #[serde(rename = "byType")]
    pub by_type: BTreeMap<MealType, usize>,
}

/// Percent of the weekly target reached, capped at 100. A field is `None`
/// when the goal has no positive daily target for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroProgress {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyNutritionSummary {
    pub daily: BTreeMap<Weekday, NutritionTotals>,
    pub weekly: NutritionTotals,
    #[serde(rename = "mealSources")]
    pub meal_sources: MealSources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentages: Option<MacroProgress>,
}
