//! Goal suggestion prompt construction.

use healthplan_analyze::HealthAnalysis;
use healthplan_core::{format_value, HealthRecord};

use crate::types::UserProfile;

const GUIDELINES: &str = "\
Macro calculation guidelines:
- Protein: 1.2-1.6 g/kg body weight for weight loss, 1.6-2.2 g/kg for muscle gain, \
  1.0-1.2 g/kg for maintenance.
- Carbohydrates: lower to 100-150g per day if diabetic markers \
  (high glucose or HbA1c) are present.
- Fat: 20-35% of total calories.
- Fiber: at least 25g per day for women and 35g per day for men.";

const SHAPE: &str = r#"{
  "goalType": "weight_loss | muscle_gain | maintenance | custom",
  "goalName": "short name",
  "description": "one or two sentences",
  "macroTargets": {
    "daily": {"calories": 0, "protein": 0, "carbs": 0, "fat": 0, "fiber": 0},
    "perMeal": {"calories": 0, "protein": 0, "carbs": 0, "fat": 0, "fiber": 0}
  },
  "dietaryRestrictions": [],
  "healthBasedAdjustments": {
    "avoidIngredients": [],
    "recommendIngredients": [],
    "macroModifications": [],
    "supplementSuggestions": []
  },
  "confidence": 0,
  "reasoning": []
}"#;

/// Build the goal-suggestion prompt from records, their analysis and a profile.
pub fn build_goal_prompt(
    records: &[HealthRecord],
    analysis: &HealthAnalysis,
    profile: Option<&UserProfile>,
) -> String {
    let mut sections = vec![format!(
        "Suggest one nutrition goal based on {} health document(s).",
        records.len()
    )];

    for (index, record) in records.iter().enumerate() {
        let values: Vec<String> = record
            .metrics
            .present()
            .map(|(kind, value)| format!("{} {} {}", kind.key(), format_value(value), kind.unit()))
            .collect();
        let values = if values.is_empty() {
            "no numeric metrics".to_string()
        } else {
            values.join(", ")
        };
        sections.push(format!("Document {}: {}", index + 1, values));
    }

    if let Some(profile) = profile {
        let mut lines = Vec::new();
        if let Some(age) = profile.age {
            lines.push(format!("age {age}"));
        }
        if let Some(sex) = &profile.sex {
            lines.push(format!("sex {sex}"));
        }
        if let Some(level) = &profile.activity_level {
            lines.push(format!("activity level {level}"));
        }
        if !lines.is_empty() {
            sections.push(format!("User profile: {}", lines.join(", ")));
        }
    }

    sections.push(list_section("Concerns", &analysis.concerns));
    sections.push(list_section("Positives", &analysis.positives));
    sections.push(list_section(
        "Recommended restrictions",
        &analysis.recommended_restrictions,
    ));
    sections.push(GUIDELINES.to_string());
    sections.push(format!(
        "Return ONLY a JSON object with this shape. \
         confidence is an integer from 0 to 100.\n{SHAPE}"
    ));
    sections.join("\n\n")
}

fn list_section(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        format!("{title}: none")
    } else {
        format!("{title}:\n- {}", items.join("\n- "))
    }
}
