//! Input file loading. Accepts both bare payloads and the JSON this binary
//! itself prints, so commands can be chained.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

use healthplan_core::HealthRecord;
use healthplan_goals::{GoalSuggestion, UserProfile};
use healthplan_runtime::{AggregationRequest, GoalRequest};

pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// A goal request from a request object, a record list, a single record,
/// or `extract` output.
pub fn goal_request(value: Value) -> anyhow::Result<GoalRequest> {
    if value.get("healthRecords").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    let health_records = match value {
        Value::Array(items) => items
            .into_iter()
            .map(record_from)
            .collect::<anyhow::Result<Vec<_>>>()?,
        Value::Object(_) => vec![record_from(value)?],
        _ => bail!("Expected a health record, a list of records, or a goal request"),
    };
    Ok(GoalRequest {
        health_records,
        user_profile: None,
    })
}

fn record_from(mut value: Value) -> anyhow::Result<HealthRecord> {
    if let Some(record) = value.get_mut("record") {
        value = record.take();
    }
    Ok(serde_json::from_value(value)?)
}

pub fn profile(value: Value) -> anyhow::Result<UserProfile> {
    Ok(serde_json::from_value(value)?)
}

/// An aggregation request from a request object or a bare day map.
pub fn aggregation_request(value: Value) -> anyhow::Result<AggregationRequest> {
    if value.get("weekMeals").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    Ok(AggregationRequest {
        week_meals: serde_json::from_value(value)?,
        goal: None,
    })
}

/// A goal from a bare suggestion or `suggest` output.
pub fn goal(mut value: Value) -> anyhow::Result<GoalSuggestion> {
    if let Some(suggestion) = value.get_mut("suggestion") {
        value = suggestion.take();
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_goal_request_shapes() {
        let list = goal_request(json!([{"BMI": 24}, {"glucose": 130}])).unwrap();
        assert_eq!(list.health_records.len(), 2);

        let chained = goal_request(json!({"requestId": "x", "record": {"BMI": 31}})).unwrap();
        assert_eq!(chained.health_records[0].metrics.bmi, Some(31.0));

        let full = goal_request(json!({
            "healthRecords": [{"HbA1c": 6.9}],
            "userProfile": {"age": 50, "sex": "female"}
        }))
        .unwrap();
        assert_eq!(full.user_profile.unwrap().age, Some(50));

        assert!(goal_request(json!(42)).is_err());
    }

    #[test]
    fn test_aggregation_shapes() {
        let bare = aggregation_request(json!({"Monday": [{"mealType": "Snack"}]})).unwrap();
        assert_eq!(bare.week_meals.len(), 1);
        assert!(bare.goal.is_none());
    }

    #[test]
    fn test_read_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_json(&path).is_err());
        assert!(read_json(&dir.path().join("missing.json")).is_err());
    }
}
