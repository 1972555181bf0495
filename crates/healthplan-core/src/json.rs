//! Structured-block extraction from untrusted generated text.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BlockError {
    #[error("reply contains no structured block")]
    NoBlock,
    #[error("structured block is malformed: {0}")]
    Malformed(String),
    #[error("structured block is not an object")]
    NotObject,
}

/// Locate the first balanced `{ ... }` block in `reply`.
///
/// Braces inside string literals are ignored. When the opening brace is
/// never balanced, the block runs to the last `}` in the reply.
pub fn extract_json_block(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in reply[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Extract and parse the first structured block as a JSON object.
pub fn parse_json_block(reply: &str) -> Result<Map<String, Value>, BlockError> {
    let block = extract_json_block(reply).ok_or(BlockError::NoBlock)?;
    match serde_json::from_str::<Value>(block) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BlockError::NotObject),
        Err(e) => Err(BlockError::Malformed(e.to_string())),
    }
}

/// Coerce a generated value to a finite number.
///
/// Accepts JSON numbers and strings whose leading token is numeric
/// (`"220 mg/dL"`, `"1,450"`). Everything else is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let token: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
                .filter(|c| *c != ',')
                .collect();
            token.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Coerce a generated value to a list of non-empty strings.
pub fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_with_prose_and_fence() {
        let reply = "Here you go:\n```json\n{\"a\": {\"b\": 1}}\n```\nDone.";
        assert_eq!(extract_json_block(reply), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_braces_inside_strings() {
        let reply = r#"{"note": "use } carefully", "n": 2} trailing }"#;
        assert_eq!(
            extract_json_block(reply),
            Some(r#"{"note": "use } carefully", "n": 2}"#)
        );
    }

    #[test]
    fn test_first_block_wins() {
        let reply = r#"{"first": true} and {"second": true}"#;
        assert_eq!(extract_json_block(reply), Some(r#"{"first": true}"#));
    }

    #[test]
    fn test_no_block() {
        assert_eq!(extract_json_block("no structure here"), None);
        assert_eq!(parse_json_block("no structure here"), Err(BlockError::NoBlock));
        assert_eq!(extract_json_block("} before {"), None);
    }

    #[test]
    fn test_unbalanced_uses_last_brace() {
        let reply = r#"{"a": {"b": 1} }"#;
        assert_eq!(extract_json_block(reply), Some(reply));
        let truncated = r#"{"a": {"b": 1}"#;
        assert_eq!(extract_json_block(truncated), Some(truncated));
        assert!(matches!(
            parse_json_block(truncated),
            Err(BlockError::Malformed(_))
        ));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(220)), Some(220.0));
        assert_eq!(coerce_number(&json!("6.8 %")), Some(6.8));
        assert_eq!(coerce_number(&json!("1,450 kcal")), Some(1450.0));
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn test_coerce_string_list() {
        let value = json!(["Eat more fiber", "", 3, null]);
        assert_eq!(
            coerce_string_list(Some(&value)),
            vec!["Eat more fiber".to_string(), "3".to_string()]
        );
        assert!(coerce_string_list(None).is_empty());
        assert_eq!(coerce_string_list(Some(&json!("single"))), vec!["single"]);
    }
}
