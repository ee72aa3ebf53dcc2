//! Forgiving serde field readers for loosely-typed documents.
//!
//! Uploaded documents and imported spreadsheets carry numbers as numbers,
//! as numeric strings, as empty cells or not at all. These helpers collapse
//! every unreadable shape to the field's zero value so that a single bad
//! cell never rejects a whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a JSON value as `f64`, defaulting to `0.0`.
pub fn value_as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Read a JSON value as `i32`, truncating fractions and defaulting to `0`.
pub fn value_as_i32(value: &Value) -> i32 {
    let v = value_as_f64(value);
    if v >= i32::MAX as f64 {
        i32::MAX
    } else if v <= i32::MIN as f64 {
        i32::MIN
    } else {
        v as i32
    }
}

/// `#[serde(deserialize_with = "lenient::f64_or_zero", default)]`
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

/// `#[serde(deserialize_with = "lenient::i32_or_zero", default)]`
pub fn i32_or_zero<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_i32(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Doc {
        #[serde(deserialize_with = "f64_or_zero", default)]
        score: f64,
        #[serde(deserialize_with = "i32_or_zero", default)]
        lessons: i32,
    }

    #[test]
    fn numeric_strings_are_read() {
        let doc: Doc =
            serde_json::from_value(json!({ "score": "85", "lessons": "12" }))
                .unwrap();
        assert_eq!(doc.score, 85.0);
        assert_eq!(doc.lessons, 12);
    }

    #[test]
    fn garbage_becomes_zero() {
        let doc: Doc = serde_json::from_value(json!({
            "score": "abc",
            "lessons": [1, 2],
        }))
        .unwrap();
        assert_eq!(doc.score, 0.0);
        assert_eq!(doc.lessons, 0);
    }

    #[test]
    fn null_and_missing_default() {
        let doc: Doc = serde_json::from_value(json!({ "score": null })).unwrap();
        assert_eq!(doc.score, 0.0);
        assert_eq!(doc.lessons, 0);
    }

    #[test]
    fn fractional_lessons_truncate() {
        assert_eq!(value_as_i32(&json!(7.9)), 7);
        assert_eq!(value_as_i32(&json!(1e12)), i32::MAX);
    }
}
