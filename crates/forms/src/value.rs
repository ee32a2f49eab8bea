use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::FieldId;

/// Current values of a preview, keyed by field id. Absent keys are unset.
pub type FieldValues = HashMap<FieldId, FieldValue>;

/// A value entered into (or computed for) a field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    /// Checked options of a checkbox group.
    Selection(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Empty text or an empty selection. Numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Selection(items) => items.is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Length used by the min/max length rules: characters for text, checked
    /// options for selections, none for numbers.
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::Text(s) => Some(s.chars().count()),
            FieldValue::Selection(items) => Some(items.len()),
            FieldValue::Number(_) => None,
        }
    }

    /// Arithmetic view of the value. Anything that is not a finite number
    /// (unparsable text, selections, NaN) coerces to `0`.
    pub fn as_number(&self) -> f64 {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(0.0)
                }
            }
            FieldValue::Selection(_) => 0.0,
        };
        if n.is_nan() {
            0.0
        } else {
            n
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Selection(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::Selection(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion() {
        assert_eq!(FieldValue::text(" 12.5 ").as_number(), 12.5);
        assert_eq!(FieldValue::text("").as_number(), 0.0);
        assert_eq!(FieldValue::text("abc").as_number(), 0.0);
        assert_eq!(FieldValue::Number(f64::NAN).as_number(), 0.0);
        assert_eq!(FieldValue::Selection(vec!["3".into()]).as_number(), 0.0);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(FieldValue::text("héllo").len(), Some(5));
        assert_eq!(FieldValue::Selection(vec!["a".into(), "b".into()]).len(), Some(2));
        assert_eq!(FieldValue::Number(10.0).len(), None);
    }

    #[test]
    fn display_drops_trailing_zero_fraction() {
        assert_eq!(FieldValue::Number(7.0).to_string(), "7");
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
        assert_eq!(
            FieldValue::Selection(vec!["a".into(), "b".into()]).to_string(),
            "a,b"
        );
    }

    #[test]
    fn serializes_as_bare_json_values() {
        let json = serde_json::to_value([
            FieldValue::Number(2.5),
            FieldValue::text("hi"),
            FieldValue::Selection(vec!["a".into()]),
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!([2.5, "hi", ["a"]]));
    }

    #[test]
    fn emptiness() {
        assert!(FieldValue::text("").is_empty());
        assert!(FieldValue::Selection(Vec::new()).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
    }
}
