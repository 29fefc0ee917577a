// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! What a test reports back to the evaluator.

use crate::error::TestError;
use crate::message::{display_json, Fields};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::card::CardDetail;
use super::strength::StrengthDetail;

/// The result of a single test invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    Fail,
    Detailed(Detail),
}

impl Outcome {
    /// Whether the value passed the test.
    pub fn is_valid(&self) -> bool {
        match self {
            Outcome::Pass => true,
            Outcome::Fail => false,
            Outcome::Detailed(detail) => detail.valid,
        }
    }

    /// Interpret a dynamically produced result.
    ///
    /// Booleans map to `Pass`/`Fail`. An object must carry a boolean `valid`;
    /// its `errors`, if present, must be a list of strings, and every other
    /// field is kept as an extra field.
    pub fn from_json(value: JsonValue) -> Result<Self, TestError> {
        match value {
            JsonValue::Bool(b) => Ok(Outcome::from(b)),
            JsonValue::Object(mut map) => {
                let valid = match map.remove("valid") {
                    Some(JsonValue::Bool(valid)) => valid,
                    Some(_) => {
                        return Err(TestError::InvalidResult(
                            "'valid' must be a boolean".to_string(),
                        ))
                    }
                    None => {
                        return Err(TestError::InvalidResult(
                            "object result has no 'valid' field".to_string(),
                        ))
                    }
                };
                let errors = match map.remove("errors") {
                    None | Some(JsonValue::Null) => Vec::new(),
                    Some(JsonValue::Array(items)) => items
                        .into_iter()
                        .map(|item| match item {
                            JsonValue::String(s) => Ok(s),
                            _ => Err(TestError::InvalidResult(
                                "'errors' must only contain strings".to_string(),
                            )),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(_) => {
                        return Err(TestError::InvalidResult(
                            "'errors' must be a list".to_string(),
                        ))
                    }
                };
                let extra = if map.is_empty() {
                    Extra::None
                } else {
                    Extra::Fields(map)
                };
                Ok(Outcome::Detailed(Detail {
                    valid,
                    errors,
                    extra,
                }))
            }
            other => Err(TestError::InvalidResult(format!(
                "expected a boolean or an object, got {}",
                other
            ))),
        }
    }
}

impl From<bool> for Outcome {
    fn from(valid: bool) -> Self {
        if valid {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

/// A structured test result.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub valid: bool,
    /// Message templates, formatted by the evaluator.
    pub errors: Vec<String>,
    pub extra: Extra,
}

impl Detail {
    /// Placeholder values the test contributes to its messages.
    ///
    /// The evaluator uses them only for names the constraint itself does not
    /// supply.
    pub fn format_fields(&self) -> Fields {
        match &self.extra {
            Extra::Strength(score) => {
                let mut fields = Fields::new();
                fields.insert("min".to_string(), score.min.to_string());
                fields.insert("bonus".to_string(), score.bonus.to_string());
                fields
            }
            Extra::Fields(map) => map
                .iter()
                .filter(|(_, v)| !v.is_object())
                .map(|(k, v)| (k.clone(), display_json(v)))
                .collect(),
            Extra::Card(_) | Extra::None => Fields::new(),
        }
    }
}

/// Test-specific data attached to a structured result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extra {
    None,
    Card(CardDetail),
    Strength(StrengthDetail),
    Fields(Map<String, JsonValue>),
}

impl Extra {
    pub fn is_none(&self) -> bool {
        matches!(self, Extra::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_bool() {
        assert_eq!(Outcome::from_json(json!(true)).unwrap(), Outcome::Pass);
        assert_eq!(Outcome::from_json(json!(false)).unwrap(), Outcome::Fail);
    }

    #[test]
    fn test_from_json_object() {
        let outcome = Outcome::from_json(json!({
            "valid": false,
            "errors": ["{title} is odd"],
            "score": 3
        }))
        .unwrap();

        match outcome {
            Outcome::Detailed(detail) => {
                assert!(!detail.valid);
                assert_eq!(detail.errors, vec!["{title} is odd"]);
                match &detail.extra {
                    Extra::Fields(map) => assert_eq!(map.get("score"), Some(&json!(3))),
                    other => panic!("unexpected extra: {:?}", other),
                }
                assert_eq!(detail.format_fields().get("score").map(String::as_str), Some("3"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_other_shapes() {
        assert!(Outcome::from_json(json!("yes")).is_err());
        assert!(Outcome::from_json(json!(1)).is_err());
        assert!(Outcome::from_json(json!({ "errors": [] })).is_err());
        assert!(Outcome::from_json(json!({ "valid": "true" })).is_err());
        assert!(Outcome::from_json(json!({ "valid": true, "errors": "x" })).is_err());
        assert!(Outcome::from_json(json!({ "valid": true, "errors": [1] })).is_err());
    }

    #[test]
    fn test_is_valid() {
        assert!(Outcome::Pass.is_valid());
        assert!(!Outcome::Fail.is_valid());
        let detail = Detail {
            valid: true,
            errors: Vec::new(),
            extra: Extra::None,
        };
        assert!(Outcome::Detailed(detail).is_valid());
    }
}
