// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Rule sets and constraints.

use crate::error::EvaluationError;
use serde_json::{Map, Value as JsonValue};

/// Keys of a rule set that configure the evaluation instead of naming a test.
pub const RESERVED_KEYS: &[&str] = &["title", "stop", "ignoreNull"];

/// Keys of a parameter object that never count as test parameters.
pub const MESSAGE_KEY: &str = "message";
pub const TITLE_KEY: &str = "title";
pub const CONFIG_KEY: &str = "config";

/// The value attached to a rule name.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `true`/`false`; the test runs either way.
    Flag(bool),
    /// A bare scalar, usable as a test's single expected parameter.
    Value(JsonValue),
    /// Named parameters plus optional `message`, `title` and `config`.
    Params(Map<String, JsonValue>),
}

impl Constraint {
    /// Build a parameter object from `(name, value)` pairs.
    pub fn params<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<JsonValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Constraint::Params(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up a named field of a parameter object.
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        match self {
            Constraint::Params(map) => map.get(name),
            _ => None,
        }
    }

    /// The scalar usable as a shorthand parameter, if any.
    pub fn shorthand(&self) -> Option<&JsonValue> {
        match self {
            Constraint::Value(value) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    /// The custom message template, if the constraint carries one.
    pub fn message(&self) -> Option<&str> {
        self.field(MESSAGE_KEY).and_then(JsonValue::as_str)
    }

    /// The per-rule title override, if the constraint carries one.
    pub fn title(&self) -> Option<&str> {
        self.field(TITLE_KEY).and_then(JsonValue::as_str)
    }

    /// The opaque test configuration, if the constraint carries one.
    pub fn config(&self) -> Option<&JsonValue> {
        self.field(CONFIG_KEY)
    }
}

impl From<bool> for Constraint {
    fn from(b: bool) -> Self {
        Constraint::Flag(b)
    }
}

impl From<&str> for Constraint {
    fn from(s: &str) -> Self {
        Constraint::Value(JsonValue::from(s))
    }
}

impl From<String> for Constraint {
    fn from(s: String) -> Self {
        Constraint::Value(JsonValue::from(s))
    }
}

impl From<i64> for Constraint {
    fn from(n: i64) -> Self {
        Constraint::Value(JsonValue::from(n))
    }
}

impl From<i32> for Constraint {
    fn from(n: i32) -> Self {
        Constraint::Value(JsonValue::from(n))
    }
}

impl From<f64> for Constraint {
    fn from(n: f64) -> Self {
        Constraint::Value(JsonValue::from(n))
    }
}

impl From<JsonValue> for Constraint {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Bool(b) => Constraint::Flag(b),
            JsonValue::Object(map) => Constraint::Params(map),
            other => Constraint::Value(other),
        }
    }
}

/// An ordered set of named constraints plus evaluation modifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    /// Substituted for `{title}` in messages.
    pub title: String,
    /// Halt after the first failing rule.
    pub stop: bool,
    /// Skip every rule when the value is falsy.
    pub ignore_null: bool,
    rules: Vec<(String, Constraint)>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the stop flag.
    pub fn stop(mut self, stop: bool) -> Self {
        self.stop = stop;
        self
    }

    /// Set the ignoreNull flag.
    pub fn ignore_null(mut self, ignore_null: bool) -> Self {
        self.ignore_null = ignore_null;
        self
    }

    /// Add a rule. A rule name that is already present keeps its position
    /// and takes the new constraint.
    pub fn rule(mut self, name: impl Into<String>, constraint: impl Into<Constraint>) -> Self {
        self.insert(name, constraint);
        self
    }

    /// Add a rule in place.
    pub fn insert(&mut self, name: impl Into<String>, constraint: impl Into<Constraint>) {
        let name = name.into();
        let constraint = constraint.into();
        match self.rules.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = constraint,
            None => self.rules.push((name, constraint)),
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.rules.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Number of rules (modifiers excluded).
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build a rule set from a JSON object.
    ///
    /// `title`, `stop` and `ignoreNull` are read as modifiers; every other key
    /// is a rule, kept in document order.
    pub fn from_json(value: &JsonValue) -> Result<Self, EvaluationError> {
        let map = value.as_object().ok_or_else(|| EvaluationError::InvalidArgument {
            message: format!("rules is not a valid object (got {})", json_kind(value)),
        })?;

        let mut set = RuleSet::new();
        for (key, entry) in map {
            match key.as_str() {
                "title" => {
                    set.title = match entry {
                        JsonValue::String(s) => s.clone(),
                        JsonValue::Null => String::new(),
                        other => return Err(invalid_modifier("title", "a string", other)),
                    };
                }
                "stop" => {
                    set.stop = entry
                        .as_bool()
                        .ok_or_else(|| invalid_modifier("stop", "a boolean", entry))?;
                }
                "ignoreNull" => {
                    set.ignore_null = entry
                        .as_bool()
                        .ok_or_else(|| invalid_modifier("ignoreNull", "a boolean", entry))?;
                }
                _ => set.insert(key.clone(), Constraint::from(entry.clone())),
            }
        }

        Ok(set)
    }

    /// Build a rule set from a TOML table, keeping key order.
    pub fn from_toml(table: &toml::Table) -> Result<Self, EvaluationError> {
        let json = serde_json::to_value(table).map_err(|e| EvaluationError::InvalidArgument {
            message: format!("rules could not be converted: {}", e),
        })?;
        Self::from_json(&json)
    }

    /// Parse a rule set from JSON text.
    pub fn parse_json(text: &str) -> Result<Self, EvaluationError> {
        let json: JsonValue =
            serde_json::from_str(text).map_err(|e| EvaluationError::InvalidArgument {
                message: format!("rules are not valid JSON: {}", e),
            })?;
        Self::from_json(&json)
    }
}

fn invalid_modifier(key: &str, expected: &str, got: &JsonValue) -> EvaluationError {
    EvaluationError::InvalidArgument {
        message: format!("'{}' must be {} (got {})", key, expected, json_kind(got)),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_modifiers() {
        let set = RuleSet::from_json(&json!({
            "title": "Password",
            "stop": true,
            "ignoreNull": true,
            "required": true,
            "min": 8
        }))
        .unwrap();

        assert_eq!(set.title, "Password");
        assert!(set.stop);
        assert!(set.ignore_null);
        let names: Vec<_> = set.rules().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["required", "min"]);
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        let set = RuleSet::parse_json(r#"{"max": 12, "email": true, "alpha": true, "min": 1}"#)
            .unwrap();
        let names: Vec<_> = set.rules().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["max", "email", "alpha", "min"]);
    }

    #[test]
    fn test_constraint_shapes() {
        let set = RuleSet::from_json(&json!({
            "required": true,
            "min": 6,
            "range": { "min": 1, "max": 3, "message": "custom" }
        }))
        .unwrap();
        let rules: Vec<_> = set.rules().collect();

        assert_eq!(rules[0].1, &Constraint::Flag(true));
        assert_eq!(rules[1].1.shorthand(), Some(&json!(6)));
        assert_eq!(rules[2].1.field("max"), Some(&json!(3)));
        assert_eq!(rules[2].1.message(), Some("custom"));
    }

    #[test]
    fn test_not_an_object() {
        let err = RuleSet::from_json(&json!(["email"])).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidArgument { .. }));

        let err = RuleSet::parse_json("not json").unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidArgument { .. }));
    }

    #[test]
    fn test_bad_modifier_type() {
        let err = RuleSet::from_json(&json!({ "stop": "yes", "email": true })).unwrap_err();
        assert!(err.to_string().contains("stop"));
    }

    #[test]
    fn test_builder_replaces_in_place() {
        let set = RuleSet::new()
            .rule("min", 3)
            .rule("email", true)
            .rule("min", 5);
        let rules: Vec<_> = set.rules().collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], ("min", &Constraint::from(5)));
    }

    #[test]
    fn test_from_toml() {
        let table: toml::Table = toml::from_str(
            r#"
title = "Card"
stop = true
required = true
cc = true
"#,
        )
        .unwrap();
        let set = RuleSet::from_toml(&table).unwrap();
        assert_eq!(set.title, "Card");
        assert!(set.stop);
        let names: Vec<_> = set.rules().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["required", "cc"]);
    }
}
