// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Parameters resolved for a single test invocation.

use serde_json::{Map, Value as JsonValue};

/// The parameter object a test is invoked with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Map<String, JsonValue>,
    config: Option<JsonValue>,
}

impl Params {
    /// Create an empty parameter object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Attach test configuration.
    pub fn with_config(mut self, config: JsonValue) -> Self {
        self.config = Some(config);
        self
    }

    pub(crate) fn insert(&mut self, name: &str, value: JsonValue) {
        self.values.insert(name.to_string(), value);
    }

    /// A raw parameter.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }

    /// A numeric parameter; numeric strings are accepted.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A string parameter.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(JsonValue::as_str)
    }

    /// A parameter that may be a single string or a list of strings.
    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        string_list(self.get(name)?)
    }

    /// The opaque `config` pass-through.
    pub fn config(&self) -> Option<&JsonValue> {
        self.config.as_ref()
    }

    /// A field of the `config` object.
    pub fn config_field(&self, name: &str) -> Option<&JsonValue> {
        self.config.as_ref()?.get(name)
    }
}

pub(crate) fn string_list(value: &JsonValue) -> Option<Vec<String>> {
    match value {
        JsonValue::String(s) => Some(vec![s.clone()]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let params = Params::new()
            .with("min", 6)
            .with("max", "12")
            .with("format", "ymd")
            .with("formats", json!(["%Y", "%d"]))
            .with_config(json!({ "messages": { "hasLower": "x" } }));

        assert_eq!(params.number("min"), Some(6.0));
        assert_eq!(params.number("max"), Some(12.0));
        assert_eq!(params.number("format"), None);
        assert_eq!(params.text("format"), Some("ymd"));
        assert_eq!(
            params.list("formats"),
            Some(vec!["%Y".to_string(), "%d".to_string()])
        );
        assert_eq!(params.list("format"), Some(vec!["ymd".to_string()]));
        assert!(params.config_field("messages").is_some());
        assert!(params.get("missing").is_none());
    }

    #[test]
    fn test_mixed_list_is_rejected() {
        let params = Params::new().with("formats", json!(["%Y", 3]));
        assert_eq!(params.list("formats"), None);
    }
}
