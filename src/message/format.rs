// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Placeholder substitution.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static! {
    /// Matches `{{`, `}}` and `{name}` tokens.
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{\{|\}\}|\{(\w+)\}").unwrap();
}

/// Values available to a template, keyed by placeholder name.
pub type Fields = HashMap<String, String>;

/// Render a message template.
///
/// Every `{name}` is replaced with `fields[name]`; `{{` and `}}` produce a
/// literal brace. A placeholder with no matching field renders as an empty
/// string. The result is trimmed, so a message that starts with an empty
/// `{title}` does not keep the leading space.
pub fn format(template: &str, fields: &Fields) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| match &caps[0] {
            "{{" => "{".to_string(),
            "}}" => "}".to_string(),
            _ => fields.get(&caps[1]).cloned().unwrap_or_default(),
        })
        .trim()
        .to_string()
}

/// Stringify a parameter value for use as a placeholder field.
pub fn display_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_json)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_placeholders() {
        let f = fields(&[("title", "Password"), ("min", "8")]);
        assert_eq!(
            format("{title} must be at least {min} characters", &f),
            "Password must be at least 8 characters"
        );
    }

    #[test]
    fn test_repeated_placeholder() {
        let f = fields(&[("x", "ab")]);
        assert_eq!(format("{x}-{x}", &f), "ab-ab");
    }

    #[test]
    fn test_brace_escapes() {
        let f = fields(&[("title", "Name")]);
        assert_eq!(format("{{title}} is {title}", &f), "{title} is Name");
        assert_eq!(format("}}{{", &f), "}{");
    }

    #[test]
    fn test_unresolved_placeholder_is_empty() {
        assert_eq!(
            format("{title} must be a valid email address", &Fields::new()),
            "must be a valid email address"
        );
        assert_eq!(format("a{missing}b", &Fields::new()), "ab");
    }

    #[test]
    fn test_plain_template_is_trimmed_only() {
        let s = "  nothing to replace here \n";
        assert_eq!(format(s, &Fields::new()), s.trim());
    }

    #[test]
    fn test_non_word_braces_are_left_alone() {
        assert_eq!(format("{not a key}", &Fields::new()), "{not a key}");
    }

    #[test]
    fn test_display_json() {
        assert_eq!(display_json(&serde_json::json!(6)), "6");
        assert_eq!(display_json(&serde_json::json!(2.5)), "2.5");
        assert_eq!(display_json(&serde_json::json!("ymd")), "ymd");
        assert_eq!(display_json(&serde_json::json!(["a", 1])), "a, 1");
        assert_eq!(display_json(&serde_json::Value::Null), "");
    }
}
