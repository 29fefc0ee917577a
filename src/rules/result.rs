// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Evaluation result types.

use crate::checks::Extra;
use crate::cli::args::OutputFormat;
use console::style;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Keys of the flattened result that a rule entry may not shadow.
const RESULT_KEYS: &[&str] = &["approved", "errors", "failed"];

/// Keys of a rule entry that extra test fields may not shadow.
const RULE_KEYS: &[&str] = &["approved", "errors", "valid"];

/// Outcome of one evaluated rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    /// The rule name.
    pub rule: String,
    pub approved: bool,
    /// Formatted messages produced by this rule, in order.
    pub errors: Vec<String>,
    /// Test-specific data, e.g. the card scheme or the strength score.
    #[serde(skip_serializing_if = "Extra::is_none")]
    pub detail: Extra,
}

impl RuleOutcome {
    /// The entry as a flat JSON object: `approved`, `errors` and the detail
    /// fields side by side.
    pub fn to_json(&self) -> JsonValue {
        let mut entry = Map::new();
        entry.insert("approved".to_string(), JsonValue::Bool(self.approved));
        entry.insert(
            "errors".to_string(),
            JsonValue::Array(self.errors.iter().cloned().map(JsonValue::String).collect()),
        );

        if let Ok(JsonValue::Object(fields)) = serde_json::to_value(&self.detail) {
            for (key, value) in fields {
                if RULE_KEYS.contains(&key.as_str()) {
                    tracing::debug!("Dropping detail field '{}' of rule '{}'", key, self.rule);
                    continue;
                }
                entry.insert(key, value);
            }
        }

        JsonValue::Object(entry)
    }
}

/// Result of evaluating a value against a rule set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Whether every evaluated rule passed.
    pub approved: bool,
    /// Every formatted message, in rule order.
    pub errors: Vec<String>,
    /// Names of the rules that failed, in rule order.
    pub failed: Vec<String>,
    /// Per-rule outcomes for the rules that ran.
    pub rules: Vec<RuleOutcome>,
}

impl EvaluationResult {
    /// A result with nothing evaluated yet.
    pub fn new() -> Self {
        Self {
            approved: true,
            ..Self::default()
        }
    }

    /// Record the outcome of a rule.
    pub(crate) fn push(&mut self, outcome: RuleOutcome) {
        if !outcome.approved {
            self.approved = false;
            self.failed.push(outcome.rule.clone());
        }
        self.errors.extend(outcome.errors.iter().cloned());
        self.rules.push(outcome);
    }

    /// Look up the outcome of a rule that ran.
    pub fn get(&self, rule: &str) -> Option<&RuleOutcome> {
        self.rules.iter().find(|outcome| outcome.rule == rule)
    }

    /// Iterate over every message.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(String::as_str)
    }

    /// The result as one JSON object with a key per evaluated rule.
    pub fn to_json(&self) -> JsonValue {
        let mut result = Map::new();
        result.insert("approved".to_string(), JsonValue::Bool(self.approved));
        result.insert(
            "errors".to_string(),
            JsonValue::Array(self.errors.iter().cloned().map(JsonValue::String).collect()),
        );
        result.insert(
            "failed".to_string(),
            JsonValue::Array(self.failed.iter().cloned().map(JsonValue::String).collect()),
        );

        for outcome in &self.rules {
            if RESULT_KEYS.contains(&outcome.rule.as_str()) {
                tracing::warn!("Rule '{}' shadows a result field; omitted from JSON", outcome.rule);
                continue;
            }
            result.insert(outcome.rule.clone(), outcome.to_json());
        }

        JsonValue::Object(result)
    }

    /// One-line summary for terminal output.
    pub fn summary(&self) -> String {
        if self.approved {
            format!("{} approved", style("✓").green().bold())
        } else {
            format!(
                "{} not approved ({} failed: {})",
                style("✗").red().bold(),
                self.failed.len(),
                self.failed.join(", ")
            )
        }
    }

    /// Print the result to stdout.
    pub fn print(&self, format: Option<OutputFormat>) {
        match format {
            Some(OutputFormat::Json) => self.print_json(),
            _ => self.print_text(),
        }
    }

    fn print_text(&self) {
        println!("{}", self.summary());

        for outcome in &self.rules {
            let status = if outcome.approved {
                style("✓").green()
            } else {
                style("✗").red()
            };
            println!("  {} {}", status, style(&outcome.rule).cyan());
            for error in &outcome.errors {
                println!("      {} {}", style("→").dim(), error);
            }
        }
    }

    fn print_json(&self) {
        match serde_json::to_string_pretty(&self.to_json()) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to serialize result: {}", e),
        }
    }
}
