// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Rule engine: evaluates a value against a rule set.

use crate::checks::{Extra, Outcome, Test, TestRegistry};
use crate::error::{EvaluationError, RegistryError};
use crate::message::{display_json, format, Fields, MessageCatalog};
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::params::Params;
use super::result::{EvaluationResult, RuleOutcome};
use super::ruleset::{Constraint, RuleSet};
use super::value::Value;

/// Evaluates values against rule sets using a registry of tests.
///
/// Evaluation only takes the registry's read lock, so an `Arc<Approver>` can
/// be shared across threads once its tests are registered.
#[derive(Debug, Default)]
pub struct Approver {
    registry: RwLock<TestRegistry>,
}

impl Approver {
    /// Create an approver over the given registry.
    pub fn new(registry: TestRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Create an approver with every built-in test.
    pub fn with_builtins() -> Self {
        Self::new(TestRegistry::with_builtins())
    }

    /// Create an approver with the built-in tests, localized by `catalog`.
    pub fn with_catalog(catalog: &dyn MessageCatalog) -> Self {
        Self::new(TestRegistry::with_catalog(catalog))
    }

    /// Register a custom test.
    pub fn register(
        &self,
        name: impl Into<String>,
        test: Arc<dyn Test>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        tracing::debug!("Registering test '{}'", name);
        self.registry.write().register(name, test)
    }

    /// Whether a test is registered under `name`.
    pub fn has_test(&self, name: &str) -> bool {
        self.registry.read().contains(name)
    }

    /// The test registered under `name`.
    pub fn test(&self, name: &str) -> Option<Arc<dyn Test>> {
        self.registry.read().lookup(name)
    }

    /// Names of every registered test, sorted.
    pub fn test_names(&self) -> Vec<String> {
        self.registry.read().names().into_iter().map(str::to_string).collect()
    }

    /// Evaluate a value against a rule set.
    ///
    /// A value that fails its rules is not an error: the result comes back
    /// with `approved == false`. Errors are reserved for rule sets that cannot
    /// be evaluated, and abort the call without a partial result.
    pub fn evaluate(
        &self,
        value: &Value,
        rules: &RuleSet,
    ) -> Result<EvaluationResult, EvaluationError> {
        tracing::debug!("Evaluating {} rule(s) for '{}'", rules.len(), rules.title);
        let registry = self.registry.read();
        let mut result = EvaluationResult::new();

        for (name, constraint) in rules.rules() {
            if rules.stop && !result.approved {
                tracing::debug!("Stopping before '{}' after a failed rule", name);
                break;
            }

            let test = registry
                .lookup(name)
                .ok_or_else(|| EvaluationError::UnknownTest {
                    rule: name.to_string(),
                })?;

            if rules.ignore_null && value.is_falsy() {
                tracing::trace!("Skipping '{}' for an empty value", name);
                continue;
            }

            let params = build_params(name, test.as_ref(), constraint)?;
            let outcome = test
                .validate(value, &params)
                .map_err(|e| e.into_evaluation_error(name))?;

            let mut fields = message_fields(test.as_ref(), constraint, &rules.title);
            let rule = match outcome {
                Outcome::Pass => RuleOutcome {
                    rule: name.to_string(),
                    approved: true,
                    errors: Vec::new(),
                    detail: Extra::None,
                },
                Outcome::Fail => RuleOutcome {
                    rule: name.to_string(),
                    approved: false,
                    errors: vec![format(rule_message(test.as_ref(), constraint), &fields)],
                    detail: Extra::None,
                },
                Outcome::Detailed(detail) => {
                    // Strength thresholds are the ones the score was computed with.
                    let effective = matches!(detail.extra, Extra::Strength(_));
                    for (key, field) in detail.format_fields() {
                        if effective {
                            fields.insert(key, field);
                        } else {
                            fields.entry(key).or_insert(field);
                        }
                    }
                    let mut errors: Vec<String> =
                        detail.errors.iter().map(|e| format(e, &fields)).collect();
                    if !detail.valid {
                        errors.push(format(rule_message(test.as_ref(), constraint), &fields));
                    }
                    RuleOutcome {
                        rule: name.to_string(),
                        approved: detail.valid,
                        errors,
                        detail: without_reserved_fields(detail.extra, &result),
                    }
                }
            };

            tracing::debug!(
                "Rule '{}' {}",
                name,
                if rule.approved { "passed" } else { "failed" }
            );
            result.push(rule);
        }

        Ok(result)
    }

    /// Evaluate a value against a rule set given as JSON.
    pub fn evaluate_json(
        &self,
        value: &Value,
        rules: &JsonValue,
    ) -> Result<EvaluationResult, EvaluationError> {
        let rules = RuleSet::from_json(rules)?;
        self.evaluate(value, &rules)
    }
}

/// Resolve the parameters a test is invoked with.
fn build_params(
    rule: &str,
    test: &dyn Test,
    constraint: &Constraint,
) -> Result<Params, EvaluationError> {
    let expects = test.expects();
    let mut params = Params::new();

    for &name in expects {
        let resolved = match constraint.field(name) {
            Some(value) => value,
            None if expects.len() == 1 => constraint
                .shorthand()
                .ok_or_else(|| missing(rule, name))?,
            None => return Err(missing(rule, name)),
        };
        params.insert(name, resolved.clone());
    }

    for &name in test.optional() {
        if let Some(value) = constraint.field(name) {
            params.insert(name, value.clone());
        }
    }

    if let Some(config) = constraint.config() {
        params = params.with_config(config.clone());
    }

    tracing::trace!("Resolved parameters for '{}': {:?}", rule, params);
    Ok(params)
}

fn missing(rule: &str, parameter: &str) -> EvaluationError {
    EvaluationError::MissingParameter {
        rule: rule.to_string(),
        parameter: parameter.to_string(),
    }
}

fn rule_message<'a>(test: &'a dyn Test, constraint: &'a Constraint) -> &'a str {
    constraint.message().unwrap_or_else(|| test.message())
}

/// Placeholder values for a rule's messages, taken from the constraint.
fn message_fields(test: &dyn Test, constraint: &Constraint, title: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("title".to_string(), constraint.title().unwrap_or(title).to_string());

    let expects = test.expects();
    for &name in expects {
        let value = match constraint.field(name) {
            Some(value) => Some(value),
            None if expects.len() == 1 => constraint.shorthand(),
            None => None,
        };
        if let Some(value) = value {
            fields.insert(name.to_string(), display_json(value));
        }
    }

    for &name in test.optional() {
        if let Some(value) = constraint.field(name) {
            fields.insert(name.to_string(), display_json(value));
        }
    }

    fields
}

/// Drop loose detail fields that would shadow aggregate keys or earlier rules.
fn without_reserved_fields(extra: Extra, result: &EvaluationResult) -> Extra {
    match extra {
        Extra::Fields(map) => Extra::Fields(
            map.into_iter()
                .filter(|(key, _)| {
                    let shadows = matches!(key.as_str(), "approved" | "errors" | "failed" | "valid")
                        || result.get(key).is_some();
                    if shadows {
                        tracing::debug!("Dropping result field '{}'", key);
                    }
                    !shadows
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{FnTest, JsonTest};
    use crate::message::Messages;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn approver() -> Approver {
        Approver::with_builtins()
    }

    fn evaluate(value: impl Into<Value>, rules: JsonValue) -> EvaluationResult {
        approver().evaluate_json(&value.into(), &rules).unwrap()
    }

    #[test]
    fn test_all_rules_pass() {
        let result = evaluate(
            "user@domain.com",
            json!({ "title": "Email", "required": true, "email": true }),
        );
        assert!(result.approved);
        assert!(result.errors.is_empty());
        assert!(result.failed.is_empty());
        assert_eq!(result.rules.len(), 2);
    }

    #[test]
    fn test_failures_are_collected_in_order() {
        let result = evaluate(
            "ab",
            json!({ "title": "Code", "min": 6, "numeric": true, "alpha": true }),
        );
        assert!(!result.approved);
        assert_eq!(result.failed, vec!["min", "numeric"]);
        assert_eq!(
            result.errors,
            vec![
                "Code must be a minimum of 6 characters",
                "Code may only contain [0-9]",
            ]
        );
        assert!(result.get("alpha").unwrap().approved);
    }

    #[test]
    fn test_stop_halts_after_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let approver = approver();
        approver
            .register(
                "counted",
                Arc::new(FnTest::new("{title} counted", &[], move |_: &Value, _: &Params| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                })),
            )
            .unwrap();

        let rules = json!({
            "stop": true,
            "counted": true,
            "numeric": true,
            "alpha": true,
            "counted2": true
        });
        // `counted2` is never looked up, so it does not raise UnknownTest.
        let result = approver.evaluate_json(&Value::from("abc"), &rules).unwrap();
        assert_eq!(result.failed, vec!["numeric"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.get("alpha").is_none());

        let rules = json!({ "stop": true, "numeric": true, "counted": true });
        let result = approver.evaluate_json(&Value::from("abc"), &rules).unwrap();
        assert_eq!(result.failed.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ignore_null_skips_every_rule() {
        for value in [Value::Null, Value::from(""), Value::from(0), Value::from(false)] {
            let result = approver()
                .evaluate_json(
                    &value,
                    &json!({ "ignoreNull": true, "required": true, "email": true }),
                )
                .unwrap();
            assert!(result.approved);
            assert!(result.errors.is_empty());
            assert!(result.rules.is_empty());
        }

        let result = evaluate("nope", json!({ "ignoreNull": true, "email": true }));
        assert!(!result.approved);
    }

    #[test]
    fn test_ignore_null_still_rejects_unknown_tests() {
        let err = approver()
            .evaluate_json(&Value::Null, &json!({ "ignoreNull": true, "nonexistent": true }))
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::UnknownTest {
                rule: "nonexistent".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_test_is_fatal() {
        let err = approver()
            .evaluate_json(&Value::from("x"), &json!({ "required": true, "always": true }))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::UnknownTest { ref rule } if rule == "always"));
    }

    #[test]
    fn test_custom_test_registration() {
        let approver = approver();
        approver
            .register(
                "always",
                Arc::new(FnTest::new(
                    "{title} never fails",
                    &[],
                    |_: &Value, _: &Params| true,
                )),
            )
            .unwrap();
        assert!(approver.has_test("always"));

        let result = approver
            .evaluate_json(&Value::from("anything"), &json!({ "always": true }))
            .unwrap();
        assert!(result.approved);

        let again = approver.register(
            "always",
            Arc::new(FnTest::new("x", &[], |_: &Value, _: &Params| false)),
        );
        assert!(matches!(again, Err(RegistryError::AlreadyExists { .. })));
    }

    #[test]
    fn test_missing_parameter() {
        let err = approver()
            .evaluate_json(&Value::from("abc"), &json!({ "range": { "min": 1 } }))
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::MissingParameter {
                rule: "range".to_string(),
                parameter: "max".to_string(),
            }
        );

        let err = approver()
            .evaluate_json(&Value::from("abc"), &json!({ "min": true }))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::MissingParameter { .. }));
    }

    #[test]
    fn test_shorthand_only_for_single_parameter() {
        let result = evaluate("123456", json!({ "min": 6 }));
        assert!(result.approved);

        let err = approver()
            .evaluate_json(&Value::from("abc"), &json!({ "range": 6 }))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::MissingParameter { .. }));
    }

    #[test]
    fn test_invalid_test_result() {
        let approver = approver();
        approver
            .register(
                "broken",
                Arc::new(JsonTest::new("{title} broke", &[], |_: &Value, _: &Params| json!("yes"))),
            )
            .unwrap();
        let err = approver
            .evaluate_json(&Value::from("x"), &json!({ "broken": true }))
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InvalidTestResult { ref rule, .. } if rule == "broken"
        ));
    }

    #[test]
    fn test_invalid_regex_is_fatal() {
        let err = approver()
            .evaluate_json(&Value::from("x"), &json!({ "format": "([" }))
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InvalidParameter { ref parameter, .. } if parameter == "regex"
        ));
    }

    #[test]
    fn test_custom_message_and_placeholders() {
        let result = evaluate(
            "abc",
            json!({
                "title": "Password",
                "min": { "min": 6, "message": "{title} needs {min}+ characters, {{really}}" }
            }),
        );
        assert_eq!(result.errors, vec!["Password needs 6+ characters, {really}"]);
    }

    #[test]
    fn test_per_rule_title_override() {
        let result = evaluate(
            "",
            json!({ "title": "Field", "required": { "title": "Name" }, "alpha": true }),
        );
        assert_eq!(
            result.errors,
            vec!["Name is required", "Field may only contain [A-Za-z]"]
        );
    }

    #[test]
    fn test_missing_title_is_trimmed() {
        let result = evaluate("", json!({ "required": true }));
        assert_eq!(result.errors, vec!["is required"]);
    }

    #[test]
    fn test_equal_message_uses_field() {
        let result = evaluate(
            "abc",
            json!({ "title": "Confirmation", "equal": { "value": "abd", "field": "password" } }),
        );
        assert_eq!(result.errors, vec!["Confirmation must be equal to password"]);
    }

    #[test]
    fn test_card_detail_is_reported() {
        let result = evaluate("4111111111111111", json!({ "cc": true }));
        assert!(result.approved);
        assert_eq!(result.to_json()["cc"]["scheme"], json!("Visa"));

        let result = evaluate("4111111111111112", json!({ "title": "Card", "cc": true }));
        assert_eq!(result.errors, vec!["Card is not a valid credit card number"]);
    }

    #[test]
    fn test_strength_config_messages() {
        let result = evaluate(
            "@THISI$ASTR0NGPASSW0RD",
            json!({
                "title": "Password",
                "strength": {
                    "min": 6,
                    "bonus": 7,
                    "config": {
                        "messages": {
                            "hasLower": "At least one lower case letter expected from {title}"
                        }
                    }
                }
            }),
        );
        assert!(result.approved);
        assert_eq!(result.errors[0], "At least one lower case letter expected from Password");
        assert_eq!(result.to_json()["strength"]["points"], json!(5));
    }

    #[test]
    fn test_weak_password_gets_rule_message_last() {
        let result = evaluate("abcd", json!({ "title": "Password", "strength": true }));
        assert!(!result.approved);
        assert_eq!(result.failed, vec!["strength"]);
        assert_eq!(result.errors[0], "Password must be at least 8 characters");
        assert_eq!(
            result.errors.last().map(String::as_str),
            Some("Password did not pass the strength test.")
        );
    }

    #[test]
    fn test_strength_messages_use_effective_thresholds() {
        let result = evaluate(
            "abcd",
            json!({ "title": "Password", "strength": { "min": "lots", "bonus": 12 } }),
        );
        assert_eq!(result.errors[0], "Password must be at least 8 characters");
        assert_eq!(result.to_json()["strength"]["min"], json!(8));

        let result = evaluate(
            "abcd",
            json!({ "title": "Password", "strength": { "min": 6, "bonus": 7 } }),
        );
        assert_eq!(result.errors[0], "Password must be at least 6 characters");
    }

    #[test]
    fn test_loose_fields_never_shadow() {
        let approver = approver();
        approver
            .register(
                "scored",
                Arc::new(JsonTest::new("{title} scored {score}", &[], |_: &Value, _: &Params| {
                    json!({ "valid": false, "score": 3, "failed": "shadow", "required": "shadow" })
                })),
            )
            .unwrap();
        let result = approver
            .evaluate_json(
                &Value::from("x"),
                &json!({ "title": "It", "required": true, "scored": true }),
            )
            .unwrap();

        assert_eq!(result.errors, vec!["It scored 3"]);
        assert_eq!(
            result.to_json()["scored"],
            json!({ "approved": false, "errors": ["It scored 3"], "score": 3 })
        );
    }

    #[test]
    fn test_localized_approver() {
        let catalog = Messages::new().with_message("required", "{title} est obligatoire");
        let approver = Approver::with_catalog(&catalog);
        let result = approver
            .evaluate_json(&Value::Null, &json!({ "title": "Nom", "required": true }))
            .unwrap();
        assert_eq!(result.errors, vec!["Nom est obligatoire"]);
    }

    #[test]
    fn test_invalid_rule_set() {
        let err = approver()
            .evaluate_json(&Value::from("x"), &json!(["required"]))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidArgument { .. }));
    }

    #[test]
    fn test_registry_survives_panicking_writer() {
        let approver = Arc::new(approver());
        let writer = Arc::clone(&approver);
        let outcome = std::thread::spawn(move || {
            let _guard = writer.registry.write();
            panic!("writer failed");
        })
        .join();
        assert!(outcome.is_err());

        approver
            .register("late", Arc::new(FnTest::new("", &[], |_: &Value, _: &Params| true)))
            .unwrap();
        assert!(approver.has_test("late"));
    }

    #[test]
    fn test_shared_across_threads() {
        let approver = Arc::new(approver());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let approver = Arc::clone(&approver);
                std::thread::spawn(move || {
                    let rules = RuleSet::new().rule("numeric", true);
                    approver.evaluate(&Value::from(i), &rules).unwrap().approved
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
