// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! approve - declarative value validation
//!
//! A value is checked against a rule set: an ordered map from test names to
//! constraints. Each rule is dispatched to a registered test, and failures come
//! back as formatted, human readable messages.
//!
//! # Features
//!
//! - **Rule Engine**: ordered rule sets with `title`, `stop` and `ignoreNull`
//! - **Built-in Tests**: email, url, ip, lengths, dates, credit cards, password strength
//! - **Message Templates**: `{placeholder}` substitution with per-rule overrides
//! - **Extensible Registry**: register custom tests at runtime
//! - **Configuration**: named rule sets and localized messages in `approve.toml`
//!
//! # Example
//!
//! ```no_run
//! use approve::rules::{RuleSet, Value};
//!
//! let rules = RuleSet::new()
//!     .title("Password")
//!     .rule("required", true)
//!     .rule("min", 8);
//!
//! let result = approve::value(&Value::from("hunter2"), &rules).unwrap();
//! for error in result.errors() {
//!     println!("{}", error);
//! }
//! ```

// Module declarations
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod message;
pub mod rules;

// Re-exports for convenience
pub use checks::{FnTest, JsonTest, Outcome, Test};
pub use config::ApproveConfig;
pub use error::{ApproveError, EvaluationError, RegistryError, Result};
pub use rules::{Approver, Constraint, EvaluationResult, RuleSet, Value};

use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    /// Process-wide approver holding the built-in tests.
    static ref DEFAULT: Approver = Approver::with_builtins();
}

/// Evaluate a value with the process-wide approver.
pub fn value(
    value: &Value,
    rules: &RuleSet,
) -> std::result::Result<EvaluationResult, EvaluationError> {
    DEFAULT.evaluate(value, rules)
}

/// Register a test with the process-wide approver.
pub fn add_test(
    name: impl Into<String>,
    test: Arc<dyn Test>,
) -> std::result::Result<(), RegistryError> {
    DEFAULT.register(name, test)
}

/// The process-wide approver.
pub fn default_approver() -> &'static Approver {
    &DEFAULT
}

/// Version information embedded at compile time.
pub mod version {
    /// The current version of approve.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// The git SHA at compile time (if available).
    pub const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");

    /// Get a formatted version string.
    pub fn version_string() -> String {
        // vergen emits a placeholder outside a git checkout.
        match GIT_SHA.filter(|sha| !sha.starts_with("VERGEN")) {
            Some(sha) => format!("{} ({})", VERSION, &sha[..7.min(sha.len())]),
            None => VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Params;

    #[test]
    fn test_default_approver() {
        let rules = RuleSet::new().title("Age").rule("numeric", true);
        let result = value(&Value::from("forty"), &rules).unwrap();
        assert!(!result.approved);
        assert_eq!(result.errors, vec!["Age may only contain [0-9]"]);
    }

    #[test]
    fn test_add_test_to_default_approver() {
        add_test(
            "startsWithA",
            Arc::new(FnTest::new("{title} must start with A", &[], |value: &Value, _: &Params| {
                value.as_text().starts_with('A')
            })),
        )
        .unwrap();

        let rules = RuleSet::new().rule("startsWithA", true);
        assert!(value(&Value::from("Apple"), &rules).unwrap().approved);
        assert!(default_approver().has_test("startsWithA"));
        assert!(matches!(
            add_test("email", Arc::new(FnTest::new("", &[], |_: &Value, _: &Params| true))),
            Err(RegistryError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_version_string() {
        assert!(version::version_string().starts_with(version::VERSION));
    }
}
