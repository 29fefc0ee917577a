// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Error types for approve.
//!
//! Validation failures are not errors: a rejected value comes back as an
//! [`EvaluationResult`](crate::rules::EvaluationResult) with `approved == false`.
//! The types here describe misuse of the API (bad rule sets, broken tests,
//! duplicate registrations) and failures of the surrounding tooling.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for approve operations.
#[derive(Error, Debug)]
pub enum ApproveError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Rule evaluation faults
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // The value was evaluated and not approved
    #[error("Value was not approved: {count} error(s)")]
    Rejected { count: usize },

    // Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

/// Faults raised while evaluating a rule set.
///
/// Any of these aborts the whole `evaluate` call; no partial result is
/// produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Invalid rule set: {message}")]
    InvalidArgument { message: String },

    #[error("Test not defined: {rule}")]
    UnknownTest { rule: String },

    #[error("Rule '{rule}' expects the '{parameter}' parameter")]
    MissingParameter { rule: String, parameter: String },

    #[error("Rule '{rule}' has an invalid '{parameter}' parameter: {message}")]
    InvalidParameter {
        rule: String,
        parameter: String,
        message: String,
    },

    #[error("Rule '{rule}' returned an invalid value: {message}")]
    InvalidTestResult { rule: String, message: String },
}

/// Errors raised by a test implementation.
///
/// The evaluator attaches the rule name and turns these into
/// [`EvaluationError`]s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TestError {
    #[error("invalid result: {0}")]
    InvalidResult(String),

    #[error("invalid '{parameter}' parameter: {message}")]
    InvalidParameter { parameter: String, message: String },
}

impl TestError {
    /// Attach the rule name the failing test was invoked for.
    pub fn into_evaluation_error(self, rule: &str) -> EvaluationError {
        match self {
            TestError::InvalidResult(message) => EvaluationError::InvalidTestResult {
                rule: rule.to_string(),
                message,
            },
            TestError::InvalidParameter { parameter, message } => {
                EvaluationError::InvalidParameter {
                    rule: rule.to_string(),
                    parameter,
                    message,
                }
            }
        }
    }
}

/// Date parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateParseError {
    #[error("'{value}' does not match any of: {formats}")]
    NoMatch { value: String, formats: String },
}

/// Test registry errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Test already exists: {name}")]
    AlreadyExists { name: String },
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Rule set not defined in configuration: {name}")]
    UnknownRuleSet { name: String },
}

/// Result type alias for approve operations.
pub type Result<T> = std::result::Result<T, ApproveError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: std::error::Error + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ApproveError::WithContext {
            context: context.into(),
            message: e.to_string(),
        })
    }
}
