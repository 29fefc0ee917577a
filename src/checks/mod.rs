// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Validation tests.
//!
//! A test is a named check the evaluator can dispatch a rule to. This module
//! defines the contract every test implements, the registry that maps rule
//! names to tests, and the built-in catalog.

mod builtin;
mod card;
mod date;
mod outcome;
mod registry;
mod strength;

pub use builtin::{builtin_tests, Predicate};
pub use card::{CardDetail, CardTest, SCHEMES};
pub use date::{ChronoDateParser, DateCompareTest, DateParser, DateTest, DEFAULT_DATE_FORMATS};
pub use outcome::{Detail, Extra, Outcome};
pub use registry::TestRegistry;
pub use strength::{StrengthDetail, StrengthTest, STRENGTH_LABELS};

use crate::error::TestError;
use crate::rules::{Params, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// A named validation check.
pub trait Test: Send + Sync {
    /// The default message template used when the test fails.
    fn message(&self) -> &str;

    /// Parameters the test requires, in order.
    fn expects(&self) -> &[&str] {
        &[]
    }

    /// Parameters the test reads when present.
    fn optional(&self) -> &[&str] {
        &[]
    }

    /// Run the test against a value.
    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError>;
}

/// A test backed by a closure.
///
/// The closure may return a `bool` or an [`Outcome`].
pub struct FnTest<F, R = bool> {
    message: String,
    expects: Vec<&'static str>,
    check: F,
    _result: PhantomData<fn() -> R>,
}

impl<F, R> FnTest<F, R>
where
    F: Fn(&Value, &Params) -> R + Send + Sync,
    R: Into<Outcome>,
{
    /// Create a test from a message, its expected parameters and a closure.
    pub fn new(message: impl Into<String>, expects: &[&'static str], check: F) -> Self {
        Self {
            message: message.into(),
            expects: expects.to_vec(),
            check,
            _result: PhantomData,
        }
    }
}

impl<F, R> Test for FnTest<F, R>
where
    F: Fn(&Value, &Params) -> R + Send + Sync,
    R: Into<Outcome>,
{
    fn message(&self) -> &str {
        &self.message
    }

    fn expects(&self) -> &[&str] {
        &self.expects
    }

    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError> {
        Ok((self.check)(value, params).into())
    }
}

/// A test whose closure produces loosely typed JSON results.
///
/// Meant for tests defined outside Rust's type system (bindings, scripts).
/// The result goes through [`Outcome::from_json`], so a malformed result is
/// reported instead of being guessed at.
pub struct JsonTest<F> {
    message: String,
    expects: Vec<&'static str>,
    check: F,
}

impl<F> JsonTest<F>
where
    F: Fn(&Value, &Params) -> serde_json::Value + Send + Sync,
{
    pub fn new(message: impl Into<String>, expects: &[&'static str], check: F) -> Self {
        Self {
            message: message.into(),
            expects: expects.to_vec(),
            check,
        }
    }
}

impl<F> Test for JsonTest<F>
where
    F: Fn(&Value, &Params) -> serde_json::Value + Send + Sync,
{
    fn message(&self) -> &str {
        &self.message
    }

    fn expects(&self) -> &[&str] {
        &self.expects
    }

    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError> {
        Outcome::from_json((self.check)(value, params))
    }
}

/// A test with its default message replaced.
pub struct Localized {
    inner: Arc<dyn Test>,
    message: String,
}

impl Localized {
    pub fn new(inner: Arc<dyn Test>, message: impl Into<String>) -> Self {
        Self {
            inner,
            message: message.into(),
        }
    }
}

impl Test for Localized {
    fn message(&self) -> &str {
        &self.message
    }

    fn expects(&self) -> &[&str] {
        self.inner.expects()
    }

    fn optional(&self) -> &[&str] {
        self.inner.optional()
    }

    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError> {
        self.inner.validate(value, params)
    }
}
