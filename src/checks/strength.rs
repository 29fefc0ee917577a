// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Password strength scoring.

use crate::error::TestError;
use crate::rules::{Params, Value};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use super::outcome::{Detail, Extra, Outcome};
use super::Test;

/// Strength labels indexed by points.
pub const STRENGTH_LABELS: [&str; 7] = [
    "Very Weak",
    "Weak",
    "Better",
    "Almost",
    "Acceptable",
    "Strong",
    "Very Strong",
];

const MAX_POINTS: u32 = 6;
const DEFAULT_MIN: usize = 8;
const DEFAULT_BONUS: usize = 10;

/// Sub-checks in the order their messages are reported, with defaults.
const SUB_CHECKS: [(&str, &str); 5] = [
    ("isMinimum", "{title} must be at least {min} characters"),
    ("hasLower", "{title} must have at least 1 lower case character"),
    ("hasUpper", "{title} must have at least 1 upper case character"),
    ("hasSpecial", "{title} must have at least 1 special character"),
    ("hasNumber", "{title} must have at least 1 number"),
];

lazy_static! {
    static ref LOWER_REGEX: Regex = Regex::new(r"[a-z]").unwrap();
    static ref UPPER_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref NUMBER_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
    // The special character must follow at least one other character.
    static ref SPECIAL_REGEX: Regex = Regex::new(r"(?s).[!@#$%^&*?_~\-()]").unwrap();
}

/// Score breakdown reported by the strength test.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthDetail {
    pub points: u32,
    pub percent: u32,
    /// Label for the score, e.g. "Strong".
    pub strength: String,
    pub is_minimum: bool,
    pub is_bonus: bool,
    pub has_lower: bool,
    pub has_upper: bool,
    pub has_number: bool,
    pub has_special: bool,
    /// Effective minimum length threshold.
    pub min: usize,
    /// Effective bonus length threshold.
    pub bonus: usize,
}

impl StrengthDetail {
    fn passes(&self, check: &str) -> bool {
        match check {
            "isMinimum" => self.is_minimum,
            "hasLower" => self.has_lower,
            "hasUpper" => self.has_upper,
            "hasSpecial" => self.has_special,
            "hasNumber" => self.has_number,
            _ => true,
        }
    }
}

/// Scores a password and rejects it below five points.
///
/// Length earns one point, two when it exceeds `bonus`. Lower case, upper
/// case, digits and special characters earn one point each, but only once the
/// length exceeds `min`. The `has*` flags record whether a class is present
/// regardless of length.
#[derive(Debug, Clone, Default)]
pub struct StrengthTest {
    messages: HashMap<String, String>,
    message: Option<String>,
}

impl StrengthTest {
    pub const MESSAGE: &'static str = "{title} did not pass the strength test.";
    pub const PARAMS: &'static [&'static str] = &["min", "bonus"];

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rule message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replace the message of a sub-check (`isMinimum`, `hasLower`, ...).
    pub fn with_sub_message(
        mut self,
        check: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.messages.insert(check.into(), message.into());
        self
    }

    /// Names of the sub-checks, in reporting order.
    pub fn sub_checks() -> impl Iterator<Item = &'static str> {
        SUB_CHECKS.iter().map(|(name, _)| *name)
    }

    /// Score a password against the given thresholds.
    pub fn score(text: &str, min: usize, bonus: usize) -> StrengthDetail {
        let len = text.chars().count();
        let (mut points, is_minimum, is_bonus) = if len > bonus {
            (2, true, true)
        } else if len > min {
            (1, true, false)
        } else {
            (1, false, false)
        };

        let has_lower = LOWER_REGEX.is_match(text);
        let has_upper = UPPER_REGEX.is_match(text);
        let has_number = NUMBER_REGEX.is_match(text);
        let has_special = SPECIAL_REGEX.is_match(text);

        if is_minimum {
            points += [has_lower, has_upper, has_number, has_special]
                .iter()
                .filter(|present| **present)
                .count() as u32;
        }

        StrengthDetail {
            points,
            percent: (f64::from(points) / f64::from(MAX_POINTS) * 100.0).ceil() as u32,
            strength: STRENGTH_LABELS[points.min(MAX_POINTS) as usize].to_string(),
            is_minimum,
            is_bonus,
            has_lower,
            has_upper,
            has_number,
            has_special,
            min,
            bonus,
        }
    }

    fn sub_message<'a>(&'a self, check: &str, default: &'a str, params: &'a Params) -> &'a str {
        params
            .config_field("messages")
            .and_then(|messages| messages.get(check))
            .and_then(|message| message.as_str())
            .or_else(|| self.messages.get(check).map(String::as_str))
            .unwrap_or(default)
    }
}

/// A positive threshold parameter, or the default.
fn threshold(params: &Params, name: &str, default: usize) -> usize {
    match params.number(name) {
        Some(n) if n >= 1.0 => n as usize,
        _ => default,
    }
}

impl Test for StrengthTest {
    fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(Self::MESSAGE)
    }

    fn optional(&self) -> &[&str] {
        Self::PARAMS
    }

    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError> {
        let min = threshold(params, "min", DEFAULT_MIN);
        let bonus = threshold(params, "bonus", DEFAULT_BONUS);
        let score = Self::score(&value.as_text(), min, bonus);

        let errors = SUB_CHECKS
            .iter()
            .filter(|(check, _)| !score.passes(check))
            .map(|(check, default)| self.sub_message(check, default, params).to_string())
            .collect();

        Ok(Outcome::Detailed(Detail {
            valid: score.points > 4,
            errors,
            extra: Extra::Strength(score),
        }))
    }
}
