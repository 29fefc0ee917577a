// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Credit card numbers: Luhn checksum and scheme detection.

use crate::error::TestError;
use crate::rules::{Params, Value};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::outcome::{Detail, Extra, Outcome};
use super::Test;

/// Card schemes and their number prefixes, most specific first.
pub const SCHEMES: &[(&str, &str)] = &[
    ("Australian Bank Card", r"^(5610|560221|560222|560223|560224|560225)"),
    ("Diner's Club", r"^(2014|2149)"),
    ("Diner's Club International", r"^36"),
    ("Diner's Club / Carte Blanche", r"^(30[0-5]|36|38|54|55|2014|2149)"),
    ("Japanese Credit Bureau", r"^35(2[89]|[3-8][0-9])"),
    ("Maestro", r"^(5018|5020|5038|6304|6759|676[1-3])"),
    ("Mastercard", r"^5[1-5]"),
    ("Laser", r"^(6304|670[69]|6771)"),
    ("Solo (Paymentech)", r"^(6334|6767)"),
    ("Discover", r"^(6011|622|64|65)"),
    ("American Express", r"^3[47]"),
    ("Visa Electron", r"^(4026|417500|4508|4844|491(3|7))"),
    ("Visa", r"^4"),
];

/// Shortest number any known scheme issues.
const MIN_DIGITS: usize = 12;

lazy_static! {
    static ref NON_DIGIT_REGEX: Regex = Regex::new(r"[^0-9]").unwrap();
    static ref SCHEME_REGEXES: Vec<(&'static str, Regex)> = SCHEMES
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
        .collect();
}

/// Extra data reported by the credit card test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardDetail {
    /// The detected scheme, if the prefix is known.
    pub scheme: Option<String>,
}

/// Checks that a value is a structurally valid card number.
///
/// Only the checksum is verified; the length is not checked against the
/// detected scheme.
#[derive(Debug, Clone, Default)]
pub struct CardTest;

impl CardTest {
    pub const MESSAGE: &'static str = "{title} is not a valid credit card number";

    pub fn new() -> Self {
        Self
    }

    /// The scheme whose prefix matches the digits, first match wins.
    pub fn scheme(digits: &str) -> Option<&'static str> {
        SCHEME_REGEXES
            .iter()
            .find(|(_, regex)| regex.is_match(digits))
            .map(|(name, _)| *name)
    }
}

/// Luhn sum of a digit string, walking right to left.
fn luhn_sum(digits: &str) -> u32 {
    let mut sum = 0;
    let mut mul = 1;
    for d in digits.bytes().rev().map(|b| u32::from(b - b'0')) {
        let ca = d * mul;
        sum += if ca > 9 { ca - 9 } else { ca };
        mul ^= 3;
    }
    sum
}

impl Test for CardTest {
    fn message(&self) -> &str {
        Self::MESSAGE
    }

    fn validate(&self, value: &Value, _params: &Params) -> Result<Outcome, TestError> {
        let text = value.as_text();
        let digits = NON_DIGIT_REGEX.replace_all(&text, "");

        if digits.len() < MIN_DIGITS {
            return Ok(Outcome::Fail);
        }

        let sum = luhn_sum(&digits);
        Ok(Outcome::Detailed(Detail {
            valid: sum % 10 == 0 && sum > 0,
            errors: Vec::new(),
            extra: Extra::Card(CardDetail {
                scheme: Self::scheme(&digits).map(str::to_string),
            }),
        }))
    }
}
