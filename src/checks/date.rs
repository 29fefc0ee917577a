// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Date tests and the parser they delegate calendar work to.

use crate::error::{DateParseError, TestError};
use crate::rules::{Params, Value};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::Arc;

use super::outcome::Outcome;
use super::Test;

/// Formats used by the comparison tests when a rule configures none.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y"];

lazy_static! {
    static ref YMD_REGEX: Regex = Regex::new(
        r"^(?:[0-9]{2})?[0-9]{2}([/-])(?:1[0-2]|0?[1-9])([/-])(?:3[01]|[12][0-9]|0?[1-9])$"
    )
    .unwrap();
    static ref DMY_REGEX: Regex = Regex::new(
        r"^(?:3[01]|[12][0-9]|0?[1-9])([/-])(?:1[0-2]|0?[1-9])([/-])(?:[0-9]{2})?[0-9]{2}$"
    )
    .unwrap();
}

/// Turns text into a calendar date.
pub trait DateParser: Send + Sync {
    /// Parse `value` with the first of `formats` that matches it.
    fn parse(&self, value: &str, formats: &[String]) -> Result<NaiveDate, DateParseError>;
}

/// [`DateParser`] backed by chrono's strftime-style formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoDateParser;

impl DateParser for ChronoDateParser {
    fn parse(&self, value: &str, formats: &[String]) -> Result<NaiveDate, DateParseError> {
        let value = value.trim();
        formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
            .ok_or_else(|| DateParseError::NoMatch {
                value: value.to_string(),
                formats: formats.join(", "),
            })
    }
}

/// Whether `value` matches a named layout (`ymd`, `dmy`), or `None` when the
/// name is not a layout.
fn matches_layout(layout: &str, value: &str) -> Option<bool> {
    let regex: &Regex = match layout {
        "ymd" => &*YMD_REGEX,
        "dmy" => &*DMY_REGEX,
        _ => return None,
    };
    Some(
        regex
            .captures(value)
            .map_or(false, |caps| caps[1] == caps[2]),
    )
}

fn default_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

/// Checks that a value is a date in the given format.
///
/// `format` is either a named layout (`ymd`, `dmy`) or one or more parser
/// formats.
pub struct DateTest {
    parser: Arc<dyn DateParser>,
}

impl DateTest {
    pub const MESSAGE: &'static str = "{title} is not a valid date";

    pub fn new(parser: Arc<dyn DateParser>) -> Self {
        Self { parser }
    }
}

impl Default for DateTest {
    fn default() -> Self {
        Self::new(Arc::new(ChronoDateParser))
    }
}

impl Test for DateTest {
    fn message(&self) -> &str {
        Self::MESSAGE
    }

    fn expects(&self) -> &[&str] {
        &["format"]
    }

    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError> {
        let formats = params.list("format").ok_or_else(|| TestError::InvalidParameter {
            parameter: "format".to_string(),
            message: "expected a layout name or a list of formats".to_string(),
        })?;
        let text = value.as_text();

        if let [layout] = formats.as_slice() {
            if let Some(matched) = matches_layout(layout, &text) {
                return Ok(Outcome::from(matched));
            }
        }

        Ok(Outcome::from(self.parser.parse(&text, &formats).is_ok()))
    }
}

/// Checks that a date falls strictly before or after a reference date.
pub struct DateCompareTest {
    parser: Arc<dyn DateParser>,
    wanted: Ordering,
}

impl DateCompareTest {
    pub const BEFORE_MESSAGE: &'static str = "{title} should be before {date}.";
    pub const AFTER_MESSAGE: &'static str = "{title} should be after {date}.";

    /// A test passing for dates before the `date` parameter.
    pub fn before(parser: Arc<dyn DateParser>) -> Self {
        Self {
            parser,
            wanted: Ordering::Less,
        }
    }

    /// A test passing for dates after the `date` parameter.
    pub fn after(parser: Arc<dyn DateParser>) -> Self {
        Self {
            parser,
            wanted: Ordering::Greater,
        }
    }
}

impl Test for DateCompareTest {
    fn message(&self) -> &str {
        match self.wanted {
            Ordering::Less => Self::BEFORE_MESSAGE,
            _ => Self::AFTER_MESSAGE,
        }
    }

    fn expects(&self) -> &[&str] {
        &["date"]
    }

    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError> {
        let formats = params
            .config_field("formats")
            .and_then(crate::rules::string_list)
            .unwrap_or_else(default_formats);

        let reference = params.text("date").ok_or_else(|| TestError::InvalidParameter {
            parameter: "date".to_string(),
            message: "expected a date string".to_string(),
        })?;
        let reference = self
            .parser
            .parse(reference, &formats)
            .map_err(|e| TestError::InvalidParameter {
                parameter: "date".to_string(),
                message: e.to_string(),
            })?;

        Ok(match self.parser.parse(&value.as_text(), &formats) {
            Ok(date) => Outcome::from(date.cmp(&reference) == self.wanted),
            Err(e) => {
                tracing::trace!("date comparison value rejected: {}", e);
                Outcome::Fail
            }
        })
    }
}
