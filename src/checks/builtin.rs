// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Built-in tests.

use crate::error::TestError;
use crate::message::display_json;
use crate::rules::{Params, Value};
use lazy_static::lazy_static;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use super::card::CardTest;
use super::date::{ChronoDateParser, DateCompareTest, DateParser, DateTest};
use super::outcome::Outcome;
use super::strength::StrengthTest;
use super::Test;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}-]+)*@(?:[a-z0-9\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}](?:[a-z0-9\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}._~-]*[a-z0-9\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])?\.)+[a-z\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}](?:[a-z0-9\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}._~-]*[a-z\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])?$"
    ).unwrap();

    /// Splits a web address into host, port and path.
    static ref URL_REGEX: Regex = Regex::new(
        r"(?i)^(?:(?:https?|ftp)://)?(?P<host>[^\s/:?#]+)(?::(?P<port>[0-9]{2,5}))?(?:/\S*)?$"
    ).unwrap();

    static ref HOSTNAME_REGEX: Regex = Regex::new(
        r"(?i)^(?:[a-z0-9\x{00A1}-\x{D7FF}\x{E000}-\x{FFFF}]-*)*[a-z0-9\x{00A1}-\x{D7FF}\x{E000}-\x{FFFF}]+(?:\.(?:[a-z0-9\x{00A1}-\x{D7FF}\x{E000}-\x{FFFF}]-*)*[a-z0-9\x{00A1}-\x{D7FF}\x{E000}-\x{FFFF}]+)*\.[a-z\x{00A1}-\x{D7FF}\x{E000}-\x{FFFF}]{2,}$"
    ).unwrap();

    static ref ALPHA_NUMERIC_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
    static ref NUMERIC_REGEX: Regex = Regex::new(r"^-?[0-9]+$").unwrap();
    static ref ALPHA_REGEX: Regex = Regex::new(r"^[A-Za-z]+$").unwrap();
    static ref DECIMAL_REGEX: Regex = Regex::new(
        r"^\s*[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)\s*$"
    ).unwrap();
    static ref CURRENCY_REGEX: Regex = Regex::new(
        r"^\s*[+-]?(?:[0-9]+(?:\.[0-9][0-9])?|\.[0-9][0-9])\s*$"
    ).unwrap();
    static ref TIME_REGEX: Regex = Regex::new(
        r"^(?:2[0-3]|[01]?[0-9]):[0-5]?[0-9]:[0-5]?[0-9]$"
    ).unwrap();
    static ref TRUTHY_REGEX: Regex = Regex::new(
        r"(?i)^(?:1|t(?:rue)?|y(?:es)?|ok(?:ay)?)$"
    ).unwrap();
}

type Check = fn(&Value, &Params) -> Result<bool, TestError>;

/// A test that answers with a plain pass or fail.
pub struct Predicate {
    message: &'static str,
    expects: &'static [&'static str],
    check: Check,
}

impl Predicate {
    pub fn new(message: &'static str, expects: &'static [&'static str], check: Check) -> Self {
        Self {
            message,
            expects,
            check,
        }
    }
}

impl Test for Predicate {
    fn message(&self) -> &str {
        self.message
    }

    fn expects(&self) -> &[&str] {
        self.expects
    }

    fn validate(&self, value: &Value, params: &Params) -> Result<Outcome, TestError> {
        (self.check)(value, params).map(Outcome::from)
    }
}

/// Every built-in test, keyed by rule name.
pub fn builtin_tests() -> Vec<(&'static str, Arc<dyn Test>)> {
    let parser: Arc<dyn DateParser> = Arc::new(ChronoDateParser);

    let predicates: [(&'static str, Predicate); 17] = [
        ("required", Predicate::new("{title} is required", &[], check_required)),
        ("email", Predicate::new("{title} must be a valid email address", &[], check_email)),
        ("url", Predicate::new("{title} must be a valid web address", &[], check_url)),
        (
            "alphaNumeric",
            Predicate::new("{title} may only contain [A-Za-z] and [0-9]", &[], check_alpha_numeric),
        ),
        ("numeric", Predicate::new("{title} may only contain [0-9]", &[], check_numeric)),
        ("alpha", Predicate::new("{title} may only contain [A-Za-z]", &[], check_alpha)),
        ("decimal", Predicate::new("{title} must be a valid decimal", &[], check_decimal)),
        (
            "currency",
            Predicate::new("{title} must be a valid currency value", &[], check_currency),
        ),
        ("ip", Predicate::new("{title} must be a valid IP address", &[], check_ip)),
        (
            "min",
            Predicate::new("{title} must be a minimum of {min} characters", &["min"], check_min),
        ),
        (
            "max",
            Predicate::new("{title} must be a maximum of {max} characters", &["max"], check_max),
        ),
        (
            "range",
            Predicate::new(
                "{title} must be a minimum of {min} and a maximum of {max} characters",
                &["min", "max"],
                check_range,
            ),
        ),
        (
            "equal",
            Predicate::new("{title} must be equal to {field}", &["value", "field"], check_equal),
        ),
        (
            "format",
            Predicate::new("{title} did not pass the [{regex}] test", &["regex"], check_format),
        ),
        ("time", Predicate::new("{title} is not a valid time", &[], check_time)),
        ("truthy", Predicate::new("{title} is not valid", &[], check_truthy)),
        ("falsy", Predicate::new("{title} is not valid", &[], check_falsy)),
    ];

    let mut tests: Vec<(&'static str, Arc<dyn Test>)> = predicates
        .into_iter()
        .map(|(name, test)| (name, Arc::new(test) as Arc<dyn Test>))
        .collect();

    tests.push(("cc", Arc::new(CardTest::new())));
    tests.push(("strength", Arc::new(StrengthTest::new())));
    tests.push(("date", Arc::new(DateTest::new(Arc::clone(&parser)))));
    tests.push(("dateBefore", Arc::new(DateCompareTest::before(Arc::clone(&parser)))));
    tests.push(("dateAfter", Arc::new(DateCompareTest::after(parser))));

    tests
}

/// A numeric parameter, or a fault naming it.
fn number_param(params: &Params, name: &str) -> Result<f64, TestError> {
    params.number(name).ok_or_else(|| TestError::InvalidParameter {
        parameter: name.to_string(),
        message: "expected a number".to_string(),
    })
}

fn check_required(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(!value.is_falsy())
}

fn check_email(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(EMAIL_REGEX.is_match(&value.as_text()))
}

/// Private, loopback and link-local IPv4 hosts are not web addresses.
fn is_public_ipv4(addr: Ipv4Addr) -> bool {
    let [first, _, _, last] = addr.octets();
    (1..=223).contains(&first)
        && !addr.is_private()
        && !addr.is_loopback()
        && !addr.is_link_local()
        && last != 0
        && last != 255
}

fn check_url(value: &Value, _: &Params) -> Result<bool, TestError> {
    let text = value.as_text();
    let Some(caps) = URL_REGEX.captures(&text) else {
        return Ok(false);
    };
    let host = &caps["host"];
    Ok(match host.parse::<Ipv4Addr>() {
        Ok(addr) => is_public_ipv4(addr),
        Err(_) => HOSTNAME_REGEX.is_match(host),
    })
}

fn check_alpha_numeric(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(ALPHA_NUMERIC_REGEX.is_match(&value.as_text()))
}

fn check_numeric(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(NUMERIC_REGEX.is_match(&value.as_text()))
}

fn check_alpha(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(ALPHA_REGEX.is_match(&value.as_text()))
}

fn check_decimal(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(DECIMAL_REGEX.is_match(&value.as_text()))
}

fn check_currency(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(CURRENCY_REGEX.is_match(&value.as_text()))
}

fn check_ip(value: &Value, _: &Params) -> Result<bool, TestError> {
    let text = value.as_text();
    let (addr, prefix) = match text.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (text.as_ref(), None),
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return Ok(false);
    };
    let max_prefix = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    Ok(match prefix {
        None => true,
        Some(p) => p.parse::<u8>().map_or(false, |p| p <= max_prefix),
    })
}

fn check_min(value: &Value, params: &Params) -> Result<bool, TestError> {
    let min = number_param(params, "min")?;
    Ok(value
        .as_str()
        .map_or(false, |s| s.chars().count() as f64 >= min))
}

fn check_max(value: &Value, params: &Params) -> Result<bool, TestError> {
    let max = number_param(params, "max")?;
    Ok(value
        .as_str()
        .map_or(false, |s| s.chars().count() as f64 <= max))
}

fn check_range(value: &Value, params: &Params) -> Result<bool, TestError> {
    let min = number_param(params, "min")?;
    let max = number_param(params, "max")?;
    Ok(match value {
        Value::Text(s) => {
            let len = s.chars().count() as f64;
            len >= min && len <= max
        }
        Value::Number(n) => *n >= min && *n <= max,
        _ => false,
    })
}

fn check_equal(value: &Value, params: &Params) -> Result<bool, TestError> {
    let other = params.get("value").map(display_json).unwrap_or_default();
    Ok(value.as_text() == other)
}

fn check_format(value: &Value, params: &Params) -> Result<bool, TestError> {
    let pattern = params.text("regex").ok_or_else(|| TestError::InvalidParameter {
        parameter: "regex".to_string(),
        message: "expected a regular expression string".to_string(),
    })?;
    let regex = Regex::new(pattern).map_err(|e| TestError::InvalidParameter {
        parameter: "regex".to_string(),
        message: e.to_string(),
    })?;
    Ok(regex.is_match(&value.as_text()))
}

fn check_time(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(TIME_REGEX.is_match(&value.as_text()))
}

fn check_truthy(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(TRUTHY_REGEX.is_match(&value.as_text()))
}

fn check_falsy(value: &Value, _: &Params) -> Result<bool, TestError> {
    Ok(!TRUTHY_REGEX.is_match(&value.as_text()))
}
