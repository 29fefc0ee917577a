// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Configuration schema definitions.
//!
//! Defines the structures that can be loaded from approve.toml.

use crate::cli::args::OutputFormat;
use crate::error::{ApproveError, ConfigError, Result};
use crate::message::Messages;
use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The main configuration structure for approve.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ApproveConfig {
    /// Message template overrides, keyed by test name.
    pub messages: Messages,

    /// Named rule sets.
    pub rules: HashMap<String, toml::Table>,

    /// Output configuration.
    pub output: OutputConfig,
}

impl ApproveConfig {
    /// Load configuration from the default locations.
    pub fn load() -> Result<Self> {
        super::loader::load_config()
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        super::loader::load_config_from(path)
    }

    /// The named rule set, in the order its keys were written.
    pub fn rule_set(&self, name: &str) -> Result<RuleSet> {
        let table = self.rules.get(name).ok_or_else(|| {
            ApproveError::Config(ConfigError::UnknownRuleSet {
                name: name.to_string(),
            })
        })?;
        RuleSet::from_toml(table).map_err(|e| {
            ApproveError::Config(ConfigError::InvalidValue {
                key: format!("rules.{}", name),
                message: e.to_string(),
            })
        })
    }

    /// Names of the configured rule sets, sorted.
    pub fn rule_set_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Whether to use colors.
    pub color: bool,

    /// Default output format.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Text,
        }
    }
}
