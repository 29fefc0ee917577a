// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Externally supplied message templates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source of message templates that replace the built-in English ones.
///
/// Lookups that return `None` fall back to the test's own default.
pub trait MessageCatalog {
    /// The rule message for a test.
    fn message(&self, test: &str) -> Option<&str>;

    /// A secondary message of a test, e.g. a strength sub-check.
    fn sub_message(&self, _test: &str, _key: &str) -> Option<&str> {
        None
    }
}

/// A catalog entry: either a single template or a table of named templates.
///
/// In a table, the `message` key holds the rule message and every other key
/// names a sub-message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageEntry {
    Template(String),
    Table(HashMap<String, String>),
}

/// Message templates keyed by test name, as loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages(pub HashMap<String, MessageEntry>);

impl Messages {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rule message of a test.
    pub fn with_message(mut self, test: impl Into<String>, template: impl Into<String>) -> Self {
        let test = test.into();
        let template = template.into();
        match self.0.get_mut(&test) {
            Some(MessageEntry::Table(table)) => {
                table.insert("message".to_string(), template);
            }
            _ => {
                self.0.insert(test, MessageEntry::Template(template));
            }
        }
        self
    }

    /// Set a sub-message of a test.
    pub fn with_sub_message(
        mut self,
        test: impl Into<String>,
        key: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        let entry = self
            .0
            .entry(test.into())
            .or_insert_with(|| MessageEntry::Table(HashMap::new()));
        if let MessageEntry::Template(message) = entry {
            let mut table = HashMap::new();
            table.insert("message".to_string(), std::mem::take(message));
            *entry = MessageEntry::Table(table);
        }
        if let MessageEntry::Table(table) = entry {
            table.insert(key.into(), template.into());
        }
        self
    }

    /// Whether no template is defined.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay another catalog; its entries win key by key.
    pub fn merge(mut self, overlay: Messages) -> Self {
        for (test, entry) in overlay.0 {
            match entry {
                MessageEntry::Template(template) => {
                    self = self.with_message(test, template);
                }
                MessageEntry::Table(table) => {
                    for (key, template) in table {
                        self = if key == "message" {
                            self.with_message(test.clone(), template)
                        } else {
                            self.with_sub_message(test.clone(), key, template)
                        };
                    }
                }
            }
        }
        self
    }
}

impl MessageCatalog for Messages {
    fn message(&self, test: &str) -> Option<&str> {
        match self.0.get(test)? {
            MessageEntry::Template(template) => Some(template),
            MessageEntry::Table(table) => table.get("message").map(String::as_str),
        }
    }

    fn sub_message(&self, test: &str, key: &str) -> Option<&str> {
        match self.0.get(test)? {
            MessageEntry::Template(_) => None,
            MessageEntry::Table(table) => table.get(key).map(String::as_str),
        }
    }
}
