// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Error message templating.
//!
//! Messages are plain templates with `{name}` placeholders. This module
//! renders them and provides the catalog used to swap the English defaults
//! for externally supplied strings.

mod catalog;
mod format;

pub use catalog::{MessageCatalog, MessageEntry, Messages};
pub use format::{display_json, format, Fields};
