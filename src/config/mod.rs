// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Configuration module for approve.
//!
//! This module handles loading, parsing, and merging `approve.toml`: message
//! overrides, named rule sets and output settings.

pub mod default;
mod loader;
mod schema;

pub use default::example_config;
pub use loader::{
    find_config_file, find_config_file_from, global_config_file, load_config, load_config_from,
    merge_configs, parse_config, CONFIG_FILES,
};
pub use schema::*;
