// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Configuration loading and merging.

use crate::error::{ApproveError, ConfigError, Result};
use std::path::{Path, PathBuf};

use super::schema::ApproveConfig;

/// Configuration file names to search for, in order of priority.
pub const CONFIG_FILES: &[&str] = &["approve.toml", ".approve.toml", ".config/approve.toml"];

/// Find the configuration file in the current directory or parent directories.
pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    find_config_file_from(&current_dir)
}

/// Find the configuration file starting from a specific directory.
pub fn find_config_file_from(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        if let Some(path) = first_existing(&current) {
            return Some(path);
        }

        // Try parent directory
        if !current.pop() {
            break;
        }
    }

    // Also check user's home directory
    if let Some(path) = dirs::home_dir().and_then(|home| first_existing(&home)) {
        return Some(path);
    }

    global_config_file()
}

/// The user-wide configuration file, if one exists.
pub fn global_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("approve").join("config.toml"))
        .filter(|path| path.exists())
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Load configuration from the default locations.
///
/// The user-wide file is loaded first and the nearest project file is merged
/// over it.
pub fn load_config() -> Result<ApproveConfig> {
    let project = find_config_file();
    let global = global_config_file().filter(|path| Some(path) != project.as_ref());
    load_layers(global.iter().chain(project.iter()))
}

fn load_layers<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Result<ApproveConfig> {
    let mut config = None;
    for path in paths {
        let layer = load_config_from(path)?;
        config = Some(match config {
            Some(base) => merge_configs(base, layer),
            None => layer,
        });
    }

    Ok(config.unwrap_or_else(|| {
        tracing::debug!("No configuration file found, using defaults");
        ApproveConfig::default()
    }))
}

/// Load configuration from a specific path.
pub fn load_config_from(path: &Path) -> Result<ApproveConfig> {
    tracing::debug!("Loading configuration from: {:?}", path);

    if !path.exists() {
        return Err(ApproveError::Config(ConfigError::NotFound {
            path: path.to_path_buf(),
        }));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ApproveError::Config(ConfigError::ParseError {
            message: format!("Failed to read config file: {}", e),
        })
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<ApproveConfig> {
    toml::from_str(content).map_err(|e| {
        ApproveError::Config(ConfigError::ParseError {
            message: format!("Failed to parse TOML: {}", e),
        })
    })
}

/// Merge two configurations, with the overlay taking precedence.
///
/// Messages are overlaid template by template and rule sets name by name;
/// output settings come from the overlay.
pub fn merge_configs(base: ApproveConfig, overlay: ApproveConfig) -> ApproveConfig {
    ApproveConfig {
        messages: base.messages.merge(overlay.messages),
        rules: {
            let mut merged = base.rules;
            merged.extend(overlay.rules);
            merged
        },
        output: overlay.output,
    }
}
