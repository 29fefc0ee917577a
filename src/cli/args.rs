// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// approve - declarative value validation
///
/// Checks a value against a named or inline rule set and reports which rules
/// it failed.
#[derive(Parser, Debug)]
#[command(name = "approve")]
#[command(author = "Eshan Roy")]
#[command(version)]
#[command(about = "Validate values against declarative rule sets", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for machine-readable output
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "APPROVE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Output format for CI and scripting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON output for machine parsing
    Json,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate a value against a rule set
    Check(CheckArgs),

    /// List the available tests
    Tests,

    /// Print version information
    Version,

    /// Initialize approve configuration
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("ruleset").required(true).args(["rules", "inline"])))]
pub struct CheckArgs {
    /// The value to validate
    pub value: String,

    /// Name of a rule set defined in the configuration
    #[arg(short, long)]
    pub rules: Option<String>,

    /// Rule set given as a JSON object
    #[arg(short, long, value_name = "JSON")]
    pub inline: Option<String>,

    /// Treat the value as a number
    #[arg(short, long)]
    pub number: bool,
}

/// Arguments for the init command.
#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_inline() {
        let cli = Cli::try_parse_from([
            "approve",
            "--format",
            "json",
            "check",
            "42",
            "--inline",
            r#"{"numeric": true}"#,
            "--number",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.value, "42");
                assert!(args.number);
                assert!(args.rules.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_a_rule_set() {
        assert!(Cli::try_parse_from(["approve", "check", "x"]).is_err());
        assert!(Cli::try_parse_from(["approve", "check", "x", "-r", "a", "-i", "{}"]).is_err());
    }
}
