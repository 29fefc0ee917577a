// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Command dispatch and execution.

use crate::config::{example_config, ApproveConfig};
use crate::error::{ApproveError, ConfigError, Result, ResultExt};
use crate::rules::{Approver, RuleSet, Value};
use console::style;

use super::args::{CheckArgs, Cli, Commands, InitArgs, OutputFormat};

/// Run the CLI with the given arguments.
pub fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        ApproveConfig::load_from(config_path)?
    } else {
        ApproveConfig::load()?
    };

    if !config.output.color {
        console::set_colors_enabled(false);
    }
    let format = cli.format.unwrap_or(config.output.format);

    // Dispatch to the appropriate command handler
    match &cli.command {
        Commands::Check(args) => run_check(&config, format, args),
        Commands::Tests => run_tests(&config, format),
        Commands::Version => run_version(),
        Commands::Init(args) => run_init(args),
    }
}

/// Run the check command.
fn run_check(config: &ApproveConfig, format: OutputFormat, args: &CheckArgs) -> Result<()> {
    tracing::debug!("Running check command with args: {:?}", args);

    let rules = match (&args.rules, &args.inline) {
        (Some(name), _) => config.rule_set(name)?,
        (None, Some(json)) => RuleSet::parse_json(json)?,
        (None, None) => {
            return Err(ApproveError::Config(ConfigError::InvalidValue {
                key: "rules".to_string(),
                message: "either --rules or --inline is required".to_string(),
            }))
        }
    };

    let value = if args.number {
        let number: f64 = args.value.trim().parse().context("--number")?;
        Value::from(number)
    } else {
        Value::from(args.value.as_str())
    };

    let approver = Approver::with_catalog(&config.messages);
    let result = approver.evaluate(&value, &rules)?;
    result.print(Some(format));

    if result.approved {
        Ok(())
    } else {
        Err(ApproveError::Rejected {
            count: result.errors.len(),
        })
    }
}

/// Run the tests command.
fn run_tests(config: &ApproveConfig, format: OutputFormat) -> Result<()> {
    let approver = Approver::with_catalog(&config.messages);
    let tests: Vec<_> = approver
        .test_names()
        .into_iter()
        .filter_map(|name| approver.test(&name).map(|test| (name, test)))
        .collect();

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = tests
                .iter()
                .map(|(name, test)| {
                    serde_json::json!({
                        "name": name,
                        "message": test.message(),
                        "expects": test.expects(),
                        "optional": test.optional(),
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&entries).context("tests")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for (name, test) in &tests {
                let mut params: Vec<String> =
                    test.expects().iter().map(|p| p.to_string()).collect();
                params.extend(test.optional().iter().map(|p| format!("{}?", p)));
                println!(
                    "{:<14} {:<16} {}",
                    style(name).cyan(),
                    style(params.join(", ")).dim(),
                    test.message()
                );
            }
        }
    }

    Ok(())
}

/// Run the version command.
fn run_version() -> Result<()> {
    println!("approve {}", crate::version::version_string());
    Ok(())
}

/// Run the init command.
fn run_init(args: &InitArgs) -> Result<()> {
    tracing::debug!("Running init command with args: {:?}", args);

    let config_path = std::path::Path::new("approve.toml");

    if config_path.exists() && !args.force {
        return Err(ApproveError::WithContext {
            context: "init".to_string(),
            message: "Configuration file already exists. Use --force to overwrite.".to_string(),
        });
    }

    std::fs::write(config_path, example_config()).map_err(|e| ApproveError::WithContext {
        context: "init".to_string(),
        message: format!("Failed to write configuration: {}", e),
    })?;

    println!("{} Created approve.toml", style("✓").green());

    Ok(())
}
