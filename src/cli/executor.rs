//! Command executor for dispatching CLI commands
//!
//! Commands run against an already resolved [`EffectiveConfig`] and write
//! their report to the given output, so they can be exercised without a
//! global subscriber or a real process environment.

use std::collections::BTreeMap;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;

use super::parser::{Commands, OutputFormat};
use crate::config::{ConfigError, EffectiveConfig, Environment, Settings};

/// Execute `command` against `effective`, writing its report to `out`
///
/// # Returns
/// `ExitCode::SUCCESS`, or `ExitCode::FAILURE` when `check --deploy` found
/// warnings
///
/// # Errors
/// Returns resolution, validation, serialization and I/O failures
pub fn execute_command(
    command: &Commands,
    effective: &EffectiveConfig,
    out: &mut impl Write,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Show {
            format,
            key,
            reveal,
        } => {
            show(effective, *format, key.as_deref(), *reveal, out)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { deploy } => check(effective, *deploy, out),
        Commands::Overlays => {
            for environment in Environment::ALL {
                writeln!(out, "{}", environment)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn show(
    effective: &EffectiveConfig,
    format: OutputFormat,
    key: Option<&str>,
    reveal: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let redacted;
    let values = if reveal {
        effective.values()
    } else {
        redacted = effective.redacted();
        &redacted
    };

    let rendered = match (key, format) {
        (None, OutputFormat::Json) => serde_json::to_string_pretty(values)?,
        (None, OutputFormat::Toml) => toml::to_string_pretty(values)?,
        (Some(key), OutputFormat::Json) => serde_json::to_string_pretty(values.require(key)?)?,
        (Some(key), OutputFormat::Toml) => {
            // A TOML document must be a table, so keep the key around the value
            let value = values.require(key)?;
            toml::to_string_pretty(&BTreeMap::from([(key, value)]))?
        }
    };

    writeln!(out, "{}", rendered.trim_end()).context("Failed to write configuration")?;
    Ok(())
}

fn check(effective: &EffectiveConfig, deploy: bool, out: &mut impl Write) -> anyhow::Result<ExitCode> {
    let settings = Settings::from_effective(effective)
        .with_context(|| format!("Settings for overlay '{}' are invalid", effective.overlay()))?;

    writeln!(
        out,
        "Configuration for overlay '{}' is valid ({} keys).",
        settings.overlay,
        effective.values().len()
    )?;

    if !deploy {
        return Ok(ExitCode::SUCCESS);
    }

    let warnings = settings.deployment_warnings();
    if warnings.is_empty() {
        writeln!(out, "Deployment check identified no issues.")?;
        return Ok(ExitCode::SUCCESS);
    }

    writeln!(out, "Deployment check identified {} issue(s):", warnings.len())?;
    for warning in &warnings {
        tracing::warn!(id = warning.id, "{}", warning.message);
        writeln!(out, "  {}", warning)?;
    }

    Ok(ExitCode::FAILURE)
}

/// Message for errors the binary reports before exiting
pub fn describe_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ConfigError>() {
        Some(ConfigError::UnknownOverlay { .. }) => {
            format!("{error:#}\nSet --overlay or {}.", Environment::ENV_VAR)
        }
        _ => format!("{error:#}"),
    }
}
