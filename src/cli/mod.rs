//! CLI module for layerconf
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration resolution from CLI arguments
//! - Command execution

pub mod executor;
pub mod parser;

// Re-export public types for convenience
pub use executor::{describe_error, execute_command};
pub use parser::{Cli, Commands, OutputFormat};

use std::process::ExitCode;

use crate::config::settings::LoggingSettings;
use crate::config::{BaseOptions, EffectiveConfig, EnvReader, resolve};
use crate::logger::{bootstrap_dispatch, init_logger};

/// Resolve the effective configuration selected by the CLI arguments
///
/// Events emitted during resolution go to a console-only dispatcher at the
/// level chosen by `-v`/`-q`.
///
/// # Errors
/// Returns error if the override file is unreadable, a value fails to
/// coerce, or the overlay name is unknown
pub fn load_config(cli: &Cli) -> anyhow::Result<EffectiveConfig> {
    let options = BaseOptions {
        base_dir: cli.base_dir.clone(),
        require_secret_key: cli.require_secret_key,
    };

    let dispatch = bootstrap_dispatch(cli.bootstrap_level())?;
    tracing::dispatcher::with_default(&dispatch, || -> anyhow::Result<EffectiveConfig> {
        let reader = EnvReader::from_process(&cli.env_file)?;
        Ok(resolve(&reader, &cli.overlay, &options)?)
    })
}

/// Install the global subscriber from the effective `LOGGING` section
///
/// `-v` and `-q` replace the configured level.
pub fn init_logger_from_config(cli: &Cli, effective: &EffectiveConfig) -> anyhow::Result<()> {
    let mut config = LoggingSettings::from_effective(effective)?.to_logger_config()?;
    if let Some(level) = cli.level_override() {
        config = config.with_level(level);
    }
    init_logger(config)
}

/// Resolve, set up logging and run the selected command against stdout
pub fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let effective = load_config(cli)?;
    init_logger_from_config(cli, &effective)?;

    tracing::debug!(
        version = crate::pkg_version(),
        overlay = %effective.overlay(),
        env_file = %cli.env_file.display(),
        "Running command"
    );

    execute_command(&cli.command_or_default(), &effective, &mut std::io::stdout().lock())
}
