//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;
use crate::config::Environment;
use crate::config::reader::{DEFAULT_ENV_FILE, ENV_FILE_VAR};

/// Resolve layered settings for the web application
#[derive(Parser, Debug)]
#[command(name = "layerconf")]
#[command(about = "Resolve layered settings: environment, base configuration and overlay")]
#[command(long_about = "
layerconf builds the base configuration from the process environment and an
optional .env override file, applies the selected overlay, and prints or
checks the frozen result.

EXAMPLES:
    # Show the development configuration as JSON
    layerconf show

    # Show a single key of the production configuration
    layerconf --overlay production show --key SECURE_HSTS_SECONDS

    # Render the production configuration as TOML, secrets included
    layerconf --overlay production show --format toml --reveal

    # Run the deployment checklist, failing on any warning
    layerconf --overlay production --require-secret-key check --deploy

    # Use a different override file
    layerconf --env-file /etc/app/env show
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Overlay to apply on top of the base configuration
    ///
    /// Available values: development (dev), production (prod).
    /// Any other name is rejected before anything is resolved.
    #[arg(long, value_name = "NAME", env = Environment::ENV_VAR, default_value = "development")]
    pub overlay: String,

    /// Override file read after the process environment
    ///
    /// A missing file is treated as empty.
    #[arg(long, value_name = "FILE", env = ENV_FILE_VAR, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Project root used for template, static and media paths
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Fail when DJANGO_SECRET_KEY is unset instead of using the placeholder
    #[arg(long)]
    pub require_secret_key: bool,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the effective configuration (default)
    ///
    /// Examples:
    ///   layerconf show                      # Whole configuration as JSON
    ///   layerconf show --key ALLOWED_HOSTS  # A single key
    ///   layerconf show --format toml        # Whole configuration as TOML
    ///   layerconf show --reveal             # Secrets unmasked
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Print only this key
        #[arg(long, value_name = "KEY")]
        key: Option<String>,

        /// Print secrets and URL passwords instead of masking them
        #[arg(long)]
        reveal: bool,
    },
    /// Resolve the typed settings and validate them
    ///
    /// Returns exit code 0 if valid, non-zero if invalid. With --deploy the
    /// deployment checklist also runs and any warning is a failure.
    Check {
        /// Also run the deployment checklist
        #[arg(long)]
        deploy: bool,
    },
    /// List the known overlay names
    Overlays,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Show {
            format: OutputFormat::Json,
            key: None,
            reveal: false,
        }
    }
}

/// Output format for `show`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    #[value(name = "json")]
    Json,
    #[value(name = "toml")]
    Toml,
}

impl Cli {
    /// The command to run, `show` when none was given
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }

    /// Level for events emitted before the `LOGGING` section is applied
    pub fn bootstrap_level(&self) -> &'static str {
        match (self.verbose, self.quiet) {
            (true, _) => "debug",
            (_, true) => "error",
            _ => "warn",
        }
    }

    /// Level that replaces the configured one, if -v or -q was given
    pub fn level_override(&self) -> Option<&'static str> {
        match (self.verbose, self.quiet) {
            (true, _) => Some("debug"),
            (_, true) => Some("error"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("layerconf").chain(args.iter().copied()))
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = parse(&["--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = parse(&["--overlay", "development", "--env-file", ".env"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.command_or_default(), Commands::default());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.require_secret_key);
        assert_eq!(cli.base_dir, PathBuf::from("."));
        assert_eq!(cli.level_override(), None);
    }

    #[test]
    fn test_show_command() {
        let cli = parse(&["show", "--format", "toml", "--key", "DEBUG"]).unwrap();
        assert_eq!(
            cli.command_or_default(),
            Commands::Show {
                format: OutputFormat::Toml,
                key: Some("DEBUG".to_string()),
                reveal: false,
            }
        );

        let cli = parse(&["show", "--reveal"]).unwrap();
        assert!(matches!(
            cli.command_or_default(),
            Commands::Show { reveal: true, .. }
        ));
    }

    #[test]
    fn test_check_command() {
        let cli = parse(&["--overlay", "production", "check", "--deploy"]).unwrap();
        assert_eq!(cli.overlay, "production");
        assert_eq!(cli.command_or_default(), Commands::Check { deploy: true });
    }

    #[test]
    fn test_invalid_format_rejected() {
        let err = parse(&["show", "--format", "yaml"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_verbose_flag() {
        let cli = parse(&["--verbose"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.bootstrap_level(), "debug");
        assert_eq!(cli.level_override(), Some("debug"));
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = parse(&["--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
