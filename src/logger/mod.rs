//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output with color control
//! - File output with multiple formats (Full, Compact, JSON)
//! - Per-target level overrides taken from the resolved `LOGGING` section

pub mod config;
pub mod error;
pub(crate) mod writer;


// Re-export main types
pub use config::*;
pub use error::LoggerError;

use anyhow::Context;
use std::io::IsTerminal;
use tracing::Dispatch;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global subscriber with the given configuration
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = build_filter(&config)?;
    let directives = filter.to_string();

    tracing_subscriber::registry()
        .with(build_layers(&config)?)
        .with(filter)
        .try_init()?;

    tracing::debug!(filter = %directives, "Logger initialized");
    Ok(())
}

/// Root level plus one directive per target
///
/// # Errors
/// Returns error if a level is unknown or a target cannot be parsed
pub(crate) fn build_filter(config: &LoggerConfig) -> anyhow::Result<EnvFilter> {
    let directives = config.filter_directives()?;
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter '{}'", directives))
}

/// Console-only dispatcher for events emitted while configuration resolves
///
/// The resolved `LOGGING` section is not known yet at that point, so callers
/// scope this with `tracing::dispatcher::with_default` and install the real
/// subscriber afterwards with [`init_logger`].
pub fn bootstrap_dispatch(level: &str) -> anyhow::Result<Dispatch> {
    let level = normalize_level(level)?;
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(EnvFilter::new(level))
        .finish();
    Ok(Dispatch::new(subscriber))
}

fn build_layers(config: &LoggerConfig) -> anyhow::Result<Vec<BoxedLayer>> {
    let mut layers = Vec::new();

    // File layer goes first so span fields are not formatted with ANSI codes.
    // See: https://github.com/tokio-rs/tracing/issues/1817
    if config.file.enabled {
        layers.push(file_layer(&config.file)?);
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }

    Ok(layers)
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    let use_ansi = config.colored && std::io::stderr().is_terminal();
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true);

    match config.format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn file_layer(config: &FileConfig) -> anyhow::Result<BoxedLayer> {
    let writer = writer::open_log_file(config)?;
    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);

    Ok(match config.format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    })
}
