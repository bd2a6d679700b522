//! Layered configuration resolution
//!
//! This module resolves one immutable configuration per process:
//! - Environment reader: process environment, then an optional `.env` file
//! - Base configuration: every framework key, literal or environment-sourced
//! - Overlay: the `development` or `production` deltas applied to a copy of the base
//! - Effective configuration: the frozen result, plus a typed [`Settings`] view
//!
//! # Resolution Order (lowest to highest precedence)
//! 1. Declared defaults
//! 2. `.env` override file
//! 3. Process environment variables
//! 4. Overlay operations

pub mod base;
pub mod effective;
pub mod environment;
pub mod error;
pub mod keys;
pub mod overlay;
pub mod reader;
pub mod settings;
pub mod validation;
pub mod value;

#[cfg(test)]
mod tests;

// Re-export public types
pub use base::{BaseConfig, BaseOptions, build_base};
pub use effective::EffectiveConfig;
pub use environment::Environment;
pub use error::ConfigError;
pub use overlay::{Overlay, OverlayOp, apply_overlay};
pub use reader::{EnvFile, EnvReader, EnvSource, ProcessEnv};
pub use settings::Settings;
pub use validation::DeployWarning;
pub use value::{ConfigMap, ConfigValue, ValueKind};

/// Build the base configuration and apply the overlay named `overlay_name`
pub fn resolve(
    reader: &EnvReader,
    overlay_name: &str,
    options: &BaseOptions,
) -> Result<EffectiveConfig, ConfigError> {
    let base = build_base(reader, options)?;
    let effective = apply_overlay(&base, overlay_name, reader)?;

    tracing::info!(
        overlay = %effective.overlay(),
        keys = effective.values().len(),
        "Configuration resolved"
    );

    Ok(effective)
}
