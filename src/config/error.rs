//! Configuration error types

use thiserror::Error;

/// Configuration error types
///
/// Every variant is fatal at process start. None of them are retried since
/// resolution reads only local, non-transient sources.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A key marked as required has no value and no default
    #[error("Missing required configuration value: {key}")]
    Missing { key: String },

    /// Coercion failed, or a list operation targeted a non-list value
    #[error("Type error for {key}: {message}")]
    Type { key: String, message: String },

    /// The selector named an overlay that does not exist
    #[error("Unknown overlay '{name}'. Valid overlays are: {valid}")]
    UnknownOverlay { name: String, valid: String },

    /// Mutation attempted after the configuration was frozen
    #[error("Configuration is frozen, cannot modify {key}")]
    Immutable { key: String },

    /// The local override file exists but could not be read or parsed
    #[error("Failed to load override file {path}: {message}")]
    EnvFile { path: String, message: String },

    /// Validation error with field and message
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// The validation error message
        message: String,
    },
}

impl ConfigError {
    /// Create a new missing value error
    pub fn missing<S: Into<String>>(key: S) -> Self {
        ConfigError::Missing { key: key.into() }
    }

    /// Create a new type error
    pub fn type_error<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        ConfigError::Type {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new immutability error
    pub fn immutable<S: Into<String>>(key: S) -> Self {
        ConfigError::Immutable { key: key.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The configuration key this error refers to, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::Missing { key }
            | ConfigError::Type { key, .. }
            | ConfigError::Immutable { key } => Some(key),
            ConfigError::Validation { field, .. } => Some(field),
            ConfigError::UnknownOverlay { .. } | ConfigError::EnvFile { .. } => None,
        }
    }
}
