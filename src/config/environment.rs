//! Overlay selection for the running process

use std::env::VarError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Deployment environment, one per known overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development overlay
    #[default]
    Development,
    /// Production overlay
    Production,
}

impl Environment {
    /// Environment variable naming the active overlay
    pub const ENV_VAR: &'static str = "LAYERCONF_OVERLAY";

    /// Every known overlay, in display order
    pub const ALL: [Environment; 2] = [Environment::Development, Environment::Production];

    /// Read the selector from `LAYERCONF_OVERLAY`
    ///
    /// Returns `Development` if the variable is not set. An unrecognized
    /// name is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_var(std::env::var(Self::ENV_VAR))
    }

    fn from_var(var: Result<String, VarError>) -> Result<Self, ConfigError> {
        match var {
            Ok(name) => name.parse(),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(ConfigError::UnknownOverlay {
                name: raw.to_string_lossy().into_owned(),
                valid: Self::valid_names(),
            }),
        }
    }

    /// Convert the environment to a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Comma separated list of valid overlay names
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Environment::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::UnknownOverlay {
                name: s.to_string(),
                valid: Self::valid_names(),
            }),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
