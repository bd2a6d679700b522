//! Effective configuration: the frozen result of one overlay applied to the base

use serde::Serialize;

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::keys;
use crate::config::overlay::OverlayOp;
use crate::config::value::{ConfigMap, ConfigValue, REDACTED};

/// Read-only configuration consumed by the rest of the process
///
/// Constructed once at startup and passed by reference. Any mutation attempt
/// fails with `ConfigError::Immutable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    overlay: Environment,
    values: ConfigMap,
}

impl EffectiveConfig {
    pub(crate) fn new(overlay: Environment, values: ConfigMap) -> Self {
        Self {
            overlay,
            values: values.freeze(),
        }
    }

    /// The overlay this configuration was resolved with
    pub fn overlay(&self) -> Environment {
        self.overlay
    }

    pub fn values(&self) -> &ConfigMap {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Copy of the values with secrets masked, for display
    ///
    /// Keys listed in [`keys::SECRETS`] are replaced by a placeholder, and
    /// so is the password of every URL value, nested maps included.
    pub fn redacted(&self) -> ConfigMap {
        self.values
            .iter()
            .map(|(key, value)| {
                let value = if keys::SECRETS.contains(&key) {
                    ConfigValue::from(REDACTED)
                } else {
                    redact_value(value)
                };
                (key.to_string(), value)
            })
            .collect::<ConfigMap>()
            .freeze()
    }

    /// Always fails: the configuration is frozen once resolved
    pub fn apply_op(&mut self, op: &OverlayOp) -> Result<(), ConfigError> {
        op.apply_to(&mut self.values)
    }
}

fn redact_value(value: &ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Url(url) if url.password().is_some() => {
            let mut masked = url.clone();
            // Only fails for URLs that cannot carry credentials at all
            if masked.set_password(Some(REDACTED)).is_err() {
                return ConfigValue::from(REDACTED);
            }
            ConfigValue::Url(masked)
        }
        ConfigValue::Map(map) => ConfigValue::Map(
            map.iter()
                .map(|(key, value)| (key.clone(), redact_value(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}
