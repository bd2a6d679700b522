//! Configuration value model
//!
//! `ConfigValue` is the tagged union stored under every key, `ValueKind` names
//! the coercion targets the environment reader supports, and `ConfigMap` is
//! the key/value mapping that base, overlay and effective configurations share.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use url::Url;

use crate::config::error::ConfigError;

/// Raw strings accepted as `true` when coercing to a boolean
const TRUE_STRINGS: &[&str] = &["true", "on", "ok", "y", "yes", "1"];

/// Raw strings accepted as `false` when coercing to a boolean
const FALSE_STRINGS: &[&str] = &["false", "off", "n", "no", "0", ""];

/// Placeholder shown instead of secret values
pub const REDACTED: &str = "********";

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Str(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Map(BTreeMap<String, ConfigValue>),
    Path(PathBuf),
    Url(Url),
}

impl ConfigValue {
    /// Build a list value from anything yielding string-like items
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from `(key, value)` pairs
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ConfigValue)>,
        K: Into<String>,
    {
        ConfigValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Human readable name of the variant, used in type error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Str(_) => "string",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::List(_) => "list",
            ConfigValue::Map(_) => "map",
            ConfigValue::Path(_) => "path",
            ConfigValue::Url(_) => "url",
        }
    }

    /// Whether this value has the shape produced by coercing to `kind`
    pub fn is_kind(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (ConfigValue::Str(_), ValueKind::String)
                | (ConfigValue::Bool(_), ValueKind::Bool)
                | (ConfigValue::Int(_), ValueKind::Int)
                | (ConfigValue::List(_), ValueKind::List)
                | (ConfigValue::Url(_), ValueKind::Url)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ConfigValue::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            ConfigValue::Url(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => write!(f, "{}", s),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::List(items) => write!(f, "[{}]", items.join(", ")),
            ConfigValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            ConfigValue::Path(p) => write!(f, "{}", p.display()),
            ConfigValue::Url(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::List(value)
    }
}

impl From<PathBuf> for ConfigValue {
    fn from(value: PathBuf) -> Self {
        ConfigValue::Path(value)
    }
}

impl From<Url> for ConfigValue {
    fn from(value: Url) -> Self {
        ConfigValue::Url(value)
    }
}

/// Coercion target for raw environment strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Bool,
    Int,
    List,
    Url,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::List => "list",
            ValueKind::Url => "url",
        }
    }

    /// Coerce a raw string read for `key` into a value of this kind
    pub fn coerce(self, key: &str, raw: &str) -> Result<ConfigValue, ConfigError> {
        match self {
            ValueKind::String => Ok(ConfigValue::Str(raw.to_string())),
            ValueKind::Bool => {
                let normalized = raw.trim().to_lowercase();
                if TRUE_STRINGS.contains(&normalized.as_str()) {
                    Ok(ConfigValue::Bool(true))
                } else if FALSE_STRINGS.contains(&normalized.as_str()) {
                    Ok(ConfigValue::Bool(false))
                } else {
                    Err(ConfigError::type_error(
                        key,
                        format!(
                            "'{}' is not a boolean. Expected one of: {}, {}",
                            raw,
                            TRUE_STRINGS.join(", "),
                            FALSE_STRINGS[..FALSE_STRINGS.len() - 1].join(", ")
                        ),
                    ))
                }
            }
            ValueKind::Int => raw.trim().parse::<i64>().map(ConfigValue::Int).map_err(|e| {
                ConfigError::type_error(key, format!("'{}' is not an integer: {}", raw, e))
            }),
            ValueKind::List => Ok(ConfigValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            ValueKind::Url => Url::parse(raw.trim()).map(ConfigValue::Url).map_err(|e| {
                ConfigError::type_error(key, format!("'{}' is not a valid URL: {}", raw, e))
            }),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key/value mapping with a one-way freeze switch
///
/// All mutating operations fail with `ConfigError::Immutable` once
/// [`ConfigMap::freeze`] has been called. Equality ignores the frozen flag.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    entries: BTreeMap<String, ConfigValue>,
    frozen: bool,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze the map. There is no way back.
    pub fn freeze(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Unfrozen copy of the same entries
    pub fn to_draft(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            frozen: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_mutable(&self, key: &str) -> Result<(), ConfigError> {
        if self.frozen {
            return Err(ConfigError::immutable(key));
        }
        Ok(())
    }

    /// Insert or replace a value, returning the previous one
    pub fn set<K: Into<String>>(
        &mut self,
        key: K,
        value: ConfigValue,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        let key = key.into();
        self.ensure_mutable(&key)?;
        Ok(self.entries.insert(key, value))
    }

    /// Insert `item` at index 0 of the list stored under `key`
    pub fn prepend(&mut self, key: &str, item: impl Into<String>) -> Result<(), ConfigError> {
        self.list_mut(key)?.insert(0, item.into());
        Ok(())
    }

    /// Push `item` to the end of the list stored under `key`
    pub fn append(&mut self, key: &str, item: impl Into<String>) -> Result<(), ConfigError> {
        self.list_mut(key)?.push(item.into());
        Ok(())
    }

    /// Remove `key`, returning its value if it was present
    pub fn clear(&mut self, key: &str) -> Result<Option<ConfigValue>, ConfigError> {
        self.ensure_mutable(key)?;
        Ok(self.entries.remove(key))
    }

    fn list_mut(&mut self, key: &str) -> Result<&mut Vec<String>, ConfigError> {
        self.ensure_mutable(key)?;
        match self.entries.get_mut(key) {
            Some(ConfigValue::List(items)) => Ok(items),
            Some(other) => Err(ConfigError::type_error(
                key,
                format!("expected a list, found {}", other.type_name()),
            )),
            None => Err(ConfigError::type_error(
                key,
                "expected a list, but the key is not set",
            )),
        }
    }

    /// Look up `key`, failing with `Missing` when absent
    pub fn require(&self, key: &str) -> Result<&ConfigValue, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::missing(key))
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ConfigError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| mismatch(key, "string", value))
    }

    pub fn require_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.require(key)?;
        value.as_bool().ok_or_else(|| mismatch(key, "bool", value))
    }

    pub fn require_int(&self, key: &str) -> Result<i64, ConfigError> {
        let value = self.require(key)?;
        value.as_int().ok_or_else(|| mismatch(key, "int", value))
    }

    pub fn require_list(&self, key: &str) -> Result<&[String], ConfigError> {
        let value = self.require(key)?;
        value.as_list().ok_or_else(|| mismatch(key, "list", value))
    }

    pub fn require_map(&self, key: &str) -> Result<&BTreeMap<String, ConfigValue>, ConfigError> {
        let value = self.require(key)?;
        value.as_map().ok_or_else(|| mismatch(key, "map", value))
    }

    pub fn require_path(&self, key: &str) -> Result<&Path, ConfigError> {
        let value = self.require(key)?;
        value.as_path().ok_or_else(|| mismatch(key, "path", value))
    }
}

/// Type error for a value that exists but has the wrong shape
pub(crate) fn mismatch(key: &str, expected: &str, found: &ConfigValue) -> ConfigError {
    ConfigError::type_error(
        key,
        format!("expected {}, found {}", expected, found.type_name()),
    )
}

impl PartialEq for ConfigMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ConfigMap {}

impl Serialize for ConfigMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigMap {
    fn from_iter<T: IntoIterator<Item = (String, ConfigValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            frozen: false,
        }
    }
}
