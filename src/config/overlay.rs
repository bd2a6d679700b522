//! Overlay resolution
//!
//! An overlay is an ordered list of operations applied to an unfrozen copy of
//! the base configuration. Operations run in declared order and the result is
//! frozen into an [`EffectiveConfig`].

use serde::Serialize;

use crate::config::base::BaseConfig;
use crate::config::effective::EffectiveConfig;
use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::keys::{self, env};
use crate::config::reader::EnvReader;
use crate::config::value::{ConfigMap, ConfigValue};

pub const DEBUG_TOOLBAR_APP: &str = "debug_toolbar";
pub const DEBUG_TOOLBAR_MIDDLEWARE: &str = "debug_toolbar.middleware.DebugToolbarMiddleware";

/// One year, in seconds
pub const HSTS_SECONDS: i64 = 31_536_000;

/// A single overlay delta
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OverlayOp {
    /// Insert or replace `key`
    Set { key: String, value: ConfigValue },
    /// Insert `item` at index 0 of the list under `key`
    PrependToList { key: String, item: String },
    /// Push `item` to the end of the list under `key`
    AppendToList { key: String, item: String },
    /// Remove `key`; a no-op when it is absent
    Clear { key: String },
}

impl OverlayOp {
    pub fn key(&self) -> &str {
        match self {
            OverlayOp::Set { key, .. }
            | OverlayOp::PrependToList { key, .. }
            | OverlayOp::AppendToList { key, .. }
            | OverlayOp::Clear { key } => key,
        }
    }

    pub(crate) fn apply_to(&self, values: &mut ConfigMap) -> Result<(), ConfigError> {
        match self {
            OverlayOp::Set { key, value } => values.set(key.as_str(), value.clone()).map(|_| ()),
            OverlayOp::PrependToList { key, item } => values.prepend(key, item.as_str()),
            OverlayOp::AppendToList { key, item } => values.append(key, item.as_str()),
            OverlayOp::Clear { key } => values.clear(key).map(|_| ()),
        }
    }
}

/// A named, ordered sequence of overlay operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlay {
    environment: Environment,
    ops: Vec<OverlayOp>,
}

impl Overlay {
    /// Empty overlay for `environment`
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ops: Vec::new(),
        }
    }

    pub fn set(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.ops.push(OverlayOp::Set {
            key: key.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn prepend(mut self, key: &str, item: &str) -> Self {
        self.ops.push(OverlayOp::PrependToList {
            key: key.to_string(),
            item: item.to_string(),
        });
        self
    }

    pub fn append(mut self, key: &str, item: &str) -> Self {
        self.ops.push(OverlayOp::AppendToList {
            key: key.to_string(),
            item: item.to_string(),
        });
        self
    }

    pub fn clear(mut self, key: &str) -> Self {
        self.ops.push(OverlayOp::Clear {
            key: key.to_string(),
        });
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn ops(&self) -> &[OverlayOp] {
        &self.ops
    }

    /// The built-in overlay for `environment`
    pub fn for_environment(
        environment: Environment,
        reader: &EnvReader,
    ) -> Result<Self, ConfigError> {
        match environment {
            Environment::Development => Ok(Self::development()),
            Environment::Production => Self::production(reader),
        }
    }

    /// Local development: debug on, debug toolbar, relaxed hosts and CORS
    pub fn development() -> Self {
        Self::new(Environment::Development)
            .set(keys::DEBUG, true)
            .set(keys::ALLOWED_HOSTS, ConfigValue::list(["*"]))
            .append(keys::INSTALLED_APPS, DEBUG_TOOLBAR_APP)
            .prepend(keys::MIDDLEWARE, DEBUG_TOOLBAR_MIDDLEWARE)
            .set(keys::INTERNAL_IPS, ConfigValue::list(["127.0.0.1"]))
            .set(
                keys::EMAIL_BACKEND,
                "django.core.mail.backends.console.EmailBackend",
            )
            .set(keys::AUTH_PASSWORD_VALIDATORS, Vec::<String>::new())
            .set(keys::CORS_ALLOW_ALL_ORIGINS, true)
            .set(
                keys::STATICFILES_STORAGE,
                "django.contrib.staticfiles.storage.StaticFilesStorage",
            )
    }

    /// Hardened deployment: security headers, SMTP email, console logging
    pub fn production(reader: &EnvReader) -> Result<Self, ConfigError> {
        let log_level = reader.string(env::LOG_LEVEL, "INFO")?;

        Ok(Self::new(Environment::Production)
            .set(keys::DEBUG, false)
            .set(keys::SECURE_BROWSER_XSS_FILTER, true)
            .set(keys::SECURE_CONTENT_TYPE_NOSNIFF, true)
            .set(keys::SECURE_HSTS_INCLUDE_SUBDOMAINS, true)
            .set(keys::SECURE_HSTS_PRELOAD, true)
            .set(keys::SECURE_HSTS_SECONDS, HSTS_SECONDS)
            .set(keys::SECURE_SSL_REDIRECT, true)
            .set(keys::SESSION_COOKIE_SECURE, true)
            .set(keys::CSRF_COOKIE_SECURE, true)
            .set(keys::X_FRAME_OPTIONS, "DENY")
            .set(
                keys::STATICFILES_STORAGE,
                "whitenoise.storage.CompressedManifestStaticFilesStorage",
            )
            .set(
                keys::EMAIL_BACKEND,
                "django.core.mail.backends.smtp.EmailBackend",
            )
            .set(keys::EMAIL_HOST, reader.string(keys::EMAIL_HOST, "smtp.gmail.com")?)
            .set(keys::EMAIL_PORT, reader.int(keys::EMAIL_PORT, 587)?)
            .set(keys::EMAIL_HOST_USER, reader.string(keys::EMAIL_HOST_USER, "")?)
            .set(
                keys::EMAIL_HOST_PASSWORD,
                reader.string(keys::EMAIL_HOST_PASSWORD, "")?,
            )
            .set(keys::EMAIL_USE_TLS, true)
            .set(
                keys::DEFAULT_FROM_EMAIL,
                reader.string(keys::DEFAULT_FROM_EMAIL, "webmaster@localhost")?,
            )
            .set(keys::LOGGING, production_logging(log_level)))
    }

    /// Apply every operation, in order, to a copy of `base`
    ///
    /// Fails on the first operation that errors; no partial result escapes.
    pub fn apply(&self, base: &BaseConfig) -> Result<EffectiveConfig, ConfigError> {
        let mut draft = base.values().to_draft();
        for op in &self.ops {
            op.apply_to(&mut draft)?;
        }

        tracing::debug!(
            overlay = %self.environment,
            operations = self.ops.len(),
            "Applied overlay"
        );

        Ok(EffectiveConfig::new(self.environment, draft))
    }
}

/// Format string of the `verbose` formatter, in `str.format` style
pub const VERBOSE_LOG_FORMAT: &str =
    "{levelname} {asctime} {module} {process:d} {thread:d} {message}";

/// dictConfig-shaped logging section: console handler on the root logger,
/// plus a `django` logger whose level comes from the environment
fn production_logging(django_level: String) -> ConfigValue {
    ConfigValue::map([
        ("version", ConfigValue::Int(1)),
        ("disable_existing_loggers", ConfigValue::Bool(false)),
        (
            "formatters",
            ConfigValue::map([(
                "verbose",
                ConfigValue::map([
                    ("format", ConfigValue::from(VERBOSE_LOG_FORMAT)),
                    ("style", ConfigValue::from("{")),
                ]),
            )]),
        ),
        (
            "handlers",
            ConfigValue::map([(
                "console",
                ConfigValue::map([
                    ("class", ConfigValue::from("logging.StreamHandler")),
                    ("formatter", ConfigValue::from("verbose")),
                ]),
            )]),
        ),
        (
            "root",
            ConfigValue::map([
                ("handlers", ConfigValue::list(["console"])),
                ("level", ConfigValue::from("INFO")),
            ]),
        ),
        (
            "loggers",
            ConfigValue::map([(
                "django",
                ConfigValue::map([
                    ("handlers", ConfigValue::list(["console"])),
                    ("level", ConfigValue::from(django_level)),
                    ("propagate", ConfigValue::Bool(false)),
                ]),
            )]),
        ),
    ])
}

/// Resolve the effective configuration for the overlay named `overlay_name`
///
/// Unknown names fail with `ConfigError::UnknownOverlay` before any
/// operation runs.
pub fn apply_overlay(
    base: &BaseConfig,
    overlay_name: &str,
    reader: &EnvReader,
) -> Result<EffectiveConfig, ConfigError> {
    let environment: Environment = overlay_name.parse()?;
    let overlay = Overlay::for_environment(environment, reader)?;
    overlay.apply(base)
}
