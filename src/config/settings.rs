//! Typed settings view
//!
//! Resolves the effective configuration into typed structures once at
//! startup. Dotted class paths (middleware, storage and email backends, REST
//! framework classes, password validators) become enum variants here, so an
//! unknown path fails at resolution time instead of when first used.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use url::Url;

use crate::config::effective::EffectiveConfig;
use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::keys;
use crate::config::value::{ConfigMap, ConfigValue, REDACTED, mismatch};
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, normalize_level};

/// Declares an enum whose variants map one-to-one onto dotted class paths
macro_rules! dotted_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $path:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The dotted path this variant is configured with
            pub fn as_path(&self) -> &'static str {
                match self {
                    $($name::$variant => $path,)+
                }
            }

            /// Resolve a dotted path, reporting failures against `key`
            pub fn resolve(key: &str, path: &str) -> Result<Self, ConfigError> {
                match path {
                    $($path => Ok($name::$variant),)+
                    _ => Err(ConfigError::type_error(
                        key,
                        format!("unknown {} '{}'", stringify!($name), path),
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_path())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_path())
            }
        }
    };
}

dotted_enum! {
    /// Request/response middleware, in chain order
    pub enum Middleware {
        DebugToolbar => "debug_toolbar.middleware.DebugToolbarMiddleware",
        Security => "django.middleware.security.SecurityMiddleware",
        WhiteNoise => "whitenoise.middleware.WhiteNoiseMiddleware",
        Session => "django.contrib.sessions.middleware.SessionMiddleware",
        Cors => "corsheaders.middleware.CorsMiddleware",
        Common => "django.middleware.common.CommonMiddleware",
        Csrf => "django.middleware.csrf.CsrfViewMiddleware",
        Authentication => "django.contrib.auth.middleware.AuthenticationMiddleware",
        Messages => "django.contrib.messages.middleware.MessageMiddleware",
        Clickjacking => "django.middleware.clickjacking.XFrameOptionsMiddleware",
    }
}

dotted_enum! {
    /// Backend serving collected static files
    pub enum StaticFilesStorage {
        Plain => "django.contrib.staticfiles.storage.StaticFilesStorage",
        Manifest => "django.contrib.staticfiles.storage.ManifestStaticFilesStorage",
        CompressedManifest => "whitenoise.storage.CompressedManifestStaticFilesStorage",
    }
}

dotted_enum! {
    /// Outbound email transport
    pub enum EmailBackend {
        Smtp => "django.core.mail.backends.smtp.EmailBackend",
        Console => "django.core.mail.backends.console.EmailBackend",
        Locmem => "django.core.mail.backends.locmem.EmailBackend",
        Dummy => "django.core.mail.backends.dummy.EmailBackend",
    }
}

dotted_enum! {
    pub enum PermissionClass {
        AllowAny => "rest_framework.permissions.AllowAny",
        IsAuthenticated => "rest_framework.permissions.IsAuthenticated",
        IsAdminUser => "rest_framework.permissions.IsAdminUser",
        IsAuthenticatedOrReadOnly => "rest_framework.permissions.IsAuthenticatedOrReadOnly",
    }
}

dotted_enum! {
    pub enum AuthenticationClass {
        Session => "rest_framework.authentication.SessionAuthentication",
        Basic => "rest_framework.authentication.BasicAuthentication",
        Token => "rest_framework.authentication.TokenAuthentication",
    }
}

dotted_enum! {
    pub enum RendererClass {
        Json => "rest_framework.renderers.JSONRenderer",
        BrowsableApi => "rest_framework.renderers.BrowsableAPIRenderer",
    }
}

dotted_enum! {
    pub enum PasswordValidator {
        UserAttributeSimilarity => "django.contrib.auth.password_validation.UserAttributeSimilarityValidator",
        MinimumLength => "django.contrib.auth.password_validation.MinimumLengthValidator",
        CommonPassword => "django.contrib.auth.password_validation.CommonPasswordValidator",
        NumericPassword => "django.contrib.auth.password_validation.NumericPasswordValidator",
    }
}

/// `X-Frame-Options` header value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum XFrameOptions {
    #[default]
    Deny,
    #[serde(rename = "SAMEORIGIN")]
    SameOrigin,
}

impl XFrameOptions {
    fn resolve(key: &str, value: &str) -> Result<Self, ConfigError> {
        match value.to_uppercase().as_str() {
            "DENY" => Ok(XFrameOptions::Deny),
            "SAMEORIGIN" => Ok(XFrameOptions::SameOrigin),
            _ => Err(ConfigError::type_error(
                key,
                format!("'{}' is not DENY or SAMEORIGIN", value),
            )),
        }
    }
}

/// String that never shows up in debug output or dumps
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", REDACTED)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

// ============================================================================
// Lookup helpers
// ============================================================================

/// Read access shared by the top-level mapping and nested sections
trait Lookup {
    fn lookup(&self, key: &str) -> Option<&ConfigValue>;
    fn qualify(&self, key: &str) -> String;

    fn req(&self, key: &str) -> Result<&ConfigValue, ConfigError> {
        self.lookup(key)
            .ok_or_else(|| ConfigError::missing(self.qualify(key)))
    }

    fn req_str(&self, key: &str) -> Result<&str, ConfigError> {
        let value = self.req(key)?;
        value
            .as_str()
            .ok_or_else(|| mismatch(&self.qualify(key), "string", value))
    }

    fn opt_str<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ConfigError> {
        match self.lookup(key) {
            Some(value) => value
                .as_str()
                .ok_or_else(|| mismatch(&self.qualify(key), "string", value)),
            None => Ok(default),
        }
    }

    fn req_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.req(key)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(&self.qualify(key), "bool", value))
    }

    fn opt_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.lookup(key) {
            Some(value) => value
                .as_bool()
                .ok_or_else(|| mismatch(&self.qualify(key), "bool", value)),
            None => Ok(default),
        }
    }

    fn opt_int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.lookup(key) {
            Some(value) => value
                .as_int()
                .ok_or_else(|| mismatch(&self.qualify(key), "int", value)),
            None => Ok(default),
        }
    }

    fn req_list(&self, key: &str) -> Result<&[String], ConfigError> {
        let value = self.req(key)?;
        value
            .as_list()
            .ok_or_else(|| mismatch(&self.qualify(key), "list", value))
    }

    fn opt_list(&self, key: &str) -> Result<&[String], ConfigError> {
        match self.lookup(key) {
            Some(value) => value
                .as_list()
                .ok_or_else(|| mismatch(&self.qualify(key), "list", value)),
            None => Ok(&[]),
        }
    }

    fn req_path(&self, key: &str) -> Result<&Path, ConfigError> {
        let value = self.req(key)?;
        value
            .as_path()
            .ok_or_else(|| mismatch(&self.qualify(key), "path", value))
    }

    fn req_section(&self, key: &str) -> Result<Section<'_>, ConfigError> {
        let value = self.req(key)?;
        let map = value
            .as_map()
            .ok_or_else(|| mismatch(&self.qualify(key), "map", value))?;
        Ok(Section {
            name: self.qualify(key),
            map,
        })
    }

    fn opt_section(&self, key: &str) -> Result<Option<Section<'_>>, ConfigError> {
        match self.lookup(key) {
            Some(_) => self.req_section(key).map(Some),
            None => Ok(None),
        }
    }
}

impl Lookup for ConfigMap {
    fn lookup(&self, key: &str) -> Option<&ConfigValue> {
        self.get(key)
    }

    fn qualify(&self, key: &str) -> String {
        key.to_string()
    }
}

/// A nested mapping, remembering its dotted location for error messages
struct Section<'a> {
    name: String,
    map: &'a BTreeMap<String, ConfigValue>,
}

impl Lookup for Section<'_> {
    fn lookup(&self, key: &str) -> Option<&ConfigValue> {
        self.map.get(key)
    }

    fn qualify(&self, key: &str) -> String {
        format!("{}.{}", self.name, key)
    }
}

fn resolve_all<T>(
    key: &str,
    items: &[String],
    resolve: impl Fn(&str, &str) -> Result<T, ConfigError>,
) -> Result<Vec<T>, ConfigError> {
    items.iter().map(|item| resolve(key, item.as_str())).collect()
}

fn log_level(section: &impl Lookup, key: &str, raw: &str) -> Result<String, ConfigError> {
    normalize_level(raw)
        .map(str::to_string)
        .map_err(|e| ConfigError::type_error(section.qualify(key), e.to_string()))
}

fn non_negative<T: TryFrom<i64>>(key: &str, value: i64) -> Result<T, ConfigError> {
    T::try_from(value)
        .map_err(|_| ConfigError::type_error(key, format!("{} is out of range", value)))
}

// ============================================================================
// Settings sections
// ============================================================================

/// Template engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSettings {
    pub backend: String,
    pub dirs: Vec<PathBuf>,
    pub app_dirs: bool,
    pub context_processors: Vec<String>,
}

/// Database engine derived from the connection URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgres,
    Mysql,
    Sqlite,
}

impl DatabaseEngine {
    pub fn from_scheme(key: &str, scheme: &str) -> Result<Self, ConfigError> {
        match scheme {
            "postgres" | "postgresql" | "pgsql" => Ok(DatabaseEngine::Postgres),
            "mysql" => Ok(DatabaseEngine::Mysql),
            "sqlite" => Ok(DatabaseEngine::Sqlite),
            _ => Err(ConfigError::type_error(
                key,
                format!("unsupported database scheme '{}'", scheme),
            )),
        }
    }

    pub fn as_path(&self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "django.db.backends.postgresql",
            DatabaseEngine::Mysql => "django.db.backends.mysql",
            DatabaseEngine::Sqlite => "django.db.backends.sqlite3",
        }
    }
}

/// Database connection parameters parsed from the connection URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    pub engine: DatabaseEngine,
    pub name: String,
    pub user: String,
    pub password: Secret,
    pub host: String,
    pub port: Option<u16>,
}

impl DatabaseConfig {
    /// Split a connection URL into its parts
    pub fn from_url(key: &str, url: &Url) -> Result<Self, ConfigError> {
        let engine = DatabaseEngine::from_scheme(key, url.scheme())?;
        let name = match engine {
            // sqlite:////abs/path.db keeps the leading slash of the path
            DatabaseEngine::Sqlite => url.path().to_string(),
            _ => url.path().trim_start_matches('/').to_string(),
        };

        Ok(Self {
            engine,
            name,
            user: url.username().to_string(),
            password: Secret::new(url.password().unwrap_or_default()),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct I18nSettings {
    pub language_code: String,
    pub time_zone: String,
    pub use_i18n: bool,
    pub use_tz: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticSettings {
    pub url: String,
    pub root: PathBuf,
    pub dirs: Vec<PathBuf>,
    pub storage: StaticFilesStorage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaSettings {
    pub url: String,
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestFrameworkSettings {
    pub permission_classes: Vec<PermissionClass>,
    pub authentication_classes: Vec<AuthenticationClass>,
    pub renderer_classes: Vec<RendererClass>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub allow_all_origins: bool,
}

/// Transport security and cookie flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SecuritySettings {
    pub browser_xss_filter: bool,
    pub content_type_nosniff: bool,
    pub hsts_seconds: u64,
    pub hsts_include_subdomains: bool,
    pub hsts_preload: bool,
    pub ssl_redirect: bool,
    pub session_cookie_secure: bool,
    pub csrf_cookie_secure: bool,
    pub x_frame_options: XFrameOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSettings {
    pub backend: EmailBackend,
    pub host: String,
    pub port: u16,
    pub host_user: String,
    pub host_password: Secret,
    pub use_tls: bool,
    pub default_from_email: String,
}

/// Log sink named by the `handlers` list of the `LOGGING` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogHandler {
    Console,
    File,
}

impl LogHandler {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogHandler::Console => "console",
            LogHandler::File => "file",
        }
    }

    fn resolve(key: &str, name: &str) -> Result<Self, ConfigError> {
        match name {
            "console" => Ok(LogHandler::Console),
            "file" => Ok(LogHandler::File),
            _ => Err(ConfigError::type_error(
                key,
                format!("unknown log handler '{}'", name),
            )),
        }
    }
}

/// Level override for one logger target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggerOverride {
    pub level: String,
    pub handlers: Vec<LogHandler>,
    pub propagate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    pub handlers: Vec<LogHandler>,
    /// Log file used by the `file` handler
    pub file: Option<PathBuf>,
    pub loggers: BTreeMap<String, LoggerOverride>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
            handlers: vec![LogHandler::Console],
            file: None,
            loggers: BTreeMap::new(),
        }
    }
}

impl LoggingSettings {
    /// Read a dictConfig-shaped section
    ///
    /// `root` supplies the level and the handlers. The `formatter` of the
    /// first root handler picks the output format, and `handlers.file.filename`
    /// is the log file. `version`, `disable_existing_loggers` and the
    /// formatter definitions stay in the mapping but are not interpreted.
    fn from_section(section: &Section<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut level = defaults.level;
        let mut handlers = defaults.handlers;
        if let Some(root) = section.opt_section("root")? {
            level = log_level(&root, "level", root.opt_str("level", &level)?)?;
            if root.lookup("handlers").is_some() {
                handlers = resolve_all(
                    &root.qualify("handlers"),
                    root.req_list("handlers")?,
                    LogHandler::resolve,
                )?;
            }
        }

        let mut format = defaults.format;
        let mut file = None;
        if let Some(specs) = section.opt_section("handlers")? {
            if let Some(first) = handlers.first()
                && let Some(spec) = specs.opt_section(first.as_str())?
            {
                format = spec
                    .opt_str("formatter", format.as_str())?
                    .parse::<LogFormat>()
                    .map_err(|e| ConfigError::type_error(spec.qualify("formatter"), e.to_string()))?;
            }

            if let Some(spec) = specs.opt_section(LogHandler::File.as_str())? {
                file = match spec.lookup("filename") {
                    Some(ConfigValue::Path(path)) => Some(path.clone()),
                    Some(ConfigValue::Str(path)) => Some(PathBuf::from(path)),
                    Some(other) => return Err(mismatch(&spec.qualify("filename"), "path", other)),
                    None => None,
                };
            }
        }

        let mut loggers = BTreeMap::new();
        if let Some(targets) = section.opt_section("loggers")? {
            for target in targets.map.keys() {
                let logger = targets.req_section(target)?;
                let level = log_level(&logger, "level", logger.req_str("level")?)?;
                loggers.insert(
                    target.clone(),
                    LoggerOverride {
                        level,
                        handlers: resolve_all(
                            &logger.qualify("handlers"),
                            logger.opt_list("handlers")?,
                            LogHandler::resolve,
                        )?,
                        propagate: logger.opt_bool("propagate", true)?,
                    },
                );
            }
        }

        Ok(Self {
            level,
            format,
            handlers,
            file,
            loggers,
        })
    }

    /// The `LOGGING` section of `effective`, or the defaults when it is absent
    ///
    /// Unlike [`Settings::from_effective`] this runs no validation, so a
    /// logger can be set up before the rest of the settings are checked.
    pub fn from_effective(effective: &EffectiveConfig) -> Result<Self, ConfigError> {
        match effective.values().opt_section(keys::LOGGING)? {
            Some(section) => Self::from_section(&section),
            None => Ok(Self::default()),
        }
    }

    /// Convert into the runtime configuration used by the logger module
    pub fn to_logger_config(&self) -> Result<LoggerConfig, ConfigError> {
        let console_enabled = self.handlers.contains(&LogHandler::Console);
        let file_enabled = self.handlers.contains(&LogHandler::File);

        let mut console = ConsoleConfig::new(console_enabled, true);
        console.format = self.format;

        let mut file = FileConfig {
            enabled: file_enabled,
            format: self.format,
            ..FileConfig::default()
        };
        if let Some(path) = &self.file {
            file.path = path.clone();
        }

        let mut config = LoggerConfig::new(console, file, self.level.clone()).map_err(|e| {
            ConfigError::Validation {
                field: keys::LOGGING.to_string(),
                message: e.to_string(),
            }
        })?;
        config.targets = self
            .loggers
            .iter()
            .map(|(target, logger)| (target.clone(), logger.level.clone()))
            .collect();

        Ok(config)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Fully typed settings, resolved once from the effective configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub overlay: Environment,
    pub secret_key: Secret,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub internal_ips: Vec<String>,
    pub installed_apps: Vec<String>,
    pub middleware: Vec<Middleware>,
    pub root_urlconf: String,
    pub wsgi_application: String,
    pub templates: TemplateSettings,
    pub database: DatabaseConfig,
    pub password_validators: Vec<PasswordValidator>,
    pub i18n: I18nSettings,
    pub static_files: StaticSettings,
    pub media: MediaSettings,
    pub default_auto_field: String,
    pub rest_framework: RestFrameworkSettings,
    pub cors: CorsSettings,
    pub go_service_url: String,
    pub security: SecuritySettings,
    pub email: EmailSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Resolve every key of `effective` into its typed form
    ///
    /// Keys an overlay may leave unset (security flags, email, logging)
    /// fall back to the framework defaults.
    pub fn from_effective(effective: &EffectiveConfig) -> Result<Self, ConfigError> {
        let values = effective.values();

        let templates = values.req_section(keys::TEMPLATES)?;
        let databases = values.req_section(keys::DATABASES)?;
        let rest = values.req_section(keys::REST_FRAMEWORK)?;

        let database_key = databases.qualify("default");
        let database_url = databases.req("default")?;
        let database = match database_url {
            ConfigValue::Url(url) => DatabaseConfig::from_url(&database_key, url)?,
            other => return Err(mismatch(&database_key, "url", other)),
        };

        let settings = Self {
            overlay: effective.overlay(),
            secret_key: Secret::new(values.req_str(keys::SECRET_KEY)?),
            debug: values.req_bool(keys::DEBUG)?,
            allowed_hosts: values.req_list(keys::ALLOWED_HOSTS)?.to_vec(),
            internal_ips: values.opt_list(keys::INTERNAL_IPS)?.to_vec(),
            installed_apps: values.req_list(keys::INSTALLED_APPS)?.to_vec(),
            middleware: resolve_all(
                keys::MIDDLEWARE,
                values.req_list(keys::MIDDLEWARE)?,
                Middleware::resolve,
            )?,
            root_urlconf: values.req_str(keys::ROOT_URLCONF)?.to_string(),
            wsgi_application: values.req_str(keys::WSGI_APPLICATION)?.to_string(),
            templates: TemplateSettings {
                backend: templates.req_str("BACKEND")?.to_string(),
                dirs: templates
                    .opt_list("DIRS")?
                    .iter()
                    .map(PathBuf::from)
                    .collect(),
                app_dirs: templates.opt_bool("APP_DIRS", false)?,
                context_processors: templates.opt_list("CONTEXT_PROCESSORS")?.to_vec(),
            },
            database,
            password_validators: resolve_all(
                keys::AUTH_PASSWORD_VALIDATORS,
                values.opt_list(keys::AUTH_PASSWORD_VALIDATORS)?,
                PasswordValidator::resolve,
            )?,
            i18n: I18nSettings {
                language_code: values.req_str(keys::LANGUAGE_CODE)?.to_string(),
                time_zone: values.req_str(keys::TIME_ZONE)?.to_string(),
                use_i18n: values.req_bool(keys::USE_I18N)?,
                use_tz: values.req_bool(keys::USE_TZ)?,
            },
            static_files: StaticSettings {
                url: values.req_str(keys::STATIC_URL)?.to_string(),
                root: values.req_path(keys::STATIC_ROOT)?.to_path_buf(),
                dirs: values
                    .opt_list(keys::STATICFILES_DIRS)?
                    .iter()
                    .map(PathBuf::from)
                    .collect(),
                storage: StaticFilesStorage::resolve(
                    keys::STATICFILES_STORAGE,
                    values.opt_str(
                        keys::STATICFILES_STORAGE,
                        StaticFilesStorage::Plain.as_path(),
                    )?,
                )?,
            },
            media: MediaSettings {
                url: values.req_str(keys::MEDIA_URL)?.to_string(),
                root: values.req_path(keys::MEDIA_ROOT)?.to_path_buf(),
            },
            default_auto_field: values.req_str(keys::DEFAULT_AUTO_FIELD)?.to_string(),
            rest_framework: RestFrameworkSettings {
                permission_classes: resolve_all(
                    &rest.qualify("DEFAULT_PERMISSION_CLASSES"),
                    rest.opt_list("DEFAULT_PERMISSION_CLASSES")?,
                    PermissionClass::resolve,
                )?,
                authentication_classes: resolve_all(
                    &rest.qualify("DEFAULT_AUTHENTICATION_CLASSES"),
                    rest.opt_list("DEFAULT_AUTHENTICATION_CLASSES")?,
                    AuthenticationClass::resolve,
                )?,
                renderer_classes: resolve_all(
                    &rest.qualify("DEFAULT_RENDERER_CLASSES"),
                    rest.opt_list("DEFAULT_RENDERER_CLASSES")?,
                    RendererClass::resolve,
                )?,
            },
            cors: CorsSettings {
                allowed_origins: values.opt_list(keys::CORS_ALLOWED_ORIGINS)?.to_vec(),
                allow_credentials: values.opt_bool(keys::CORS_ALLOW_CREDENTIALS, false)?,
                allow_all_origins: values.opt_bool(keys::CORS_ALLOW_ALL_ORIGINS, false)?,
            },
            go_service_url: values.req_str(keys::GO_SERVICE_URL)?.to_string(),
            security: SecuritySettings {
                browser_xss_filter: values.opt_bool(keys::SECURE_BROWSER_XSS_FILTER, false)?,
                content_type_nosniff: values.opt_bool(keys::SECURE_CONTENT_TYPE_NOSNIFF, false)?,
                hsts_seconds: non_negative(
                    keys::SECURE_HSTS_SECONDS,
                    values.opt_int(keys::SECURE_HSTS_SECONDS, 0)?,
                )?,
                hsts_include_subdomains: values
                    .opt_bool(keys::SECURE_HSTS_INCLUDE_SUBDOMAINS, false)?,
                hsts_preload: values.opt_bool(keys::SECURE_HSTS_PRELOAD, false)?,
                ssl_redirect: values.opt_bool(keys::SECURE_SSL_REDIRECT, false)?,
                session_cookie_secure: values.opt_bool(keys::SESSION_COOKIE_SECURE, false)?,
                csrf_cookie_secure: values.opt_bool(keys::CSRF_COOKIE_SECURE, false)?,
                x_frame_options: XFrameOptions::resolve(
                    keys::X_FRAME_OPTIONS,
                    values.opt_str(keys::X_FRAME_OPTIONS, "DENY")?,
                )?,
            },
            email: EmailSettings {
                backend: EmailBackend::resolve(
                    keys::EMAIL_BACKEND,
                    values.opt_str(keys::EMAIL_BACKEND, EmailBackend::Smtp.as_path())?,
                )?,
                host: values.opt_str(keys::EMAIL_HOST, "localhost")?.to_string(),
                port: non_negative(keys::EMAIL_PORT, values.opt_int(keys::EMAIL_PORT, 25)?)?,
                host_user: values.opt_str(keys::EMAIL_HOST_USER, "")?.to_string(),
                host_password: Secret::new(values.opt_str(keys::EMAIL_HOST_PASSWORD, "")?),
                use_tls: values.opt_bool(keys::EMAIL_USE_TLS, false)?,
                default_from_email: values
                    .opt_str(keys::DEFAULT_FROM_EMAIL, "webmaster@localhost")?
                    .to_string(),
            },
            logging: LoggingSettings::from_effective(effective)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Whether `middleware` is part of the chain
    pub fn has_middleware(&self, middleware: Middleware) -> bool {
        self.middleware.contains(&middleware)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::base::{BaseOptions, build_base};
    use crate::config::overlay::apply_overlay;
    use crate::config::reader::EnvReader;
    use crate::config::value::ConfigMap;
    use std::collections::HashMap;

    fn resolve(overlay: &str, env: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let reader = EnvReader::with_source(
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        );
        let base = build_base(&reader, &BaseOptions::default())?;
        let effective = apply_overlay(&base, overlay, &reader)?;
        Settings::from_effective(&effective)
    }

    #[test]
    fn test_dotted_enum_round_trip() {
        for middleware in Middleware::ALL {
            assert_eq!(
                Middleware::resolve(keys::MIDDLEWARE, middleware.as_path()).unwrap(),
                *middleware
            );
        }
        for storage in StaticFilesStorage::ALL {
            assert_eq!(
                StaticFilesStorage::resolve(keys::STATICFILES_STORAGE, storage.as_path())
                    .unwrap(),
                *storage
            );
        }
    }

    #[test]
    fn test_unknown_dotted_path_is_type_error() {
        let err = Middleware::resolve(keys::MIDDLEWARE, "acme.middleware.Nope").unwrap_err();
        assert!(matches!(err, ConfigError::Type { ref key, .. } if key == "MIDDLEWARE"));
    }

    #[test]
    fn test_development_settings() {
        let settings = resolve("development", &[]).unwrap();

        assert_eq!(settings.overlay, Environment::Development);
        assert!(settings.debug);
        assert_eq!(settings.middleware[0], Middleware::DebugToolbar);
        assert_eq!(settings.middleware[1], Middleware::Security);
        assert!(settings.password_validators.is_empty());
        assert_eq!(settings.email.backend, EmailBackend::Console);
        assert_eq!(settings.static_files.storage, StaticFilesStorage::Plain);
        assert!(settings.cors.allow_all_origins);
        assert_eq!(settings.internal_ips, vec!["127.0.0.1".to_string()]);
        assert_eq!(settings.logging, LoggingSettings::default());
        assert_eq!(settings.security, SecuritySettings::default());
    }

    #[test]
    fn test_production_settings() {
        let settings = resolve("production", &[("DJANGO_LOG_LEVEL", "WARNING")]).unwrap();

        assert_eq!(settings.overlay, Environment::Production);
        assert!(!settings.debug);
        assert_eq!(settings.middleware[0], Middleware::Security);
        assert_eq!(settings.password_validators.len(), 4);
        assert_eq!(settings.email.backend, EmailBackend::Smtp);
        assert_eq!(settings.email.port, 587);
        assert!(settings.email.use_tls);
        assert_eq!(
            settings.static_files.storage,
            StaticFilesStorage::CompressedManifest
        );
        assert_eq!(settings.security.hsts_seconds, 31_536_000);
        assert_eq!(settings.security.x_frame_options, XFrameOptions::Deny);
        assert!(settings.security.ssl_redirect);

        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, LogFormat::Full);
        assert_eq!(settings.logging.loggers["django"].level, "warn");
        assert!(!settings.logging.loggers["django"].propagate);
    }

    #[test]
    fn test_rest_framework_classes() {
        let settings = resolve("production", &[]).unwrap();
        assert_eq!(
            settings.rest_framework.permission_classes,
            vec![PermissionClass::IsAuthenticated]
        );
        assert_eq!(
            settings.rest_framework.authentication_classes,
            vec![AuthenticationClass::Session, AuthenticationClass::Basic]
        );
        assert_eq!(
            settings.rest_framework.renderer_classes,
            vec![RendererClass::Json, RendererClass::BrowsableApi]
        );
    }

    #[test]
    fn test_database_from_default_url() {
        let settings = resolve("production", &[]).unwrap();
        let db = &settings.database;

        assert_eq!(db.engine, DatabaseEngine::Postgres);
        assert_eq!(db.name, "django_db");
        assert_eq!(db.user, "django_user");
        assert_eq!(db.password.expose(), "django_password");
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, Some(5432));
    }

    #[test]
    fn test_database_unsupported_scheme() {
        let err = resolve("development", &[("DATABASE_URL", "redis://localhost/0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Type { ref key, .. } if key == "DATABASES.default"));
    }

    #[test]
    fn test_secrets_are_redacted() {
        let settings = resolve("production", &[("EMAIL_HOST_PASSWORD", "hunter2")]).unwrap();
        assert_eq!(settings.email.host_password.expose(), "hunter2");

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("django_password"));

        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("your-secret-key-here"));
    }

    #[test]
    fn test_logging_to_logger_config() {
        let settings = resolve("production", &[("DJANGO_LOG_LEVEL", "ERROR")]).unwrap();
        let config = settings.logging.to_logger_config().unwrap();

        assert!(config.console.enabled);
        assert!(!config.file.enabled);
        assert_eq!(config.filter_directives().unwrap(), "info,django=error");
    }

    #[test]
    fn test_logging_reads_root_and_handler_formatter() {
        let mut values = ConfigMap::new();
        values
            .set(
                keys::LOGGING,
                ConfigValue::map([
                    ("version", ConfigValue::Int(1)),
                    ("disable_existing_loggers", ConfigValue::Bool(false)),
                    (
                        "handlers",
                        ConfigValue::map([(
                            "file",
                            ConfigValue::map([
                                ("class", ConfigValue::from("logging.FileHandler")),
                                ("filename", ConfigValue::from("/var/log/app/django.log")),
                                ("formatter", ConfigValue::from("simple")),
                            ]),
                        )]),
                    ),
                    (
                        "root",
                        ConfigValue::map([
                            ("handlers", ConfigValue::list(["file", "console"])),
                            ("level", ConfigValue::from("WARNING")),
                        ]),
                    ),
                ]),
            )
            .unwrap();
        let effective = EffectiveConfig::new(Environment::Production, values);

        let logging = LoggingSettings::from_effective(&effective).unwrap();
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.format, LogFormat::Compact);
        assert_eq!(logging.handlers, vec![LogHandler::File, LogHandler::Console]);
        assert_eq!(logging.file, Some(PathBuf::from("/var/log/app/django.log")));
        assert!(logging.loggers.is_empty());

        let config = logging.to_logger_config().unwrap();
        assert!(config.file.enabled);
        assert!(config.console.enabled);
    }

    #[test]
    fn test_logging_unknown_formatter_is_type_error() {
        let mut values = ConfigMap::new();
        values
            .set(
                keys::LOGGING,
                ConfigValue::map([(
                    "handlers",
                    ConfigValue::map([(
                        "console",
                        ConfigValue::map([("formatter", ConfigValue::from("fancy"))]),
                    )]),
                )]),
            )
            .unwrap();
        let effective = EffectiveConfig::new(Environment::Production, values);

        let err = LoggingSettings::from_effective(&effective).unwrap_err();
        assert!(
            matches!(err, ConfigError::Type { ref key, .. } if key == "LOGGING.handlers.console.formatter")
        );
    }

    #[test]
    fn test_logging_bad_level_is_type_error() {
        let err = resolve("production", &[("DJANGO_LOG_LEVEL", "LOUD")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::Type { ref key, .. } if key == "LOGGING.loggers.django.level")
        );
    }

    #[test]
    fn test_missing_required_key() {
        let mut values = ConfigMap::new();
        values.set(keys::SECRET_KEY, "x".into()).unwrap();
        let effective = EffectiveConfig::new(Environment::Development, values);

        let err = Settings::from_effective(&effective).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }
}
