//! Configuration validation logic
//!
//! `validate` methods reject settings that can never work and run as part of
//! [`Settings::from_effective`]. [`Settings::deployment_warnings`] reports
//! settings that work but are unsafe to deploy, the way the framework's
//! deploy check does.

use std::collections::HashSet;

use serde::Serialize;
use url::Url;

use crate::config::base::INSECURE_SECRET_KEY;
use crate::config::error::ConfigError;
use crate::config::settings::{
    CorsSettings, DatabaseConfig, DatabaseEngine, EmailBackend, EmailSettings, Middleware,
    Settings,
};

/// Minimum secret key length before it is considered weak
const SECRET_KEY_MIN_LENGTH: usize = 50;

/// Minimum number of distinct characters in a secret key
const SECRET_KEY_MIN_UNIQUE_CHARACTERS: usize = 5;

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - Database name must not be empty
    /// - Host must not be empty for network databases
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim_matches('/').is_empty() {
            return Err(ConfigError::validation(
                "DATABASES.default",
                "Database name is required. Expected format: scheme://[user:password@]host[:port]/database",
            ));
        }

        if self.engine != DatabaseEngine::Sqlite && self.host.is_empty() {
            return Err(ConfigError::validation(
                "DATABASES.default",
                "Database host is required for network databases.",
            ));
        }

        Ok(())
    }
}

impl EmailSettings {
    /// Validate email settings
    ///
    /// # Validation Rules
    /// - SMTP backend requires a host and a non-zero port
    /// - Sender address must look like an address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == EmailBackend::Smtp {
            if self.host.trim().is_empty() {
                return Err(ConfigError::validation(
                    "EMAIL_HOST",
                    "SMTP host is required when the SMTP backend is selected.",
                ));
            }
            if self.port == 0 {
                return Err(ConfigError::validation(
                    "EMAIL_PORT",
                    "Port must be between 1 and 65535.",
                ));
            }
        }

        if !self.default_from_email.contains('@') {
            return Err(ConfigError::Validation {
                field: "DEFAULT_FROM_EMAIL".to_string(),
                message: format!(
                    "'{}' is not a valid sender address.",
                    self.default_from_email
                ),
            });
        }

        Ok(())
    }
}

impl CorsSettings {
    /// Validate CORS settings
    ///
    /// # Validation Rules
    /// - Every allowed origin is `scheme://host[:port]` with no path
    pub fn validate(&self) -> Result<(), ConfigError> {
        for origin in &self.allowed_origins {
            let valid = Url::parse(origin)
                .map(|url| url.has_host() && (url.path().is_empty() || url.path() == "/"))
                .unwrap_or(false);
            if !valid || origin.ends_with('/') {
                return Err(ConfigError::Validation {
                    field: "CORS_ALLOWED_ORIGINS".to_string(),
                    message: format!(
                        "Origin '{}' must be scheme://host[:port] with no path or trailing slash.",
                        origin
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::validation(
                "SECRET_KEY",
                "Secret key must not be empty.",
            ));
        }

        if self.has_middleware(Middleware::DebugToolbar)
            && self.middleware[0] != Middleware::DebugToolbar
        {
            return Err(ConfigError::validation(
                "MIDDLEWARE",
                "Debug toolbar middleware must be first in the chain.",
            ));
        }

        if Url::parse(&self.go_service_url).is_err() {
            return Err(ConfigError::Validation {
                field: "GO_SERVICE_URL".to_string(),
                message: format!("'{}' is not a valid URL.", self.go_service_url),
            });
        }

        self.database.validate()?;
        self.email.validate()?;
        self.cors.validate()?;

        Ok(())
    }

    /// Settings that are valid but unsafe for a deployment
    ///
    /// An empty list means the settings pass the deploy check.
    pub fn deployment_warnings(&self) -> Vec<DeployWarning> {
        let mut warnings = Vec::new();
        let security = &self.security;

        if !self.has_middleware(Middleware::Security) {
            warnings.push(DeployWarning::new(
                "security.W001",
                "SecurityMiddleware is not in MIDDLEWARE; security headers will not be sent.",
            ));
        }

        if self.has_middleware(Middleware::Security) {
            if security.hsts_seconds == 0 {
                warnings.push(DeployWarning::new(
                    "security.W004",
                    "SECURE_HSTS_SECONDS is not set; browsers will not enforce HTTPS.",
                ));
            } else if !security.hsts_include_subdomains {
                warnings.push(DeployWarning::new(
                    "security.W005",
                    "SECURE_HSTS_INCLUDE_SUBDOMAINS is not enabled.",
                ));
            }

            if !security.content_type_nosniff {
                warnings.push(DeployWarning::new(
                    "security.W006",
                    "SECURE_CONTENT_TYPE_NOSNIFF is not enabled.",
                ));
            }

            if !security.ssl_redirect {
                warnings.push(DeployWarning::new(
                    "security.W008",
                    "SECURE_SSL_REDIRECT is not enabled; plain HTTP requests are served.",
                ));
            }

            if security.hsts_preload && security.hsts_seconds == 0 {
                warnings.push(DeployWarning::new(
                    "security.W021",
                    "SECURE_HSTS_PRELOAD has no effect without SECURE_HSTS_SECONDS.",
                ));
            }
        }

        if is_weak_secret(self.secret_key.expose()) {
            warnings.push(DeployWarning::new(
                "security.W009",
                "SECRET_KEY is the insecure placeholder or too weak. Set DJANGO_SECRET_KEY to a long random value.",
            ));
        }

        if !security.session_cookie_secure {
            warnings.push(DeployWarning::new(
                "security.W012",
                "SESSION_COOKIE_SECURE is not enabled; session cookies may leak over HTTP.",
            ));
        }

        if !security.csrf_cookie_secure {
            warnings.push(DeployWarning::new(
                "security.W016",
                "CSRF_COOKIE_SECURE is not enabled; CSRF cookies may leak over HTTP.",
            ));
        }

        if self.debug {
            warnings.push(DeployWarning::new(
                "security.W018",
                "DEBUG is enabled in a deployment.",
            ));
        }

        if self.allowed_hosts.is_empty() {
            warnings.push(DeployWarning::new(
                "security.W020",
                "ALLOWED_HOSTS is empty; every request will be rejected.",
            ));
        } else if self.allowed_hosts.iter().any(|host| host == "*") {
            warnings.push(DeployWarning::new(
                "hosts.W001",
                "ALLOWED_HOSTS contains '*'; any Host header is accepted.",
            ));
        }

        if self.cors.allow_all_origins && self.cors.allow_credentials {
            warnings.push(DeployWarning::new(
                "cors.W001",
                "CORS_ALLOW_ALL_ORIGINS with CORS_ALLOW_CREDENTIALS exposes credentials to any origin.",
            ));
        }

        if self.password_validators.is_empty() {
            warnings.push(DeployWarning::new(
                "auth.W001",
                "AUTH_PASSWORD_VALIDATORS is empty; weak passwords are accepted.",
            ));
        }

        warnings
    }
}

fn is_weak_secret(secret: &str) -> bool {
    let unique: HashSet<char> = secret.chars().collect();
    secret == INSECURE_SECRET_KEY
        || secret.chars().count() < SECRET_KEY_MIN_LENGTH
        || unique.len() < SECRET_KEY_MIN_UNIQUE_CHARACTERS
}

/// A deploy-readiness finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployWarning {
    /// Stable identifier, e.g. `security.W018`
    pub id: &'static str,
    pub message: String,
}

impl DeployWarning {
    fn new(id: &'static str, message: &str) -> Self {
        Self {
            id,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for DeployWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {}", self.id, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{DatabaseEngine, Secret};

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            engine: DatabaseEngine::Postgres,
            name: "app".to_string(),
            user: "app".to_string(),
            password: Secret::new("pw"),
            host: "db".to_string(),
            port: Some(5432),
        }
    }

    fn email() -> EmailSettings {
        EmailSettings {
            backend: EmailBackend::Smtp,
            host: "smtp.example.com".to_string(),
            port: 587,
            host_user: String::new(),
            host_password: Secret::default(),
            use_tls: true,
            default_from_email: "webmaster@localhost".to_string(),
        }
    }

    #[test]
    fn test_database_validation() {
        assert!(database().validate().is_ok());

        let mut db = database();
        db.name = String::new();
        assert!(db.validate().is_err());

        let mut db = database();
        db.host = String::new();
        assert!(db.validate().is_err());

        db.engine = DatabaseEngine::Sqlite;
        db.name = "/var/lib/app.db".to_string();
        assert!(db.validate().is_ok());
    }

    #[test]
    fn test_email_validation() {
        assert!(email().validate().is_ok());

        let mut settings = email();
        settings.host = " ".to_string();
        assert!(settings.validate().is_err());

        let mut settings = email();
        settings.backend = EmailBackend::Console;
        settings.host = String::new();
        assert!(settings.validate().is_ok());

        let mut settings = email();
        settings.default_from_email = "webmaster".to_string();
        let err = settings.validate().unwrap_err();
        assert_eq!(err.key(), Some("DEFAULT_FROM_EMAIL"));
    }

    #[test]
    fn test_cors_validation() {
        let mut cors = CorsSettings {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://example.com".to_string(),
            ],
            allow_credentials: true,
            allow_all_origins: false,
        };
        assert!(cors.validate().is_ok());

        cors.allowed_origins = vec!["https://example.com/app".to_string()];
        assert!(cors.validate().is_err());

        cors.allowed_origins = vec!["https://example.com/".to_string()];
        assert!(cors.validate().is_err());

        cors.allowed_origins = vec!["example.com".to_string()];
        assert!(cors.validate().is_err());
    }

    #[test]
    fn test_weak_secret() {
        assert!(is_weak_secret(INSECURE_SECRET_KEY));
        assert!(is_weak_secret("short"));
        assert!(is_weak_secret(&"a".repeat(64)));
        assert!(!is_weak_secret(
            "k3J9x!qP0z@Lm8#vR2tY5&wE7uI1oA4sD6fG9hJ0kL3zX5cV8bN2mQ"
        ));
    }
}
