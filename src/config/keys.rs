//! Well-known configuration keys and the environment variables feeding them

pub const SECRET_KEY: &str = "SECRET_KEY";
pub const DEBUG: &str = "DEBUG";
pub const ALLOWED_HOSTS: &str = "ALLOWED_HOSTS";
pub const INSTALLED_APPS: &str = "INSTALLED_APPS";
pub const MIDDLEWARE: &str = "MIDDLEWARE";
pub const ROOT_URLCONF: &str = "ROOT_URLCONF";
pub const TEMPLATES: &str = "TEMPLATES";
pub const WSGI_APPLICATION: &str = "WSGI_APPLICATION";
pub const DATABASES: &str = "DATABASES";
pub const AUTH_PASSWORD_VALIDATORS: &str = "AUTH_PASSWORD_VALIDATORS";
pub const LANGUAGE_CODE: &str = "LANGUAGE_CODE";
pub const TIME_ZONE: &str = "TIME_ZONE";
pub const USE_I18N: &str = "USE_I18N";
pub const USE_TZ: &str = "USE_TZ";
pub const STATIC_URL: &str = "STATIC_URL";
pub const STATIC_ROOT: &str = "STATIC_ROOT";
pub const STATICFILES_DIRS: &str = "STATICFILES_DIRS";
pub const STATICFILES_STORAGE: &str = "STATICFILES_STORAGE";
pub const MEDIA_URL: &str = "MEDIA_URL";
pub const MEDIA_ROOT: &str = "MEDIA_ROOT";
pub const DEFAULT_AUTO_FIELD: &str = "DEFAULT_AUTO_FIELD";
pub const REST_FRAMEWORK: &str = "REST_FRAMEWORK";
pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
pub const CORS_ALLOW_CREDENTIALS: &str = "CORS_ALLOW_CREDENTIALS";
pub const CORS_ALLOW_ALL_ORIGINS: &str = "CORS_ALLOW_ALL_ORIGINS";
pub const GO_SERVICE_URL: &str = "GO_SERVICE_URL";
pub const INTERNAL_IPS: &str = "INTERNAL_IPS";

pub const SECURE_BROWSER_XSS_FILTER: &str = "SECURE_BROWSER_XSS_FILTER";
pub const SECURE_CONTENT_TYPE_NOSNIFF: &str = "SECURE_CONTENT_TYPE_NOSNIFF";
pub const SECURE_HSTS_INCLUDE_SUBDOMAINS: &str = "SECURE_HSTS_INCLUDE_SUBDOMAINS";
pub const SECURE_HSTS_PRELOAD: &str = "SECURE_HSTS_PRELOAD";
pub const SECURE_HSTS_SECONDS: &str = "SECURE_HSTS_SECONDS";
pub const SECURE_SSL_REDIRECT: &str = "SECURE_SSL_REDIRECT";
pub const SESSION_COOKIE_SECURE: &str = "SESSION_COOKIE_SECURE";
pub const CSRF_COOKIE_SECURE: &str = "CSRF_COOKIE_SECURE";
pub const X_FRAME_OPTIONS: &str = "X_FRAME_OPTIONS";

pub const EMAIL_BACKEND: &str = "EMAIL_BACKEND";
pub const EMAIL_HOST: &str = "EMAIL_HOST";
pub const EMAIL_PORT: &str = "EMAIL_PORT";
pub const EMAIL_HOST_USER: &str = "EMAIL_HOST_USER";
pub const EMAIL_HOST_PASSWORD: &str = "EMAIL_HOST_PASSWORD";
pub const EMAIL_USE_TLS: &str = "EMAIL_USE_TLS";
pub const DEFAULT_FROM_EMAIL: &str = "DEFAULT_FROM_EMAIL";

pub const LOGGING: &str = "LOGGING";

/// Environment variable names whose spelling differs from the key they feed
/// Keys whose values are masked when the configuration is displayed
pub const SECRETS: &[&str] = &[SECRET_KEY, EMAIL_HOST_PASSWORD];

pub mod env {
    pub const SECRET_KEY: &str = "DJANGO_SECRET_KEY";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const LOG_LEVEL: &str = "DJANGO_LOG_LEVEL";
}
