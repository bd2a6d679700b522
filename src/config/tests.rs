//! End-to-end resolution tests: reader -> base -> overlay -> settings

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::base::{DEFAULT_DATABASE_URL, INSECURE_SECRET_KEY};
use crate::config::*;

// Global mutex to ensure tests touching the process environment run sequentially
static TEST_MUTEX: Mutex<()> = Mutex::new(());

const STRONG_SECRET: &str = "k3J9x!qP0z@Lm8#vR2tY5&wE7uI1oA4sD6fG9hJ0kL3zX5cV8bN2mQ";

fn reader(pairs: &[(&str, &str)]) -> EnvReader {
    EnvReader::with_source(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

fn effective(overlay: &str, pairs: &[(&str, &str)]) -> Result<EffectiveConfig, ConfigError> {
    resolve(&reader(pairs), overlay, &BaseOptions::default())
}

/// Helper to safely set environment variables for a test
struct EnvGuard {
    vars_to_restore: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn new() -> Self {
        Self {
            vars_to_restore: Vec::new(),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        let original = std::env::var(key).ok();
        self.vars_to_restore.push((key.to_string(), original));
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove(&mut self, key: &str) {
        let original = std::env::var(key).ok();
        self.vars_to_restore.push((key.to_string(), original));
        unsafe {
            std::env::remove_var(key);
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original_value) in self.vars_to_restore.iter().rev() {
            unsafe {
                match original_value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

#[test]
fn test_declared_defaults_have_declared_types() {
    let base = build_base(&reader(&[]), &BaseOptions::default()).unwrap();
    let values = base.values();

    assert_eq!(
        values.get(keys::SECRET_KEY),
        Some(&ConfigValue::from(INSECURE_SECRET_KEY))
    );
    assert_eq!(values.get(keys::DEBUG), Some(&ConfigValue::Bool(false)));
    assert_eq!(
        values.get(keys::ALLOWED_HOSTS),
        Some(&ConfigValue::list(["localhost", "127.0.0.1"]))
    );
    assert_eq!(
        values.get(keys::CORS_ALLOWED_ORIGINS),
        Some(&ConfigValue::list([
            "http://localhost:3000",
            "http://127.0.0.1:3000"
        ]))
    );
    assert_eq!(
        values.get(keys::GO_SERVICE_URL),
        Some(&ConfigValue::from("http://localhost:8080"))
    );

    let production = effective("production", &[]).unwrap();
    let values = production.values();
    assert_eq!(
        values.get(keys::EMAIL_HOST),
        Some(&ConfigValue::from("smtp.gmail.com"))
    );
    assert_eq!(values.get(keys::EMAIL_PORT), Some(&ConfigValue::Int(587)));
    assert_eq!(values.get(keys::EMAIL_HOST_USER), Some(&ConfigValue::from("")));
    assert_eq!(
        values.get(keys::EMAIL_HOST_PASSWORD),
        Some(&ConfigValue::from(""))
    );
    assert_eq!(
        values.get(keys::DEFAULT_FROM_EMAIL),
        Some(&ConfigValue::from("webmaster@localhost"))
    );
}

#[test]
fn test_development_overlay_is_deterministic() {
    let first = effective("development", &[]).unwrap();
    let second = effective("development", &[]).unwrap();
    assert_eq!(first, second);

    let first = effective("production", &[("EMAIL_PORT", "465")]).unwrap();
    let second = effective("production", &[("EMAIL_PORT", "465")]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_overlay_produces_nothing() {
    let result = effective("staging", &[]);
    match result {
        Err(ConfigError::UnknownOverlay { name, valid }) => {
            assert_eq!(name, "staging");
            assert!(valid.contains("development"));
            assert!(valid.contains("production"));
        }
        other => panic!("Expected UnknownOverlay, got {other:?}"),
    }
}

#[test]
fn test_database_placeholder_survives_production_overlay() {
    let reader = reader(&[]);
    let base = build_base(&reader, &BaseOptions::default()).unwrap();
    let production = apply_overlay(&base, "production", &reader).unwrap();

    let url = |values: &ConfigMap| {
        values.require_map(keys::DATABASES).unwrap()["default"]
            .as_url()
            .map(|u| u.to_string())
    };

    assert_eq!(url(base.values()).as_deref(), Some(DEFAULT_DATABASE_URL));
    assert_eq!(url(production.values()), url(base.values()));
}

#[test]
fn test_production_debug_wins_over_environment() {
    let production = effective("production", &[("DEBUG", "true")]).unwrap();
    assert!(!production.values().require_bool(keys::DEBUG).unwrap());

    let development = effective("development", &[("DEBUG", "false")]).unwrap();
    assert!(development.values().require_bool(keys::DEBUG).unwrap());
}

#[test]
fn test_overlay_only_touches_its_keys() {
    let reader = reader(&[]);
    let base = build_base(&reader, &BaseOptions::default()).unwrap();
    let production = apply_overlay(&base, "production", &reader).unwrap();
    let overlay = Overlay::production(&reader).unwrap();
    let touched: Vec<&str> = overlay.ops().iter().map(OverlayOp::key).collect();

    for (key, value) in base.values().iter() {
        if !touched.contains(&key) {
            assert_eq!(production.get(key), Some(value), "{key} changed");
        }
    }
}

#[test]
fn test_required_secret_key() {
    let options = BaseOptions {
        require_secret_key: true,
        ..BaseOptions::default()
    };

    let err = resolve(&reader(&[]), "production", &options).unwrap_err();
    assert_eq!(err, ConfigError::missing("DJANGO_SECRET_KEY"));

    let effective = resolve(
        &reader(&[("DJANGO_SECRET_KEY", STRONG_SECRET)]),
        "production",
        &options,
    )
    .unwrap();
    assert_eq!(
        effective.values().require_str(keys::SECRET_KEY).unwrap(),
        STRONG_SECRET
    );
}

#[test]
fn test_production_deploy_check() {
    let settings =
        Settings::from_effective(&effective("production", &[]).unwrap()).unwrap();
    let ids: Vec<&str> = settings
        .deployment_warnings()
        .iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, vec!["security.W009"]);

    let settings = Settings::from_effective(
        &effective("production", &[("DJANGO_SECRET_KEY", STRONG_SECRET)]).unwrap(),
    )
    .unwrap();
    assert!(settings.deployment_warnings().is_empty());
}

#[test]
fn test_development_deploy_check() {
    let settings =
        Settings::from_effective(&effective("development", &[]).unwrap()).unwrap();
    let ids: Vec<&str> = settings
        .deployment_warnings()
        .iter()
        .map(|w| w.id)
        .collect();

    for expected in [
        "security.W004",
        "security.W008",
        "security.W009",
        "security.W012",
        "security.W016",
        "security.W018",
        "hosts.W001",
        "cors.W001",
        "auth.W001",
    ] {
        assert!(ids.contains(&expected), "missing {expected} in {ids:?}");
    }
}

#[test]
fn test_override_file_fills_gaps_in_process_env() {
    let _guard = TEST_MUTEX.lock().unwrap();
    let mut env = EnvGuard::new();
    env.set("GO_SERVICE_URL", "http://go-from-env:8080");
    env.remove("EMAIL_HOST");

    let file = EnvFile::from_pairs([
        ("GO_SERVICE_URL", "http://go-from-file:8080"),
        ("EMAIL_HOST", "smtp.from-file"),
    ]);
    let reader = EnvReader::new(ProcessEnv, Cow::Owned(file));

    let effective = resolve(&reader, "production", &BaseOptions::default()).unwrap();
    assert_eq!(
        effective.values().require_str(keys::GO_SERVICE_URL).unwrap(),
        "http://go-from-env:8080"
    );
    assert_eq!(
        effective.values().require_str(keys::EMAIL_HOST).unwrap(),
        "smtp.from-file"
    );
}

#[test]
fn test_selector_from_process_env() {
    let _guard = TEST_MUTEX.lock().unwrap();
    let mut env = EnvGuard::new();

    env.remove(Environment::ENV_VAR);
    assert_eq!(Environment::from_env().unwrap(), Environment::Development);

    env.set(Environment::ENV_VAR, "prod");
    assert_eq!(Environment::from_env().unwrap(), Environment::Production);

    env.set(Environment::ENV_VAR, "qa");
    assert!(matches!(
        Environment::from_env(),
        Err(ConfigError::UnknownOverlay { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_selector_rejects_non_unicode_value() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let _guard = TEST_MUTEX.lock().unwrap();
    let mut env = EnvGuard::new();
    env.remove(Environment::ENV_VAR);
    unsafe {
        std::env::set_var(Environment::ENV_VAR, OsStr::from_bytes(b"prod\xff"));
    }

    assert!(matches!(
        Environment::from_env(),
        Err(ConfigError::UnknownOverlay { .. })
    ));
}

#[test]
fn test_effective_config_is_frozen() {
    let mut effective = effective("development", &[]).unwrap();
    assert!(effective.values().is_frozen());

    let op = OverlayOp::AppendToList {
        key: keys::INSTALLED_APPS.to_string(),
        item: "debug_toolbar".to_string(),
    };
    assert_eq!(
        effective.apply_op(&op),
        Err(ConfigError::immutable(keys::INSTALLED_APPS))
    );
}
