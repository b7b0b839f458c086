//! Two-phase bootstrap/configure tests.
//!
//! Responsibilities:
//! - Verify `configure` fails before `bootstrap` and `bootstrap` runs once.
//! - Verify bootstrap exports local bindings after discovery.
//! - Verify repeated `configure` calls reuse the bootstrap discovery.

use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;

use super::{NO_ARGS, hermetic_options, with_clean_env};
use crate::common::IS_LOCAL;
use crate::loader::{ConfigError, Configurator, bootstrap};
use crate::schema::{CliOption, Schema};

const BINDINGS: &str = r#"{
    "application": {"name": "orders", "application_uris": ["orders.example.com"]},
    "services": {"redis": [{"name": "cache", "credentials": {"url": "redis://localhost:6379"}}]}
}"#;

#[test]
fn test_configure_before_bootstrap_fails() {
    let configurator = Configurator::new();
    let err = configurator.configure(None).unwrap_err();
    assert!(matches!(err, ConfigError::NotBootstrapped));
    assert!(err.to_string().contains("not been bootstrapped"));
    assert!(!configurator.is_bootstrapped());
    assert!(configurator.app_env().is_none());
}

#[test]
#[serial]
fn test_bootstrap_runs_once() {
    let dir = TempDir::new().unwrap();
    with_clean_env(&[], || {
        let mut configurator = Configurator::new();
        configurator
            .bootstrap(hermetic_options(&dir, NO_ARGS))
            .unwrap();
        assert!(configurator.is_bootstrapped());

        let second = configurator.bootstrap(hermetic_options(&dir, NO_ARGS));
        assert!(matches!(second, Err(ConfigError::AlreadyBootstrapped)));
    });
}

#[test]
#[serial]
fn test_bootstrap_exports_bindings_but_stays_local() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("vcap-local.json"), BINDINGS).unwrap();

    with_clean_env(&[], || {
        let configurator = bootstrap(hermetic_options(&dir, NO_ARGS)).unwrap();

        let services: serde_json::Value =
            serde_json::from_str(&std::env::var("VCAP_SERVICES").unwrap()).unwrap();
        assert_eq!(services["redis"][0]["name"], json!("cache"));
        let app: serde_json::Value =
            serde_json::from_str(&std::env::var("VCAP_APPLICATION").unwrap()).unwrap();
        assert_eq!(app["name"], json!("orders"));

        // Discovery ran before the export, so the process is still local.
        let store = configurator.configure(None).unwrap();
        assert_eq!(store.get_bool(IS_LOCAL), Some(true));
        assert_eq!(store.get_str("cfenv:name"), Some("orders"));
        assert_eq!(
            configurator
                .app_env()
                .and_then(|env| env.service_url("cache"))
                .map(|url| url.to_string()),
            Some("redis://localhost:6379".to_string())
        );
    });
}

#[test]
#[serial]
fn test_bootstrap_does_not_overwrite_platform_variables() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("vcap-local.json"), BINDINGS).unwrap();

    with_clean_env(&[("VCAP_SERVICES", Some(r#"{"real": []}"#))], || {
        bootstrap(hermetic_options(&dir, NO_ARGS)).unwrap();
        assert_eq!(std::env::var("VCAP_SERVICES").as_deref(), Ok(r#"{"real": []}"#));
    });
}

#[test]
#[serial]
fn test_configure_reuses_discovery_across_schemas() {
    let dir = TempDir::new().unwrap();
    with_clean_env(
        &[
            ("_APPENV_T_QUEUE", Some("orders-queue")),
            ("_APPENV_T_CACHE_TTL", Some("30")),
        ],
        || {
            let configurator = bootstrap(hermetic_options(&dir, NO_ARGS)).unwrap();

            // A later platform variable must not change the bootstrap discovery.
            temp_env::with_var("VCAP_APPLICATION", Some("{}"), || {
                let queue_schema = Schema::new().with(
                    "queue",
                    CliOption::string("Queue name").with_env("_APPENV_T_QUEUE"),
                );
                let cache_schema = Schema::new().with(
                    "cacheTtl",
                    CliOption::number("Cache TTL").with_env("_APPENV_T_CACHE_TTL"),
                );

                let queue = configurator.configure(Some(&queue_schema)).unwrap();
                let cache = configurator.configure(Some(&cache_schema)).unwrap();

                assert_eq!(queue.get_str("queue"), Some("orders-queue"));
                assert!(queue.get("cacheTtl").is_none());
                assert_eq!(cache.get_i64("cacheTtl"), Some(30));
                assert!(cache.get("queue").is_none());
                assert!(queue.is_local());
                assert!(cache.is_local());
            });
        },
    );
}

#[test]
#[serial]
fn test_configure_falls_back_to_bootstrap_schema() {
    let dir = TempDir::new().unwrap();
    let schema = Schema::new().with("workers", CliOption::number("Workers").with_default(4));
    with_clean_env(&[], || {
        let configurator =
            bootstrap(hermetic_options(&dir, NO_ARGS).with_schema(schema)).unwrap();
        let store = configurator.configure(None).unwrap();
        assert_eq!(store.get_i64("workers"), Some(4));
        assert!(store.get("env").is_none());
    });
}
