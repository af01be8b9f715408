//! MongoDB client build-time config resolution tests.

use layerconf_config::{ConfigError, Layer, LayerSource, LayeredSourceOptions, Violation};
use layerconf_mongodb::{MongoClientBuildTimeConfig, schema};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn overrides(pairs: &[(&str, &str)]) -> Layer {
    Layer::from_pairs(LayerSource::Runtime, "overrides", pairs.iter().copied())
}

/// Tracing turned on by a later layer leaves the other toggles at their defaults.
#[test]
fn tracing_override_keeps_other_defaults() {
    let schema = schema().expect("schema");
    let layers = [
        Layer::defaults(&schema),
        overrides(&[("quarkus.mongodb.tracing.enabled", "true")]),
    ];
    let config = MongoClientBuildTimeConfig::resolve(&layers, true).expect("config");
    assert!(config.health_enabled);
    assert!(!config.metrics_enabled);
    assert!(config.tracing_enabled);
    assert!(!config.force_default_clients);
}

/// A non-boolean metrics flag is reported with the offending raw value.
#[test]
fn malformed_metrics_flag_fails() {
    let err = MongoClientBuildTimeConfig::resolve(
        &[overrides(&[("quarkus.mongodb.metrics.enabled", "notabool")])],
        false,
    )
    .unwrap_err();
    assert_eq!(
        err.violations(),
        &[Violation::TypeCoercionFailure {
            key: "metrics.enabled".to_string(),
            raw: "notabool".to_string(),
            expected: layerconf_config::FieldType::Bool,
        }]
    );
}

/// Disabling dev services drops the whole sub-tree.
#[test]
fn disabled_devservices_are_absent() {
    let config = MongoClientBuildTimeConfig::resolve(
        &[overrides(&[
            ("quarkus.mongodb.devservices.enabled", "false"),
            ("quarkus.mongodb.devservices.port", "not-a-port"),
        ])],
        true,
    )
    .expect("config");
    assert_eq!(config.devservices, None);
}

/// Ports outside the u16 range are rejected after resolution.
#[test]
fn out_of_range_port_is_rejected() {
    let err = MongoClientBuildTimeConfig::resolve(
        &[overrides(&[("quarkus.mongodb.devservices.port", "70000")])],
        true,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidField { .. }));
    assert!(format!("{err}").contains("mongodb:devservices.port"));
}

/// File, dotenv, and environment layers combine in precedence order.
#[test]
fn layered_sources_feed_the_typed_tree() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("application.properties"),
        "quarkus.mongodb.metrics.enabled=true\n\
         quarkus.mongodb.devservices.image-name=mongo:6.0\n\
         quarkus.mongodb.devservices.port=27018\n\
         quarkus.http.port=8080\n",
    )
    .expect("write properties");
    fs::write(
        temp.path().join(".env"),
        "QUARKUS_MONGODB_DEVSERVICES_STARTUP_TIMEOUT=PT2M\n",
    )
    .expect("write dotenv");

    let mut options = LayeredSourceOptions::new(temp.path()).strict(true);
    options.user_config_path = None;
    let env: HashMap<&str, &str> = HashMap::from([
        ("QUARKUS_MONGODB_DEVSERVICES_PORT", "27019"),
        ("QUARKUS_MONGODB_DEVSERVICES_CONTAINER_ARGS", "--replSet,rs0"),
    ]);
    let options = options.with_env_vars(env);

    let config = MongoClientBuildTimeConfig::load_layered(options).expect("config");
    assert!(config.metrics_enabled);
    let devservices = config.devservices.expect("devservices");
    assert_eq!(devservices.image_name, "mongo:6.0");
    assert_eq!(devservices.port, Some(27019));
    assert_eq!(devservices.startup_timeout, Duration::from_secs(120));
    assert_eq!(
        devservices.container_args,
        vec!["--replSet".to_string(), "rs0".to_string()]
    );
}
