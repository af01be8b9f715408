//! End-to-end resolution of a schema declared as a JSON5 document.

use layerconf::config::{
    ConfigError, ConfigSchema, ConfigValue, LayeredSourceOptions, ValueOrigin, Violation,
};
use layerconf::render;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SCHEMA: &str = r#"{
    name: "cache",
    prefix: "app.cache",
    fields: [
        { key: "enabled", type: "bool", default: true },
        { key: "ttl", type: "duration", default: "10m" },
        { key: "endpoint", type: "string", description: "Cache server address" },
    ],
    groups: [{
        name: "local",
        toggle: { key: "enabled", default: false },
        fields: [{ key: "capacity", type: "integer", default: 1024 }],
    }],
}"#;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write");
}

fn options(cwd: &Path) -> LayeredSourceOptions {
    let mut options = LayeredSourceOptions::new(cwd)
        .with_env_vars(Vec::<(String, String)>::new())
        .strict(true);
    options.user_config_path = None;
    options
}

#[test]
fn document_schema_resolves_against_files() {
    let temp = TempDir::new().expect("tmp");
    let schema_path = temp.path().join("cache.schema.json5");
    write_file(&schema_path, SCHEMA);
    write_file(
        &temp.path().join("application.properties"),
        "app.cache.endpoint=redis://localhost:6379\napp.cache.local.enabled=on\n",
    );

    let schema = ConfigSchema::load_from_path(&schema_path).expect("schema");
    let layered = schema
        .load_layered_with_options(options(temp.path()).with_override("app.cache.ttl", "PT30S"))
        .expect("layered");
    let config = &layered.config;

    assert_eq!(
        config.string("endpoint").expect("endpoint"),
        "redis://localhost:6379"
    );
    assert!(config.is_group_enabled("local"));
    assert_eq!(config.get("local.capacity"), Some(&ConfigValue::Integer(1024)));
    assert_eq!(
        config.duration("ttl").expect("ttl"),
        std::time::Duration::from_secs(30)
    );
    assert_eq!(config.origin("enabled"), Some(&ValueOrigin::Layer {
        source: layerconf::config::LayerSource::Defaults,
        label: "defaults(cache)".to_string(),
    }));

    let explained = render::explain(&schema, config);
    assert!(explained.contains("app.cache.ttl"), "{explained}");
    assert!(explained.contains("= 30s  (overrides)"), "{explained}");
}

#[test]
fn missing_required_and_unknown_keys_are_reported_together() {
    let temp = TempDir::new().expect("tmp");
    write_file(
        &temp.path().join("application.properties"),
        "app.cache.ttl=forever\napp.cache.endpont=redis://typo\n",
    );
    let schema = ConfigSchema::load_from_str(SCHEMA).expect("schema");
    let err = schema
        .load_layered_with_options(options(temp.path()))
        .unwrap_err();
    let ConfigError::Resolution(report) = &err else {
        panic!("expected resolution error, got {err}");
    };
    assert_eq!(report.schema, "cache");
    let keys: Vec<&str> = report.violations.iter().map(Violation::key).collect();
    assert_eq!(keys, vec!["ttl", "endpoint", "app.cache.endpont"]);
}
