//! Tests for schema declaration and validation.

use super::*;
use crate::Layer;
use pretty_assertions::assert_eq;

fn client_schema() -> ConfigSchema {
    ConfigSchema::builder("mongodb")
        .prefix("quarkus.mongodb")
        .field(FieldSpec::bool("health.enabled").with_default("true"))
        .field(FieldSpec::bool("metrics.enabled").default_zero())
        .group(
            GroupSpec::new("devservices")
                .toggle(FieldSpec::bool("enabled").with_default("true"))
                .field(FieldSpec::integer("port").default_zero())
                .field(FieldSpec::string("image-name").with_default("mongo:7.0")),
        )
        .build()
        .expect("schema")
}

#[test]
fn group_keys_are_qualified() {
    let schema = client_schema();
    let keys: Vec<&str> = schema.fields().iter().map(|field| field.key()).collect();
    assert_eq!(
        keys,
        vec![
            "health.enabled",
            "metrics.enabled",
            "devservices.enabled",
            "devservices.port",
            "devservices.image-name",
        ]
    );
    let group = &schema.root().groups()[0];
    assert_eq!(group.path(), "devservices");
    assert_eq!(group.toggle().map(FieldSpec::key), Some("devservices.enabled"));
}

#[test]
fn zero_default_is_explicit() {
    let schema = client_schema();
    let metrics = schema.field("metrics.enabled").expect("field");
    assert_eq!(metrics.default(), Some(&FieldDefault::Zero));
    assert_eq!(metrics.default_value(), Some(ConfigValue::Bool(false)));
    assert!(!metrics.is_required());

    let required = FieldSpec::string("connection-string");
    assert!(required.is_required());
    assert_eq!(required.default_value(), None);
}

#[test]
fn prefix_addressing_and_env_names() {
    let schema = client_schema();
    assert_eq!(
        schema.qualify("health.enabled"),
        "quarkus.mongodb.health.enabled"
    );
    assert_eq!(
        schema.relative_key("quarkus.mongodb.devservices.port"),
        Some("devservices.port")
    );
    assert_eq!(schema.relative_key("quarkus.mongodbx.port"), None);
    assert_eq!(schema.relative_key("quarkus.http.port"), None);
    assert_eq!(schema.relative_key("quarkus.mongodb"), None);
    assert_eq!(
        schema.env_var_name("devservices.image-name"),
        "QUARKUS_MONGODB_DEVSERVICES_IMAGE_NAME"
    );
}

#[test]
fn rejects_default_that_does_not_coerce() {
    let err = ConfigSchema::builder("app")
        .field(FieldSpec::bool("health.enabled").with_default("sometimes"))
        .build()
        .unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("app:health.enabled"), "{msg}");
    assert!(msg.contains("not a valid bool"), "{msg}");
}

#[test]
fn rejects_duplicate_keys() {
    let err = ConfigSchema::builder("app")
        .field(FieldSpec::bool("devservices.enabled").default_zero())
        .group(GroupSpec::new("devservices").toggle(FieldSpec::bool("enabled").default_zero()))
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("duplicate key"));
}

#[test]
fn rejects_keys_sharing_an_environment_name() {
    let err = ConfigSchema::builder("app")
        .field(FieldSpec::bool("health.enabled").default_zero())
        .field(FieldSpec::string("health-enabled").default_zero())
        .build()
        .unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("app:health-enabled"), "{msg}");
    assert!(
        msg.contains("environment name collides with 'health.enabled'"),
        "{msg}"
    );

    let schema = ConfigSchema::builder("app")
        .field(FieldSpec::bool("health.enabled").default_zero())
        .field(FieldSpec::bool("health.enabled_").default_zero())
        .build()
        .expect("distinct environment names");
    let layer = Layer::from_env(&schema, [("HEALTH_ENABLED", "true")]);
    assert_eq!(
        layer.entries().collect::<Vec<_>>(),
        vec![("health.enabled", "true")]
    );
}

#[test]
fn rejects_non_bool_toggle() {
    let err = ConfigSchema::builder("app")
        .group(GroupSpec::new("devservices").toggle(FieldSpec::string("enabled")))
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("group toggle must be bool"));
}

#[test]
fn rejects_invalid_keys() {
    for key in ["", "Health.enabled", "health..enabled", "health enabled"] {
        let result = ConfigSchema::builder("app")
            .field(FieldSpec::bool(key).default_zero())
            .build();
        assert!(result.is_err(), "key {key:?} should be rejected");
    }
}

#[test]
fn rejects_leaf_with_children() {
    let err = ConfigSchema::builder("app")
        .field(FieldSpec::bool("tracing").default_zero())
        .field(FieldSpec::bool("tracing.enabled").default_zero())
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("nested under leaf field 'tracing'"));
}

#[test]
fn loads_schema_document() {
    let json5 = r#"{
        name: "mongodb",
        prefix: "quarkus.mongodb",
        fields: [
            { key: "health.enabled", type: "bool", default: true, description: "Publish a health check" },
            { key: "metrics.enabled", type: "bool", zero_default: true },
        ],
        groups: [{
            name: "devservices",
            toggle: { key: "enabled", default: true },
            fields: [
                { key: "startup-timeout", type: "duration", default: "60s" },
                { key: "container-args", type: "list", default: ["--quiet", "--nojournal"] },
            ],
        }],
    }"#;
    let schema = ConfigSchema::load_from_str(json5).expect("schema");
    assert_eq!(schema.name(), "mongodb");
    assert_eq!(schema.prefix(), Some("quarkus.mongodb"));

    let health = schema.field("health.enabled").expect("health");
    assert_eq!(health.default(), Some(&FieldDefault::Raw("true".to_string())));
    assert_eq!(health.description(), Some("Publish a health check"));

    let toggle = schema.field("devservices.enabled").expect("toggle");
    assert_eq!(toggle.field_type(), FieldType::Bool);

    let args = schema.field("devservices.container-args").expect("args");
    assert_eq!(
        args.default_value(),
        Some(ConfigValue::List(vec![
            "--quiet".to_string(),
            "--nojournal".to_string()
        ]))
    );
}

#[test]
fn schema_document_rejects_unknown_members() {
    let json5 = r#"{ name: "app", fields: [{ key: "a", type: "bool", defualt: true }] }"#;
    let err = ConfigSchema::load_from_str(json5).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("schema:fields[0].defualt"), "{msg}");
    assert!(msg.contains("unknown key"), "{msg}");
}

#[test]
fn schema_document_errors_name_nested_paths() {
    let json5 = r#"{
        name: "app",
        groups: [{ name: "pool", toggle: { key: "enabled", default: "yes", size: 1 } }],
    }"#;
    let err = ConfigSchema::load_from_str(json5).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("schema:groups[0].toggle.size"), "{msg}");

    let err = ConfigSchema::load_from_str(r#"{ prefix: "app" }"#).unwrap_err();
    assert!(format!("{err}").contains("schema:name"), "{err}");
}

#[test]
fn schema_document_rejects_unknown_type() {
    let json5 = r#"{ name: "app", fields: [{ key: "a", type: "float" }] }"#;
    let err = ConfigSchema::load_from_str(json5).unwrap_err();
    assert!(format!("{err}").contains("unknown type 'float'"));
}

#[test]
fn schema_document_rejects_conflicting_defaults() {
    let json5 = r#"{ name: "app", fields: [{ key: "a", type: "bool", default: false, zero_default: true }] }"#;
    let err = ConfigSchema::load_from_str(json5).unwrap_err();
    assert!(format!("{err}").contains("mutually exclusive"));
}
