//! Schema declarations written as JSON5 documents.
//!
//! ```json5
//! {
//!   name: "mongodb",
//!   prefix: "quarkus.mongodb",
//!   fields: [{ key: "health.enabled", type: "bool", default: true }],
//!   groups: [{
//!     name: "devservices",
//!     toggle: { key: "enabled", default: true },
//!     fields: [{ key: "port", type: "integer", zero_default: true }],
//!   }],
//! }
//! ```

use super::{join_key, ConfigSchemaBuilder, FieldSpec, GroupSpec};
use crate::value::{raw_from_json, FieldType};
use crate::ConfigError;
use serde_json::{Map, Value};

const LABEL: &str = "schema";

/// Validate a schema document and turn it into a builder.
pub(super) fn builder_from_document(value: &Value) -> Result<ConfigSchemaBuilder, ConfigError> {
    let map = expect_object(value, "")?;
    ensure_allowed_keys(map, &["$schema", "name", "prefix", "fields", "groups"], "")?;

    let name = required_string(map, "", "name")?;
    let mut builder = ConfigSchemaBuilder::new(name);
    if let Some(value) = map.get("prefix") {
        builder = builder.prefix(expect_string(value, "prefix")?);
    }
    for field in fields_from(map, "")? {
        builder = builder.field(field);
    }
    for group in groups_from(map, "")? {
        builder = builder.group(group);
    }
    Ok(builder)
}

/// Parse the optional "fields" array of an object.
fn fields_from(map: &Map<String, Value>, path: &str) -> Result<Vec<FieldSpec>, ConfigError> {
    let Some(value) = map.get("fields") else {
        return Ok(Vec::new());
    };
    let fields_path = join_key(path, "fields");
    expect_array(value, &fields_path)?
        .iter()
        .enumerate()
        .map(|(idx, entry)| field_from(entry, &format!("{fields_path}[{idx}]"), None))
        .collect()
}

/// Parse the optional "groups" array of an object.
fn groups_from(map: &Map<String, Value>, path: &str) -> Result<Vec<GroupSpec>, ConfigError> {
    let Some(value) = map.get("groups") else {
        return Ok(Vec::new());
    };
    let groups_path = join_key(path, "groups");
    expect_array(value, &groups_path)?
        .iter()
        .enumerate()
        .map(|(idx, entry)| group_from(entry, &format!("{groups_path}[{idx}]")))
        .collect()
}

/// Parse a single group declaration.
fn group_from(value: &Value, path: &str) -> Result<GroupSpec, ConfigError> {
    let map = expect_object(value, path)?;
    ensure_allowed_keys(
        map,
        &["name", "description", "toggle", "fields", "groups"],
        path,
    )?;

    let mut group = GroupSpec::new(required_string(map, path, "name")?);
    if let Some(value) = map.get("description") {
        group = group.describe(expect_string(value, &join_key(path, "description"))?);
    }
    if let Some(value) = map.get("toggle") {
        let toggle = field_from(value, &join_key(path, "toggle"), Some(FieldType::Bool))?;
        group = group.toggle(toggle);
    }
    for field in fields_from(map, path)? {
        group = group.field(field);
    }
    for child in groups_from(map, path)? {
        group = group.group(child);
    }
    Ok(group)
}

/// Parse a single field declaration; toggles may omit "type".
fn field_from(
    value: &Value,
    path: &str,
    implied_type: Option<FieldType>,
) -> Result<FieldSpec, ConfigError> {
    let map = expect_object(value, path)?;
    ensure_allowed_keys(
        map,
        &["key", "type", "default", "zero_default", "description"],
        path,
    )?;

    let key = required_string(map, path, "key")?;
    let type_path = join_key(path, "type");
    let field_type = match (map.get("type"), implied_type) {
        (Some(value), _) => {
            let name = expect_string(value, &type_path)?;
            FieldType::from_name(&name)
                .ok_or_else(|| invalid_field(&type_path, &format!("unknown type '{name}'")))?
        }
        (None, Some(implied)) => implied,
        (None, None) => return Err(invalid_field(&type_path, "missing required field")),
    };

    let mut field = FieldSpec::new(key, field_type);
    let zero_default = match map.get("zero_default") {
        Some(value) => expect_bool(value, &join_key(path, "zero_default"))?,
        None => false,
    };
    match (map.get("default"), zero_default) {
        (Some(_), true) => {
            return Err(invalid_field(
                path,
                "default and zero_default are mutually exclusive",
            ));
        }
        (Some(value), false) => {
            let default_path = join_key(path, "default");
            let raw = raw_from_json(value)
                .ok_or_else(|| invalid_field(&default_path, "expected scalar or array"))?;
            field = field.with_default(raw);
        }
        (None, true) => field = field.default_zero(),
        (None, false) => {}
    }
    if let Some(value) = map.get("description") {
        field = field.describe(expect_string(value, &join_key(path, "description"))?);
    }
    Ok(field)
}

/// Fetch a required string member.
fn required_string(
    map: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<String, ConfigError> {
    let member_path = join_key(path, key);
    let value = map
        .get(key)
        .ok_or_else(|| invalid_field(&member_path, "missing required field"))?;
    expect_string(value, &member_path)
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(path, "expected object")),
    }
}

/// Expect a JSON array or return a typed error.
fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ConfigError> {
    match value {
        Value::Array(arr) => Ok(arr),
        _ => Err(invalid_field(path, "expected array")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, path: &str) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_field(path, "expected string"))
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, path: &str) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| invalid_field(path, "expected bool"))
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(&join_key(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Build a structured invalid-field error.
fn invalid_field(path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{LABEL}:{normalized_path}"),
        message: message.to_string(),
    }
}
