//! Flattening of nested JSON documents into dotted keys.

use crate::schema::join_key;
use crate::value::raw_from_json;
use crate::ConfigError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flatten nested objects into `a.b.c` keys; arrays of scalars join with `,`.
///
/// Nulls are treated as unset and skipped.
pub(super) fn flatten_json(
    value: &Value,
    label: &str,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut out = BTreeMap::new();
    match value {
        Value::Object(_) => flatten_into(&mut out, "", value, label)?,
        _ => {
            return Err(ConfigError::InvalidField {
                path: format!("{label}:root"),
                message: "expected object".to_string(),
            });
        }
    }
    Ok(out)
}

fn flatten_into(
    out: &mut BTreeMap<String, String>,
    prefix: &str,
    value: &Value,
    label: &str,
) -> Result<(), ConfigError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(out, &join_key(prefix, key), child, label)?;
            }
        }
        Value::Null => {}
        other => {
            let raw = raw_from_json(other).ok_or_else(|| ConfigError::InvalidField {
                path: format!("{label}:{prefix}"),
                message: "expected scalar or array of scalars".to_string(),
            })?;
            out.insert(prefix.to_string(), raw);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_objects_become_dotted_keys() {
        let value = json!({
            "quarkus": {
                "mongodb": {
                    "health": { "enabled": false },
                    "devservices": { "port": 27018, "container-args": ["--quiet", "--nojournal"] },
                    "tracing.enabled": true,
                    "unset": null,
                }
            }
        });
        let flat = flatten_json(&value, "file").expect("flatten");
        let entries: Vec<(&str, &str)> = flat
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("quarkus.mongodb.devservices.container-args", "--quiet,--nojournal"),
                ("quarkus.mongodb.devservices.port", "27018"),
                ("quarkus.mongodb.health.enabled", "false"),
                ("quarkus.mongodb.tracing.enabled", "true"),
            ]
        );
    }

    #[test]
    fn rejects_arrays_of_objects() {
        let value = json!({ "hosts": [{ "name": "a" }] });
        let err = flatten_json(&value, "file").unwrap_err();
        assert!(format!("{err}").contains("file:hosts"));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = flatten_json(&json!([1, 2]), "file").unwrap_err();
        assert!(format!("{err}").contains("expected object"));
    }
}
