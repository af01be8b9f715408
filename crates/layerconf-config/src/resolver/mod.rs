//! Resolution of a schema against an ordered stack of layers.
//!
//! For every leaf key the highest-precedence layer providing a value wins,
//! then the schema default; otherwise the key is reported missing. Group
//! toggles are resolved before their children, and a disabled group's
//! children are skipped entirely. Every violation is collected before the
//! resolver fails, so one run reports all problems.


use crate::error::{ResolutionReport, Violation};
use crate::layer::{Layer, LayerSource};
use crate::schema::{ConfigSchema, FieldSpec, SchemaGroup};
use crate::value::{ConfigValue, FieldType};
use crate::ConfigError;
use log::{debug, info, warn};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueOrigin {
    /// Supplied by a layer.
    Layer { source: LayerSource, label: String },
    /// Fell back to the schema's declared default.
    SchemaDefault,
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueOrigin::Layer { label, .. } => f.write_str(label),
            ValueOrigin::SchemaDefault => f.write_str("schema default"),
        }
    }
}

/// A typed value together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: ConfigValue,
    pub origin: ValueOrigin,
}

/// Immutable result of resolving a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    schema: String,
    values: BTreeMap<String, ResolvedValue>,
    groups: BTreeMap<String, bool>,
}

impl ResolvedConfig {
    /// Name of the schema this config was resolved from.
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key).map(|resolved| &resolved.value)
    }

    pub fn origin(&self, key: &str) -> Option<&ValueOrigin> {
        self.values.get(key).map(|resolved| &resolved.origin)
    }

    /// Whether the group at `path` is present; the root and untoggled groups
    /// under a present parent are always present.
    pub fn is_group_enabled(&self, path: &str) -> bool {
        path.is_empty() || self.groups.get(path).copied().unwrap_or(false)
    }

    /// Resolved values by relative key, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.values
            .iter()
            .map(|(key, resolved)| (key.as_str(), resolved))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.require(key, FieldType::Bool)?;
        value
            .as_bool()
            .ok_or_else(|| self.type_mismatch(key, FieldType::Bool, value))
    }

    pub fn string(&self, key: &str) -> Result<&str, ConfigError> {
        let value = self.require(key, FieldType::String)?;
        value
            .as_str()
            .ok_or_else(|| self.type_mismatch(key, FieldType::String, value))
    }

    pub fn integer(&self, key: &str) -> Result<i64, ConfigError> {
        let value = self.require(key, FieldType::Integer)?;
        value
            .as_i64()
            .ok_or_else(|| self.type_mismatch(key, FieldType::Integer, value))
    }

    pub fn duration(&self, key: &str) -> Result<Duration, ConfigError> {
        let value = self.require(key, FieldType::Duration)?;
        value
            .as_duration()
            .ok_or_else(|| self.type_mismatch(key, FieldType::Duration, value))
    }

    pub fn list(&self, key: &str) -> Result<&[String], ConfigError> {
        let value = self.require(key, FieldType::List)?;
        value
            .as_list()
            .ok_or_else(|| self.type_mismatch(key, FieldType::List, value))
    }

    /// Nested JSON tree mirroring the dotted keys.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for (key, resolved) in &self.values {
            insert_path(&mut root, key, resolved.value.to_json());
        }
        Value::Object(root)
    }

    fn require(&self, key: &str, expected: FieldType) -> Result<&ConfigValue, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::InvalidField {
            path: format!("{}:{key}", self.schema),
            message: format!("no resolved {expected} value"),
        })
    }

    fn type_mismatch(&self, key: &str, expected: FieldType, found: &ConfigValue) -> ConfigError {
        ConfigError::InvalidField {
            path: format!("{}:{key}", self.schema),
            message: format!("expected {expected}, found {}", found.field_type()),
        }
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Insert `value` under a dotted key, creating intermediate objects.
fn insert_path(root: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            root.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let child = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Resolves a schema against layers; strict mode also rejects undeclared keys.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    schema: &'a ConfigSchema,
    strict: bool,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(schema: &'a ConfigSchema) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    /// Report keys under the schema namespace that the schema does not declare.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Resolve every field; later layers take precedence over earlier ones.
    pub fn resolve(&self, layers: &[Layer]) -> Result<ResolvedConfig, ConfigError> {
        debug!(
            "resolving schema {} (layers={}, strict={})",
            self.schema.name(),
            layers.len(),
            self.strict
        );
        let mut state = ResolveState::default();
        self.resolve_group(self.schema.root(), layers, &mut state);
        self.check_unknown_keys(layers, &mut state.violations);

        if !state.violations.is_empty() {
            warn!(
                "resolution of {} failed (violations={})",
                self.schema.name(),
                state.violations.len()
            );
            return Err(ConfigError::Resolution(ResolutionReport {
                schema: self.schema.name().to_string(),
                prefix: self.schema.prefix().map(str::to_string),
                violations: state.violations,
            }));
        }

        info!(
            "resolved {} (values={}, layers={})",
            self.schema.name(),
            state.values.len(),
            layers.len()
        );
        Ok(ResolvedConfig {
            schema: self.schema.name().to_string(),
            values: state.values,
            groups: state.groups,
        })
    }

    fn resolve_group(&self, group: &SchemaGroup, layers: &[Layer], state: &mut ResolveState) {
        if let Some(toggle) = group.toggle() {
            match self.resolve_field(toggle, layers, state) {
                Some(ConfigValue::Bool(true)) => {
                    state.groups.insert(group.path().to_string(), true);
                }
                Some(_) => {
                    debug!("group {} disabled; skipping its fields", group.path());
                    state.groups.insert(group.path().to_string(), false);
                    return;
                }
                None => return,
            }
        } else if !group.path().is_empty() {
            state.groups.insert(group.path().to_string(), true);
        }
        for field in group.fields() {
            self.resolve_field(field, layers, state);
        }
        for child in group.groups() {
            self.resolve_group(child, layers, state);
        }
    }

    /// Resolve one leaf, recording either its value or a violation.
    fn resolve_field(
        &self,
        field: &FieldSpec,
        layers: &[Layer],
        state: &mut ResolveState,
    ) -> Option<ConfigValue> {
        let qualified = self.schema.qualify(field.key());
        let supplied = layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(&qualified).map(|raw| (layer, raw)));

        let resolved = match supplied {
            Some((layer, raw)) => match field.field_type().coerce(raw) {
                Some(value) => ResolvedValue {
                    value,
                    origin: ValueOrigin::Layer {
                        source: layer.source(),
                        label: layer.label().to_string(),
                    },
                },
                None => {
                    state.violations.push(Violation::TypeCoercionFailure {
                        key: field.key().to_string(),
                        raw: raw.to_string(),
                        expected: field.field_type(),
                    });
                    return None;
                }
            },
            None => match field.default_value() {
                Some(value) => ResolvedValue {
                    value,
                    origin: ValueOrigin::SchemaDefault,
                },
                None => {
                    state.violations.push(Violation::MissingRequiredValue {
                        key: field.key().to_string(),
                    });
                    return None;
                }
            },
        };

        let value = resolved.value.clone();
        state.values.insert(field.key().to_string(), resolved);
        Some(value)
    }

    fn check_unknown_keys(&self, layers: &[Layer], violations: &mut Vec<Violation>) {
        for layer in layers {
            for (key, _) in layer.entries() {
                let Some(relative) = self.schema.relative_key(key) else {
                    continue;
                };
                if self.schema.contains(relative) {
                    continue;
                }
                if self.strict {
                    violations.push(Violation::UnknownKey {
                        key: key.to_string(),
                        layer: layer.label().to_string(),
                    });
                } else {
                    warn!("ignoring unrecognized key {} (layer={})", key, layer.label());
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct ResolveState {
    values: BTreeMap<String, ResolvedValue>,
    groups: BTreeMap<String, bool>,
    violations: Vec<Violation>,
}

/// Resolve `schema` against `layers` in non-strict mode.
pub fn resolve(schema: &ConfigSchema, layers: &[Layer]) -> Result<ResolvedConfig, ConfigError> {
    ConfigResolver::new(schema).resolve(layers)
}
