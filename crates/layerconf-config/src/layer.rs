//! Raw key/value layers fed to the resolver.

use crate::ConfigSchema;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Origin kind of a layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerSource {
    /// Defaults declared by the schema.
    Defaults,
    /// A `.properties` or JSON5 file.
    File,
    /// A `.env` file.
    DotEnv,
    /// Process environment variables.
    Environment,
    /// Runtime overrides (highest precedence).
    Runtime,
}

impl LayerSource {
    pub fn name(self) -> &'static str {
        match self {
            LayerSource::Defaults => "defaults",
            LayerSource::File => "file",
            LayerSource::DotEnv => "dotenv",
            LayerSource::Environment => "env",
            LayerSource::Runtime => "runtime",
        }
    }
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One ordered source of raw configuration values, keyed by dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    source: LayerSource,
    label: String,
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl Layer {
    /// Create an empty layer.
    pub fn new(source: LayerSource, label: impl Into<String>) -> Self {
        Self {
            source,
            label: label.into(),
            path: None,
            entries: BTreeMap::new(),
        }
    }

    /// Build an in-memory layer from key/value pairs.
    pub fn from_pairs<K, V>(
        source: LayerSource,
        label: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut layer = Self::new(source, label);
        for (key, value) in pairs {
            layer.entries.insert(key.into(), value.into());
        }
        layer
    }

    /// The schema's declared defaults as a layer, keyed as layers address them.
    pub fn defaults(schema: &ConfigSchema) -> Self {
        let entries = schema
            .fields()
            .into_iter()
            .filter_map(|field| {
                field
                    .default_raw()
                    .map(|raw| (schema.qualify(field.key()), raw))
            })
            .collect();
        Self {
            source: LayerSource::Defaults,
            label: format!("defaults({})", schema.name()),
            path: None,
            entries,
        }
    }

    /// Map environment variables onto schema keys.
    ///
    /// Only variables named after a declared key are taken, see
    /// [`ConfigSchema::env_var_name`].
    pub fn from_env<K, V>(schema: &ConfigSchema, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let mut layer = Self::new(LayerSource::Environment, "env");
        layer.entries = map_env_vars(schema, &vars);
        layer
    }

    /// Snapshot the process environment for `schema`.
    pub fn from_process_env(schema: &ConfigSchema) -> Self {
        Self::from_env(schema, std::env::vars())
    }

    /// Record the file this layer was read from.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set a single entry, replacing any previous value.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn source(&self) -> LayerSource {
        self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn from_mapped(
        source: LayerSource,
        label: String,
        path: Option<PathBuf>,
        entries: BTreeMap<String, String>,
    ) -> Self {
        Self {
            source,
            label,
            path,
            entries,
        }
    }
}

/// Pick out the variables that name a schema key, keyed by qualified key.
pub(crate) fn map_env_vars(
    schema: &ConfigSchema,
    vars: &HashMap<String, String>,
) -> BTreeMap<String, String> {
    schema
        .fields()
        .into_iter()
        .filter_map(|field| {
            vars.get(&schema.env_var_name(field.key()))
                .map(|value| (schema.qualify(field.key()), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSpec, GroupSpec};
    use pretty_assertions::assert_eq;

    fn schema() -> ConfigSchema {
        ConfigSchema::builder("mongodb")
            .prefix("quarkus.mongodb")
            .field(FieldSpec::bool("health.enabled").with_default("true"))
            .field(FieldSpec::string("connection-string"))
            .group(
                GroupSpec::new("devservices")
                    .toggle(FieldSpec::bool("enabled").with_default("true"))
                    .field(FieldSpec::integer("port").default_zero()),
            )
            .build()
            .expect("schema")
    }

    #[test]
    fn defaults_layer_skips_required_fields() {
        let layer = Layer::defaults(&schema());
        assert_eq!(layer.source(), LayerSource::Defaults);
        assert_eq!(layer.get("quarkus.mongodb.health.enabled"), Some("true"));
        assert_eq!(layer.get("quarkus.mongodb.devservices.port"), Some("0"));
        assert_eq!(layer.get("quarkus.mongodb.connection-string"), None);
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn env_layer_maps_only_declared_keys() {
        let layer = Layer::from_env(
            &schema(),
            [
                ("QUARKUS_MONGODB_HEALTH_ENABLED", "false"),
                ("QUARKUS_MONGODB_DEVSERVICES_PORT", "27018"),
                ("QUARKUS_MONGODB_NOT_A_KEY", "x"),
                ("PATH", "/usr/bin"),
            ],
        );
        let entries: Vec<(&str, &str)> = layer.entries().collect();
        assert_eq!(
            entries,
            vec![
                ("quarkus.mongodb.devservices.port", "27018"),
                ("quarkus.mongodb.health.enabled", "false"),
            ]
        );
    }

    #[test]
    fn later_entries_replace_earlier_ones() {
        let layer = Layer::from_pairs(LayerSource::Runtime, "cli", [("a", "1"), ("a", "2")])
            .with_entry("b", "3");
        assert_eq!(layer.get("a"), Some("2"));
        assert_eq!(layer.get("b"), Some("3"));
    }
}
