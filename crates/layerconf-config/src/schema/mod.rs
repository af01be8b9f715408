//! Declarative configuration schemas.
//!
//! A schema is plain data: typed leaf fields addressed by dotted keys, plus
//! optional groups whose presence is decided by a single boolean toggle.
//! Schemas are declared in code through [`ConfigSchema::builder`] or loaded
//! from a JSON5 document, and are validated once when built.

mod document;

#[cfg(test)]
mod tests;

use crate::value::{ConfigValue, FieldType};
use crate::ConfigError;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Default declared for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDefault {
    /// A raw value coerced like any layer value.
    Raw(String),
    /// The type's zero value, opted into explicitly.
    Zero,
}

/// A single typed leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    key: String,
    field_type: FieldType,
    default: Option<FieldDefault>,
    description: Option<String>,
}

impl FieldSpec {
    /// Declare a required field; add a default to make it optional.
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            default: None,
            description: None,
        }
    }

    pub fn bool(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Bool)
    }

    pub fn string(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::String)
    }

    pub fn integer(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Integer)
    }

    pub fn duration(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::Duration)
    }

    pub fn list(key: impl Into<String>) -> Self {
        Self::new(key, FieldType::List)
    }

    /// Declare a raw default, validated against the type when the schema is built.
    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(FieldDefault::Raw(raw.into()));
        self
    }

    /// Default to the type's zero value (`false`, `""`, `0`, `0s`, empty list).
    pub fn default_zero(mut self) -> Self {
        self.default = Some(FieldDefault::Zero);
        self
    }

    /// Attach a one-line description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Dotted key, relative to the schema prefix once built.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether resolution fails when no layer supplies this field.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// The typed default, if one is declared and coerces.
    pub fn default_value(&self) -> Option<ConfigValue> {
        match self.default.as_ref()? {
            FieldDefault::Raw(raw) => self.field_type.coerce(raw),
            FieldDefault::Zero => Some(self.field_type.zero_value()),
        }
    }

    /// The default as a raw layer string.
    pub(crate) fn default_raw(&self) -> Option<String> {
        match self.default.as_ref()? {
            FieldDefault::Raw(raw) => Some(raw.clone()),
            FieldDefault::Zero => Some(self.field_type.zero_value().to_string()),
        }
    }

    fn qualified(mut self, group_path: &str) -> Self {
        self.key = join_key(group_path, &self.key);
        self
    }
}

/// Group of fields declared under a common key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    name: String,
    description: Option<String>,
    toggle: Option<FieldSpec>,
    fields: Vec<FieldSpec>,
    groups: Vec<GroupSpec>,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            toggle: None,
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Boolean field, relative to the group, that decides whether the group is present.
    pub fn toggle(mut self, field: FieldSpec) -> Self {
        self.toggle = Some(field);
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    fn qualified(self, parent_path: &str) -> SchemaGroup {
        let path = join_key(parent_path, &self.name);
        SchemaGroup {
            description: self.description,
            toggle: self.toggle.map(|field| field.qualified(&path)),
            fields: self
                .fields
                .into_iter()
                .map(|field| field.qualified(&path))
                .collect(),
            groups: self
                .groups
                .into_iter()
                .map(|group| group.qualified(&path))
                .collect(),
            path,
        }
    }
}

/// A built group with fully qualified keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaGroup {
    path: String,
    description: Option<String>,
    toggle: Option<FieldSpec>,
    fields: Vec<FieldSpec>,
    groups: Vec<SchemaGroup>,
}

impl SchemaGroup {
    /// Dotted path of the group; empty for the schema root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn toggle(&self) -> Option<&FieldSpec> {
        self.toggle.as_ref()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn groups(&self) -> &[SchemaGroup] {
        &self.groups
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a FieldSpec>) {
        out.extend(self.toggle.iter());
        out.extend(self.fields.iter());
        for group in &self.groups {
            group.collect_fields(out);
        }
    }
}

/// A validated, immutable schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSchema {
    name: String,
    prefix: Option<String>,
    root: SchemaGroup,
    index: BTreeMap<String, FieldSpec>,
}

impl ConfigSchema {
    /// Start declaring a schema in code.
    pub fn builder(name: impl Into<String>) -> ConfigSchemaBuilder {
        ConfigSchemaBuilder::new(name)
    }

    /// Load a schema declared as a JSON5 document.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("loading schema from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a schema from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = json5::from_str(contents)?;
        document::builder_from_document(&value)?.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key prefix layers use to address this schema, e.g. `quarkus.mongodb`.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn root(&self) -> &SchemaGroup {
        &self.root
    }

    /// Every leaf field, toggles included, in declaration order.
    pub fn fields(&self) -> Vec<&FieldSpec> {
        let mut out = Vec::with_capacity(self.index.len());
        self.root.collect_fields(&mut out);
        out
    }

    /// Look up a leaf by its key relative to the prefix.
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.index.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Key as written in layers: the prefix joined with the relative key.
    pub fn qualify(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => join_key(prefix, key),
            None => key.to_string(),
        }
    }

    /// Relative key for a layer key, or `None` when it belongs to another namespace.
    pub fn relative_key<'a>(&self, layer_key: &'a str) -> Option<&'a str> {
        match &self.prefix {
            None => Some(layer_key),
            Some(prefix) => layer_key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .filter(|rest| !rest.is_empty()),
        }
    }

    /// Environment variable that overrides `key`: `quarkus.mongodb.health.enabled`
    /// maps to `QUARKUS_MONGODB_HEALTH_ENABLED`.
    pub fn env_var_name(&self, key: &str) -> String {
        self.qualify(key)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// Builder for declaring a [`ConfigSchema`] in code.
#[derive(Debug, Clone)]
pub struct ConfigSchemaBuilder {
    name: String,
    prefix: Option<String>,
    fields: Vec<FieldSpec>,
    groups: Vec<GroupSpec>,
}

impl ConfigSchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Qualify keys and validate the declaration.
    pub fn build(self) -> Result<ConfigSchema, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("schema name must not be empty".to_string()));
        }
        let label = self.name.clone();
        if let Some(prefix) = &self.prefix {
            validate_key(&label, prefix)?;
        }

        let root = SchemaGroup {
            path: String::new(),
            description: None,
            toggle: None,
            fields: self.fields,
            groups: self
                .groups
                .into_iter()
                .map(|group| group.qualified(""))
                .collect(),
        };

        let mut index = BTreeMap::new();
        validate_group(&label, &root, &mut index)?;
        for key in index.keys() {
            let mut ancestor = key.as_str();
            while let Some((parent, _)) = ancestor.rsplit_once('.') {
                if index.contains_key(parent) {
                    return Err(invalid_key(
                        &label,
                        key,
                        &format!("nested under leaf field '{parent}'"),
                    ));
                }
                ancestor = parent;
            }
        }

        let schema = ConfigSchema {
            name: self.name,
            prefix: self.prefix,
            root,
            index,
        };
        validate_env_names(&label, &schema)?;
        debug!("built schema {} (fields={})", label, schema.index.len());
        Ok(schema)
    }
}

/// Every field must own its environment variable name.
fn validate_env_names(label: &str, schema: &ConfigSchema) -> Result<(), ConfigError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    for field in schema.fields() {
        let env_name = schema.env_var_name(field.key());
        if let Some(other) = owners.insert(env_name, field.key()) {
            return Err(invalid_key(
                label,
                field.key(),
                &format!("environment name collides with '{other}'"),
            ));
        }
    }
    Ok(())
}

fn validate_group(
    label: &str,
    group: &SchemaGroup,
    index: &mut BTreeMap<String, FieldSpec>,
) -> Result<(), ConfigError> {
    if !group.path.is_empty() {
        validate_key(label, &group.path)?;
    }
    if let Some(toggle) = &group.toggle {
        if toggle.field_type != FieldType::Bool {
            return Err(invalid_key(label, &toggle.key, "group toggle must be bool"));
        }
    }
    for field in group.toggle.iter().chain(group.fields.iter()) {
        validate_key(label, &field.key)?;
        if let Some(FieldDefault::Raw(raw)) = &field.default {
            if field.field_type.coerce(raw).is_none() {
                return Err(invalid_key(
                    label,
                    &field.key,
                    &format!("default {raw:?} is not a valid {}", field.field_type),
                ));
            }
        }
        if index.insert(field.key.clone(), field.clone()).is_some() {
            return Err(invalid_key(label, &field.key, "duplicate key"));
        }
    }
    for child in &group.groups {
        validate_group(label, child, index)?;
    }
    Ok(())
}

/// Keys are dot-separated, non-empty segments of `[a-z0-9_-]`.
fn validate_key(label: &str, key: &str) -> Result<(), ConfigError> {
    let valid = !key.is_empty()
        && key.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(invalid_key(label, key, "invalid key"))
    }
}

fn invalid_key(label: &str, key: &str, message: &str) -> ConfigError {
    let key = if key.is_empty() { "root" } else { key };
    ConfigError::InvalidField {
        path: format!("{label}:{key}"),
        message: message.to_string(),
    }
}

/// Join dotted paths, skipping an empty prefix.
pub(crate) fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
