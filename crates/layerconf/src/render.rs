//! Plain-text rendering of schemas and resolved configs.

use layerconf_config::{ConfigSchema, FieldDefault, FieldSpec, ResolvedConfig};
use std::fmt::{self, Write};

/// One block per field: qualified key, type, default, env var, description.
pub fn describe(schema: &ConfigSchema) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_describe(&mut out, schema);
    out
}

fn write_describe(out: &mut String, schema: &ConfigSchema) -> fmt::Result {
    writeln!(out, "# {}", schema.name())?;
    for field in schema.fields() {
        writeln!(out)?;
        writeln!(out, "{}", schema.qualify(field.key()))?;
        writeln!(out, "  type:    {}", field.field_type())?;
        writeln!(out, "  default: {}", default_label(field))?;
        writeln!(out, "  env:     {}", schema.env_var_name(field.key()))?;
        if let Some(description) = field.description() {
            writeln!(out, "  {description}")?;
        }
    }
    Ok(())
}

fn default_label(field: &FieldSpec) -> String {
    match field.default() {
        None => "(required)".to_string(),
        Some(FieldDefault::Zero) => format!("{} (zero)", field.field_type().zero_value()),
        Some(FieldDefault::Raw(raw)) => raw.clone(),
    }
}

/// One `key = value  (origin)` line per resolved value.
pub fn explain(schema: &ConfigSchema, config: &ResolvedConfig) -> String {
    let rows: Vec<(String, String, String)> = config
        .iter()
        .map(|(key, resolved)| {
            (
                schema.qualify(key),
                resolved.value.to_string(),
                resolved.origin.to_string(),
            )
        })
        .collect();
    let width = rows.iter().map(|(key, _, _)| key.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value, origin)| format!("{key:<width$} = {value}  ({origin})\n"))
        .collect()
}
