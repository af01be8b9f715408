//! Field types, typed values, and raw-string coercion.

use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Primitive type declared for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Boolean flag.
    Bool,
    /// Free-form string, taken verbatim.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Time span.
    Duration,
    /// Comma-separated list of strings.
    List,
}

impl FieldType {
    /// Stable lowercase name used in reports and schema documents.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Duration => "duration",
            FieldType::List => "list",
        }
    }

    /// Parse a type name as written in schema documents.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" | "boolean" => Some(FieldType::Bool),
            "string" => Some(FieldType::String),
            "integer" | "int" => Some(FieldType::Integer),
            "duration" => Some(FieldType::Duration),
            "list" => Some(FieldType::List),
            _ => None,
        }
    }

    /// Coerce a raw layer value to this type, or `None` when it does not parse.
    pub fn coerce(self, raw: &str) -> Option<ConfigValue> {
        match self {
            FieldType::Bool => parse_bool(raw).map(ConfigValue::Bool),
            FieldType::String => Some(ConfigValue::String(raw.to_string())),
            FieldType::Integer => raw.trim().parse::<i64>().ok().map(ConfigValue::Integer),
            FieldType::Duration => parse_duration(raw).map(ConfigValue::Duration),
            FieldType::List => Some(ConfigValue::List(parse_list(raw))),
        }
    }

    /// The zero value for this type.
    pub fn zero_value(self) -> ConfigValue {
        match self {
            FieldType::Bool => ConfigValue::Bool(false),
            FieldType::String => ConfigValue::String(String::new()),
            FieldType::Integer => ConfigValue::Integer(0),
            FieldType::Duration => ConfigValue::Duration(Duration::ZERO),
            FieldType::List => ConfigValue::List(Vec::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved, typed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    String(String),
    Integer(i64),
    Duration(Duration),
    List(Vec<String>),
}

impl ConfigValue {
    /// The declared type this value belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            ConfigValue::Bool(_) => FieldType::Bool,
            ConfigValue::String(_) => FieldType::String,
            ConfigValue::Integer(_) => FieldType::Integer,
            ConfigValue::Duration(_) => FieldType::Duration,
            ConfigValue::List(_) => FieldType::List,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            ConfigValue::Duration(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::List(value) => Some(value),
            _ => None,
        }
    }

    /// Render as JSON; durations become their canonical string form.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Bool(value) => Value::Bool(*value),
            ConfigValue::String(value) => Value::String(value.clone()),
            ConfigValue::Integer(value) => Value::from(*value),
            ConfigValue::Duration(value) => Value::String(format_duration(*value)),
            ConfigValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(value) => write!(f, "{value}"),
            ConfigValue::String(value) => f.write_str(value),
            ConfigValue::Integer(value) => write!(f, "{value}"),
            ConfigValue::Duration(value) => f.write_str(&format_duration(*value)),
            ConfigValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render a JSON scalar (or array of scalars) as a raw layer string.
///
/// Objects and nulls have no raw form and yield `None`.
pub(crate) fn raw_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value.clone()),
        Value::Bool(value) => Some(value.to_string()),
        Value::Number(value) => Some(value.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => None,
                other => raw_from_json(other),
            })
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join(",")),
        Value::Null | Value::Object(_) => None,
    }
}

/// Parse `30`, `250ms`, `5m`, `1h`, `2d`, or ISO-8601 `PT1H30M` / `P1DT2H`.
pub(crate) fn parse_duration(raw: &str) -> Option<Duration> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with(['P', 'p']) {
        return parse_iso_duration(&trimmed[1..]);
    }
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .filter(|idx| *idx > 0)?;
    let (amount, unit) = trimmed.split_at(split);
    let amount: u64 = amount.parse().ok()?;
    let duration = match unit.to_ascii_lowercase().as_str() {
        "ms" => Duration::from_millis(amount),
        "s" => Duration::from_secs(amount),
        "m" => Duration::from_secs(amount.checked_mul(60)?),
        "h" => Duration::from_secs(amount.checked_mul(3_600)?),
        "d" => Duration::from_secs(amount.checked_mul(86_400)?),
        _ => return None,
    };
    Some(duration)
}

fn parse_iso_duration(body: &str) -> Option<Duration> {
    let upper = body.to_ascii_uppercase();
    let (date_part, time_part) = match upper.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (upper.as_str(), None),
    };
    if date_part.is_empty() && time_part.is_none_or(str::is_empty) {
        return None;
    }

    let mut total_millis: u64 = 0;
    for (amount, unit) in iso_components(date_part)? {
        let millis = match unit {
            'D' => amount.checked_mul(86_400_000)?,
            _ => return None,
        };
        total_millis = total_millis.checked_add(millis)?;
    }
    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return None;
        }
        for (amount, unit) in iso_components(time_part)? {
            let millis = match unit {
                'H' => amount.checked_mul(3_600_000)?,
                'M' => amount.checked_mul(60_000)?,
                'S' => amount.checked_mul(1_000)?,
                _ => return None,
            };
            total_millis = total_millis.checked_add(millis)?;
        }
    }
    Some(Duration::from_millis(total_millis))
}

/// Split `1H30M` into `[(1, 'H'), (30, 'M')]`.
fn iso_components(part: &str) -> Option<Vec<(u64, char)>> {
    let mut components = Vec::new();
    let mut digits = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if digits.is_empty() {
                return None;
            }
            components.push((digits.parse().ok()?, c));
            digits.clear();
        }
    }
    if !digits.is_empty() {
        return None;
    }
    Some(components)
}

/// Format a duration in the shortest exact unit (`90s`, `250ms`, `2h`).
pub(crate) fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis % 1_000 != 0 {
        return format!("{millis}ms");
    }
    let seconds = millis / 1_000;
    for (unit, size) in [("d", 86_400), ("h", 3_600), ("m", 60)] {
        if seconds % size == 0 {
            return format!("{}{unit}", seconds / size);
        }
    }
    format!("{seconds}s")
}
