//! IO helpers for reading layers from disk.

use super::flatten::flatten_json;
use super::properties::parse_properties;
use super::{DEFAULT_CONFIG_DIR, DEFAULT_PROPERTIES_FILE};
use crate::layer::map_env_vars;
use crate::{ConfigError, ConfigSchema, Layer, LayerSource};
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Properties,
    Json5,
    DotEnv,
}

fn detect_format(path: &Path) -> Option<FileFormat> {
    if path.file_name().and_then(|name| name.to_str()) == Some(".env") {
        return Some(FileFormat::DotEnv);
    }
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "properties" => Some(FileFormat::Properties),
        "json5" | "json" => Some(FileFormat::Json5),
        "env" => Some(FileFormat::DotEnv),
        _ => None,
    }
}

/// Load a file layer; the format is chosen by extension.
///
/// Dotenv files use environment-variable names and are mapped onto the
/// schema, so they only ever carry declared keys.
pub fn load_file_layer(
    schema: &ConfigSchema,
    source: LayerSource,
    path: &Path,
) -> Result<Layer, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let format = detect_format(path).ok_or_else(|| {
        ConfigError::Invalid(format!("unsupported config format: {}", path.display()))
    })?;
    let source = match (format, source) {
        (FileFormat::DotEnv, LayerSource::File) => LayerSource::DotEnv,
        (_, source) => source,
    };
    let label = layer_label(source, path);

    let entries = match format {
        FileFormat::Properties => parse_properties(&fs::read_to_string(path)?),
        FileFormat::Json5 => {
            let contents = fs::read_to_string(path)?;
            let value: Value = json5::from_str(&contents)?;
            flatten_json(&value, &label)?
        }
        FileFormat::DotEnv => {
            let mut vars = HashMap::new();
            for item in dotenvy::from_path_iter(path)? {
                let (key, value) = item?;
                vars.insert(key, value);
            }
            map_env_vars(schema, &vars)
        }
    };
    debug!("loaded layer {} (entries={})", label, entries.len());
    Ok(Layer::from_mapped(
        source,
        label,
        Some(path.to_path_buf()),
        entries,
    ))
}

/// Build a user-friendly label for a file layer.
fn layer_label(source: LayerSource, path: &Path) -> String {
    format!("{}({})", source.name(), path.display())
}

/// Default user config path under the home directory.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_PROPERTIES_FILE)
    })
}
