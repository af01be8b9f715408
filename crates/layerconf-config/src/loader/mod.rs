//! Layered source discovery.
//!
//! Builds the conventional layer stack for a schema (defaults, user file,
//! working-directory files, environment, runtime files, explicit overrides)
//! and resolves the schema against it.

mod flatten;
mod layer_io;
mod properties;
mod utils;


use crate::{ConfigError, ConfigResolver, ConfigSchema, Layer, LayerSource, ResolvedConfig};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use layer_io::load_file_layer;

/// Properties file looked up in the working directory and user config dir.
pub const DEFAULT_PROPERTIES_FILE: &str = "application.properties";
/// JSON5 file looked up in the working directory.
pub const DEFAULT_JSON5_FILE: &str = "application.json5";
/// Dotenv file looked up in the working directory.
pub const DEFAULT_DOTENV_FILE: &str = ".env";
/// User config directory under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".layerconf";

/// Resolved config plus the layers it was resolved from.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The resolved, immutable config.
    pub config: ResolvedConfig,
    /// Layers in precedence order (low -> high).
    pub layers: Vec<Layer>,
}

/// Options controlling layer discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredSourceOptions {
    /// Working directory searched for application files.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.layerconf/application.properties`).
    pub user_config_path: Option<PathBuf>,
    /// Whether an environment layer is added.
    pub include_env: bool,
    /// Environment snapshot to map; the process environment when `None`.
    pub env_vars: Option<HashMap<String, String>>,
    /// Runtime config files applied after the environment; must exist.
    pub runtime_paths: Vec<PathBuf>,
    /// Explicit `key=value` overrides applied last.
    pub overrides: Vec<(String, String)>,
    /// Reject undeclared keys under the schema namespace.
    pub strict: bool,
}

impl LayeredSourceOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            include_env: true,
            env_vars: None,
            runtime_paths: Vec::new(),
            overrides: Vec::new(),
            strict: false,
        }
    }

    /// Add a runtime config file applied after the environment.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Add an explicit override applied last.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Use an explicit environment snapshot instead of the process environment.
    pub fn with_env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl ConfigSchema {
    /// Resolve against the default layer stack for `cwd`.
    pub fn load_layered(&self, cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered config for {} (cwd={})",
            self.name(),
            cwd.as_ref().display()
        );
        self.load_layered_with_options(LayeredSourceOptions::new(cwd))
    }

    /// Resolve against a layer stack built from explicit options.
    pub fn load_layered_with_options(
        &self,
        options: LayeredSourceOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let strict = options.strict;
        let layers = load_layers(self, &options)?;
        let config = ConfigResolver::new(self).strict(strict).resolve(&layers)?;
        Ok(LayeredConfig { config, layers })
    }
}

/// Build the layer stack for `schema`.
///
/// Layer precedence (low -> high): defaults, user file, cwd properties,
/// cwd JSON5, cwd dotenv, environment, runtime files, overrides.
pub fn load_layers(
    schema: &ConfigSchema,
    options: &LayeredSourceOptions,
) -> Result<Vec<Layer>, ConfigError> {
    let cwd = utils::canonical_dir(&options.cwd)?;
    debug!("normalized cwd for layer discovery: {}", cwd.display());
    let mut layers = vec![Layer::defaults(schema)];
    let mut seen = utils::SeenFiles::default();

    let mut optional_paths = Vec::new();
    if let Some(path) = options.user_config_path.as_ref() {
        optional_paths.push(path.clone());
    }
    for name in [DEFAULT_PROPERTIES_FILE, DEFAULT_JSON5_FILE, DEFAULT_DOTENV_FILE] {
        optional_paths.push(cwd.join(name));
    }
    for path in optional_paths {
        if !path.exists() {
            debug!("skipping missing layer (path={})", path.display());
            continue;
        }
        if !seen.first_visit(&path) {
            debug!("skipping duplicate layer (path={})", path.display());
            continue;
        }
        layers.push(load_file_layer(schema, LayerSource::File, &path)?);
    }

    if options.include_env {
        let env_layer = match options.env_vars.as_ref() {
            Some(vars) => Layer::from_env(schema, vars.clone()),
            None => Layer::from_process_env(schema),
        };
        debug!("loaded env layer (entries={})", env_layer.len());
        layers.push(env_layer);
    }

    for path in &options.runtime_paths {
        let layer = load_file_layer(schema, LayerSource::Runtime, path)?;
        debug!("loaded runtime layer (path={})", path.display());
        layers.push(layer);
    }

    if !options.overrides.is_empty() {
        layers.push(Layer::from_pairs(
            LayerSource::Runtime,
            "overrides",
            options.overrides.iter().cloned(),
        ));
    }

    info!("layer stack built (layers={})", layers.len());
    Ok(layers)
}
