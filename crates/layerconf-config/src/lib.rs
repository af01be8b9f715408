//! Typed configuration schemas and layered resolution.
//!
//! A [`ConfigSchema`] declares typed fields with defaults and toggled
//! groups; [`ConfigResolver`] resolves it against ordered [`Layer`]s into an
//! immutable [`ResolvedConfig`], reporting every violation at once.

mod error;
mod layer;
mod loader;
mod resolver;
mod schema;
mod value;

/// Public error types returned by schema, loading, and resolution APIs.
pub use error::{ConfigError, ResolutionReport, Violation};
/// Raw key/value layers.
pub use layer::{Layer, LayerSource};
/// Layered source discovery.
pub use loader::{
    DEFAULT_DOTENV_FILE, DEFAULT_JSON5_FILE, DEFAULT_PROPERTIES_FILE, LayeredConfig,
    LayeredSourceOptions, load_file_layer, load_layers,
};
/// Resolution entry points and results.
pub use resolver::{ConfigResolver, ResolvedConfig, ResolvedValue, ValueOrigin, resolve};
/// Schema declaration types.
pub use schema::{
    ConfigSchema, ConfigSchemaBuilder, FieldDefault, FieldSpec, GroupSpec, SchemaGroup,
};
/// Field types and typed values.
pub use value::{ConfigValue, FieldType};
