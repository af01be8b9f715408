//! Build-time configuration for the MongoDB client integration.
//!
//! Declares the `quarkus.mongodb` schema (health, metrics, tracing, default
//! client creation, and the optional dev-services group) and maps a resolved
//! config onto [`MongoClientBuildTimeConfig`]. The registrars and
//! bootstrappers reading these values live elsewhere.

use layerconf_config::{
    ConfigError, ConfigResolver, ConfigSchema, FieldSpec, GroupSpec, Layer, LayeredSourceOptions,
    ResolvedConfig,
};
use log::debug;
use std::time::Duration;

/// Schema name used in reports.
pub const SCHEMA_NAME: &str = "mongodb";
/// Prefix under which layers address the client settings.
pub const CONFIG_PREFIX: &str = "quarkus.mongodb";
/// Image started by dev services when none is configured.
pub const DEFAULT_IMAGE_NAME: &str = "mongo:7.0";
/// Label value identifying a shared dev-services container.
pub const DEFAULT_SERVICE_NAME: &str = "mongodb";

/// Declare the MongoDB client build-time schema.
pub fn schema() -> Result<ConfigSchema, ConfigError> {
    ConfigSchema::builder(SCHEMA_NAME)
        .prefix(CONFIG_PREFIX)
        .field(
            FieldSpec::bool("health.enabled")
                .with_default("true")
                .describe("Publish a health check when a health extension is present"),
        )
        .field(
            FieldSpec::bool("metrics.enabled")
                .with_default("false")
                .describe("Publish metrics when a metrics extension is present"),
        )
        .field(
            FieldSpec::bool("force-default-clients")
                .with_default("false")
                .describe("Create the default clients even without injection points"),
        )
        .field(
            FieldSpec::bool("tracing.enabled")
                .with_default("false")
                .describe("Send tracing spans for driver commands when tracing is present"),
        )
        .group(
            GroupSpec::new("devservices")
                .describe("Start MongoDB automatically in dev and test mode")
                .toggle(
                    FieldSpec::bool("enabled")
                        .with_default("true")
                        .describe("Enable dev services when no connection string is configured"),
                )
                .field(
                    FieldSpec::string("image-name")
                        .with_default(DEFAULT_IMAGE_NAME)
                        .describe("Container image for the dev-services MongoDB"),
                )
                .field(
                    FieldSpec::integer("port")
                        .default_zero()
                        .describe("Fixed exposed port; 0 picks a free port"),
                )
                .field(
                    FieldSpec::bool("shared")
                        .with_default("true")
                        .describe("Share one dev-services MongoDB between applications"),
                )
                .field(
                    FieldSpec::string("service-name")
                        .with_default(DEFAULT_SERVICE_NAME)
                        .describe("Label value used to find a shared container"),
                )
                .field(
                    FieldSpec::duration("startup-timeout")
                        .with_default("60s")
                        .describe("How long to wait for the container to accept connections"),
                )
                .field(
                    FieldSpec::list("container-args")
                        .default_zero()
                        .describe("Extra arguments passed to the mongod command"),
                ),
        )
        .build()
}

/// Typed view of the MongoDB client build-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoClientBuildTimeConfig {
    /// Whether a health check is published.
    pub health_enabled: bool,
    /// Whether metrics are published.
    pub metrics_enabled: bool,
    /// Whether default clients are created even without injection points.
    pub force_default_clients: bool,
    /// Whether driver commands produce tracing spans.
    pub tracing_enabled: bool,
    /// Dev-services settings; `None` when the group is disabled.
    pub devservices: Option<DevServicesBuildTimeConfig>,
}

/// Settings for the dev-mode MongoDB container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServicesBuildTimeConfig {
    pub image_name: String,
    /// Fixed port, or `None` to pick a free one.
    pub port: Option<u16>,
    pub shared: bool,
    pub service_name: String,
    pub startup_timeout: Duration,
    pub container_args: Vec<String>,
}

impl MongoClientBuildTimeConfig {
    /// Resolve the schema against `layers` and build the typed tree.
    pub fn resolve(layers: &[Layer], strict: bool) -> Result<Self, ConfigError> {
        let schema = schema()?;
        let resolved = ConfigResolver::new(&schema).strict(strict).resolve(layers)?;
        Self::from_resolved(&resolved)
    }

    /// Resolve against the conventional layer stack.
    pub fn load_layered(options: LayeredSourceOptions) -> Result<Self, ConfigError> {
        let layered = schema()?.load_layered_with_options(options)?;
        Self::from_resolved(&layered.config)
    }

    /// Map a resolved config onto the typed tree.
    pub fn from_resolved(resolved: &ResolvedConfig) -> Result<Self, ConfigError> {
        let devservices = if resolved.is_group_enabled("devservices") {
            Some(DevServicesBuildTimeConfig::from_resolved(resolved)?)
        } else {
            debug!("mongodb dev services disabled");
            None
        };
        Ok(Self {
            health_enabled: resolved.bool("health.enabled")?,
            metrics_enabled: resolved.bool("metrics.enabled")?,
            force_default_clients: resolved.bool("force-default-clients")?,
            tracing_enabled: resolved.bool("tracing.enabled")?,
            devservices,
        })
    }
}

impl DevServicesBuildTimeConfig {
    fn from_resolved(resolved: &ResolvedConfig) -> Result<Self, ConfigError> {
        let port = resolved.integer("devservices.port")?;
        let port = match port {
            0 => None,
            port => Some(u16::try_from(port).map_err(|_| ConfigError::InvalidField {
                path: format!("{}:devservices.port", resolved.schema_name()),
                message: format!("port {port} is outside 0-65535"),
            })?),
        };
        Ok(Self {
            image_name: resolved.string("devservices.image-name")?.to_string(),
            port,
            shared: resolved.bool("devservices.shared")?,
            service_name: resolved.string("devservices.service-name")?.to_string(),
            startup_timeout: resolved.duration("devservices.startup-timeout")?,
            container_args: resolved.list("devservices.container-args")?.to_vec(),
        })
    }
}
