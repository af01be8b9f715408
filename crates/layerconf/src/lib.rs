//! Public surface for layerconf.
//!
//! This crate re-exports the schema/resolver crate and the MongoDB client
//! schema, and provides the rendering helpers shared with the CLI.

/// Re-export for convenience.
pub use layerconf_config as config;
/// Re-export for convenience.
pub use layerconf_mongodb as mongodb;

pub mod render;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
