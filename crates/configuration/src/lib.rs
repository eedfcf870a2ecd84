use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{
    DataSettings, InsightSettings, LogFormat, LoggingSettings, ServerSettings, Settings,
};
pub use telemetry::init_tracing;

/// Environment variables override the file, e.g. `REVPULSE__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "REVPULSE";

/// Loads the application configuration from `path` and the environment.
///
/// This function is the primary entry point for this crate. The file is
/// optional; any key it leaves out keeps its default. The merged result is
/// deserialized into our strongly-typed `Settings` struct and validated.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
