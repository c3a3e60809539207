//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file overlaid with `QUILL_`-prefixed environment variables.
//! Every field carries a serde default, so an empty source is a valid config.

pub mod challenge;
pub mod logging;
pub mod maintenance;
pub mod plugin;
pub mod rate_limit;

use serde::{Deserialize, Serialize};

pub use self::challenge::ChallengeConfig;
pub use self::logging::LoggingConfig;
pub use self::maintenance::MaintenanceConfig;
pub use self::plugin::PluginConfig;
pub use self::rate_limit::{RateLimitConfig, RateLimitPolicy};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Rate limiter housekeeping and named call-site policies.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Comment challenge settings.
    #[serde(default)]
    pub challenge: ChallengeConfig,
    /// Background maintenance settings.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Plugin system settings.
    #[serde(default)]
    pub plugins: PluginConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables use the `QUILL_` prefix
    /// and `__` between nested keys, e.g. `QUILL_CHALLENGE__TTL_SECONDS=300`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
