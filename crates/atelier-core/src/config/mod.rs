//! Configuration for the hub binary.
//!
//! One struct per TOML section, merged from `config/default.toml`, an
//! optional per-environment overlay, and `ATELIER__`-prefixed environment
//! variables.

pub mod history;
pub mod hub;
pub mod logging;
pub mod server;

use serde::{Deserialize, Serialize};

pub use self::history::HistoryConfig;
pub use self::hub::HubConfig;
pub use self::logging::LoggingConfig;
pub use self::server::ServerConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Everything the binary needs, deserialized from the merged sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[database]` section: the Postgres pool behind the history backend.
///
/// Only `url` is required; pool sizing falls back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "defaults::max_connections")]
    pub max_connections: u32,
    #[serde(default = "defaults::min_connections")]
    pub min_connections: u32,
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "defaults::idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl AppConfig {
    /// Read and merge the configuration sources for `env`.
    ///
    /// Layering, later sources winning: `config/default.toml`, then
    /// `config/{env}.toml`, then `ATELIER__SECTION__KEY` variables. Both
    /// files may be absent; a bare environment-variable deployment works.
    pub fn load(env: &str) -> AppResult<Self> {
        let merged = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ATELIER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Could not read configuration: {e}")))?;

        merged
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))
    }
}

mod defaults {
    pub fn max_connections() -> u32 {
        20
    }

    pub fn min_connections() -> u32 {
        5
    }

    pub fn connect_timeout() -> u64 {
        10
    }

    pub fn idle_timeout() -> u64 {
        300
    }
}
