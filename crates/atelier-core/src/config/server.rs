//! `[server]` and `[server.cors]` sections.

use serde::{Deserialize, Serialize};

/// Listener settings for the HTTP/WebSocket server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// How long shutdown waits for in-flight requests before giving up.
    #[serde(default = "defaults::shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            shutdown_grace_seconds: defaults::shutdown_grace(),
            cors: CorsConfig::default(),
        }
    }
}

/// Browser cross-origin policy. A `"*"` entry switches that dimension to
/// allow-any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "defaults::any")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "defaults::methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "defaults::any")]
    pub allowed_headers: Vec<String>,
    /// Preflight cache lifetime in seconds.
    #[serde(default = "defaults::preflight_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: defaults::any(),
            allowed_methods: defaults::methods(),
            allowed_headers: defaults::any(),
            max_age_seconds: defaults::preflight_max_age(),
        }
    }
}

mod defaults {
    pub fn host() -> String {
        "0.0.0.0".into()
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn shutdown_grace() -> u64 {
        30
    }

    pub fn any() -> Vec<String> {
        vec!["*".into()]
    }

    pub fn methods() -> Vec<String> {
        ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
            .map(str::to_string)
            .to_vec()
    }

    pub fn preflight_max_age() -> u64 {
        3600
    }
}
