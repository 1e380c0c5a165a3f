//! `[logging]` section.

use serde::{Deserialize, Serialize};

/// Output settings for `tracing-subscriber`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "defaults::level")]
    pub level: String,
    /// `"json"` for machine-readable lines; anything else is pretty.
    #[serde(default = "defaults::format")]
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
            format: defaults::format(),
        }
    }
}

mod defaults {
    pub fn level() -> String {
        "info".into()
    }

    pub fn format() -> String {
        "json".into()
    }
}
