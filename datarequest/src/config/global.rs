//! Global configuration shared by every stage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Global configuration, loaded once at startup and read-only thereafter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Named connection strings.
    #[serde(rename = "ConnectionStrings")]
    pub connection_strings: HashMap<String, String>,

    /// Logging settings.
    #[serde(rename = "Logging")]
    pub logging: LoggingConfig,
}

impl GlobalConfig {
    /// Returns the named connection string, or an empty string when absent.
    #[must_use]
    pub fn connection_string(&self, name: &str) -> &str {
        self.connection_strings.get(name).map_or("", String::as_str)
    }

    /// Adds a connection string.
    #[must_use]
    pub fn with_connection_string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.connection_strings.insert(name.into(), value.into());
        self
    }
}

/// Logging section of the global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Verbosity name, e.g. `Info` or `Debug`.
    #[serde(rename = "Verbosity")]
    pub verbosity: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbosity: "Info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Maps the verbosity name to a `tracing` filter directive.
    ///
    /// Returns `None` for names that are not recognised.
    #[must_use]
    pub fn filter_directive(&self) -> Option<&'static str> {
        match self.verbosity.trim().to_ascii_lowercase().as_str() {
            "trace" | "verbose" => Some("trace"),
            "debug" => Some("debug"),
            "info" | "information" => Some("info"),
            "warn" | "warning" => Some("warn"),
            "error" | "critical" => Some("error"),
            "none" | "off" => Some("off"),
            _ => None,
        }
    }
}
