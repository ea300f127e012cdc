//! Per-stage configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a single stage.
///
/// Wire format: `{"enabled": bool, "plugins": [string, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Whether the stage runs at all.
    pub enabled: bool,
    /// Plugin ids, in invocation order.
    pub plugins: Vec<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            plugins: Vec::new(),
        }
    }
}

impl StageConfig {
    /// Creates an enabled configuration running the given plugins in order.
    #[must_use]
    pub fn with_plugins<I, S>(plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            plugins: plugins.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a disabled configuration.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            plugins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_enabled_and_empty() {
        let config = StageConfig::default();
        assert!(config.enabled);
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_deserialize_preserves_order() {
        let config: StageConfig =
            serde_json::from_str(r#"{"enabled": true, "plugins": ["Trim", "Validate"]}"#).unwrap();
        assert_eq!(config, StageConfig::with_plugins(["Trim", "Validate"]));
    }

    #[test]
    fn test_missing_enabled_defaults_to_true() {
        let config: StageConfig = serde_json::from_str(r#"{"plugins": ["A"]}"#).unwrap();
        assert!(config.enabled);
    }

    #[test]
    fn test_disabled() {
        let config: StageConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert_eq!(config, StageConfig::disabled());
    }
}
