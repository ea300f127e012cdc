//! Process-wide `tracing` subscriber setup.

use crate::config::GlobalConfig;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Directive used when the configured verbosity is not recognised.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Initialize structured logging with tracing-subscriber.
///
/// Uses the `RUST_LOG` env var if set, otherwise falls back to `directive`.
/// Fails if a global subscriber is already installed.
pub fn init(directive: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

/// Initializes logging at the verbosity of `global`, unless `level_override`
/// is given.
pub fn init_for(global: &GlobalConfig, level_override: Option<&str>) -> anyhow::Result<()> {
    init(&filter_for(global, level_override))?;
    if level_override.is_none() && global.logging.filter_directive().is_none() {
        warn!(
            verbosity = %global.logging.verbosity,
            "Unrecognized verbosity, logging at {DEFAULT_DIRECTIVE}"
        );
    }
    Ok(())
}

/// Returns the filter directive for a configuration.
#[must_use]
pub fn filter_for(global: &GlobalConfig, level_override: Option<&str>) -> String {
    match level_override {
        Some(level) => level.to_string(),
        None => global
            .logging
            .filter_directive()
            .unwrap_or(DEFAULT_DIRECTIVE)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;

    fn with_verbosity(verbosity: &str) -> GlobalConfig {
        GlobalConfig {
            logging: LoggingConfig {
                verbosity: verbosity.to_string(),
            },
            ..GlobalConfig::default()
        }
    }

    #[test]
    fn test_filter_follows_verbosity() {
        assert_eq!(filter_for(&with_verbosity("Warning"), None), "warn");
        assert_eq!(filter_for(&GlobalConfig::default(), None), "info");
    }

    #[test]
    fn test_unknown_verbosity_falls_back() {
        assert_eq!(filter_for(&with_verbosity("Chatty"), None), DEFAULT_DIRECTIVE);
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(filter_for(&with_verbosity("Error"), Some("datarequest=trace")), "datarequest=trace");
    }
}
