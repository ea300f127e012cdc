//! Error types for the data request pipeline.
//!
//! Errors are split by propagation policy:
//! - [`PipelineError`] is stage-fatal and always propagates to the caller.
//! - [`PluginLoadError`] is recovered inside discovery (the module is skipped).
//! - Compensation failures are not errors at all; they are recorded as
//!   [`crate::stages::RollbackFailure`] values so they can never replace the
//!   failure that triggered the rollback.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// A stage-fatal error. Any of these halts the whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configuration file could not be read or parsed.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A configured plugin id has no matching discovered plugin.
    #[error("Plugin '{plugin}' not found in directory {}", directory.display())]
    PluginNotFound {
        /// The stage being run.
        stage: String,
        /// The configured plugin id.
        plugin: String,
        /// The stage directory that was searched.
        directory: PathBuf,
    },

    /// A plugin's primary operation failed.
    #[error("Error in plugin {plugin}: {message}")]
    PluginExecution {
        /// The stage being run.
        stage: String,
        /// The failing plugin id.
        plugin: String,
        /// The plugin's failure message.
        message: String,
    },
}

impl PipelineError {
    /// Creates a plugin not found error.
    #[must_use]
    pub fn plugin_not_found(
        stage: impl Into<String>,
        plugin: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self::PluginNotFound {
            stage: stage.into(),
            plugin: plugin.into(),
            directory: directory.into(),
        }
    }

    /// Creates a plugin execution error.
    #[must_use]
    pub fn plugin_execution(
        stage: impl Into<String>,
        plugin: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PluginExecution {
            stage: stage.into(),
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Returns the stage the error belongs to, if it is stage-scoped.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Config(_) => None,
            Self::PluginNotFound { stage, .. } | Self::PluginExecution { stage, .. } => Some(stage),
        }
    }

    /// Returns the plugin the error belongs to, if any.
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::Config(_) => None,
            Self::PluginNotFound { plugin, .. } | Self::PluginExecution { plugin, .. } => {
                Some(plugin)
            }
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::Config(err) => {
                map.insert("type".to_string(), serde_json::json!("ConfigError"));
                map.insert(
                    "path".to_string(),
                    serde_json::json!(err.path().display().to_string()),
                );
            }
            Self::PluginNotFound { stage, plugin, directory } => {
                map.insert("type".to_string(), serde_json::json!("PluginNotFound"));
                map.insert("stage".to_string(), serde_json::json!(stage));
                map.insert("plugin".to_string(), serde_json::json!(plugin));
                map.insert(
                    "directory".to_string(),
                    serde_json::json!(directory.display().to_string()),
                );
            }
            Self::PluginExecution { stage, plugin, .. } => {
                map.insert("type".to_string(), serde_json::json!("PluginExecutionError"));
                map.insert("stage".to_string(), serde_json::json!(stage));
                map.insert("plugin".to_string(), serde_json::json!(plugin));
            }
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors raised while loading configuration files.
///
/// A missing file is never an error; it yields the default configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file contents are not valid configuration JSON.
    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Returns the path of the offending file.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// The failure a plugin operation reports back to the runner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PluginError {
    /// Human-readable failure message.
    pub message: String,
}

impl PluginError {
    /// Creates a new plugin error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for PluginError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

/// Errors raised while loading a single plugin module during discovery.
///
/// Discovery logs these and skips the module; they never escape it.
#[derive(Debug, Error)]
pub enum PluginLoadError {
    /// The manifest file could not be read.
    #[error("Error loading module {}: {source}", path.display())]
    Read {
        /// The manifest path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not a valid module manifest.
    #[error("Invalid module manifest {}: {source}", path.display())]
    Manifest {
        /// The manifest path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest targets a contract version this host does not speak.
    #[error("Module '{module}' requires contract version {found}, host supports {supported}")]
    UnsupportedVersion {
        /// The module name.
        module: String,
        /// The version declared by the manifest.
        found: u32,
        /// The version this host supports.
        supported: u32,
    },

    /// No compiled-in module is registered under the manifest's name.
    #[error("No module registered under the name '{module}'")]
    UnknownModule {
        /// The module name.
        module: String,
    },
}
