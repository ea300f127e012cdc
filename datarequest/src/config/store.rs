//! Loading of global and per-stage configuration files.

use super::{GlobalConfig, StageConfig};
use crate::errors::ConfigError;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Loads configuration files relative to a root directory.
///
/// A missing file yields the default configuration. A file that exists but
/// cannot be read or parsed is an error.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a file name against the root. Absolute paths are kept as is.
    #[must_use]
    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        self.root.join(file)
    }

    /// Loads the global configuration.
    pub fn load_global(&self, file: impl AsRef<Path>) -> Result<GlobalConfig, ConfigError> {
        load_or_default(&self.resolve(file), "Global configuration")
    }

    /// Loads a stage configuration.
    pub fn load_stage(&self, file: impl AsRef<Path>) -> Result<StageConfig, ConfigError> {
        load_or_default(&self.resolve(file), "Configuration")
    }
}

fn load_or_default<T>(path: &Path, what: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "{what} file not found. Using default configuration.");
            return Ok(T::default());
        }
        Err(source) => {
            error!(path = %path.display(), error = %source, "Error reading {what} file");
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    match serde_json::from_str(&json) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded {what} file.");
            Ok(config)
        }
        Err(source) => {
            error!(path = %path.display(), error = %source, "Error parsing {what} file");
            Err(ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
