//! On-disk layout of a pipeline installation.

use super::ConfigStore;
use crate::core::StageKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the pipeline finds its configuration files and plugin directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Directory holding `global.json` and the per-stage config files.
    pub config_root: PathBuf,
    /// Directory holding one plugin directory per stage.
    pub plugin_root: PathBuf,
    /// Global configuration file name, relative to `config_root`.
    pub global_config_file: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            config_root: PathBuf::from("."),
            plugin_root: PathBuf::from("Plugins"),
            global_config_file: PathBuf::from("global.json"),
        }
    }
}

impl PipelineSettings {
    /// Creates settings rooted at a single base directory.
    ///
    /// Config files live directly in `base`, plugins under `base/Plugins`.
    #[must_use]
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            config_root: base.to_path_buf(),
            plugin_root: base.join("Plugins"),
            ..Self::default()
        }
    }

    /// Sets the config root.
    #[must_use]
    pub fn with_config_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config_root = root.into();
        self
    }

    /// Sets the plugin root.
    #[must_use]
    pub fn with_plugin_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.plugin_root = root.into();
        self
    }

    /// Sets the global configuration file name.
    #[must_use]
    pub fn with_global_config_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.global_config_file = file.into();
        self
    }

    /// Returns the plugin directory for a stage.
    #[must_use]
    pub fn stage_directory(&self, kind: StageKind) -> PathBuf {
        self.plugin_root.join(kind.name())
    }

    /// Returns a config store reading from `config_root`.
    #[must_use]
    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(&self.config_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let settings = PipelineSettings::default();
        assert_eq!(
            settings.stage_directory(StageKind::PerformRequest),
            PathBuf::from("Plugins/PerformRequest")
        );
        assert_eq!(settings.global_config_file, PathBuf::from("global.json"));
    }

    #[test]
    fn test_rooted_at() {
        let settings = PipelineSettings::rooted_at("/opt/pipeline");
        assert_eq!(settings.config_root, PathBuf::from("/opt/pipeline"));
        assert_eq!(
            settings.stage_directory(StageKind::Clean),
            PathBuf::from("/opt/pipeline/Plugins/Clean")
        );
    }
}
