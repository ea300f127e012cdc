//! The loadable-module boundary.
//!
//! Plugins are compiled in and grouped into named modules. A stage directory
//! selects which modules are loaded for that stage by holding one manifest
//! file per module.

use super::PluginExports;
use serde::{Deserialize, Serialize};

/// Version of the module contract this host speaks.
pub const MODULE_CONTRACT_VERSION: u32 = 1;

/// File name suffix identifying module manifests inside a stage directory.
pub const MANIFEST_SUFFIX: &str = ".plugin.json";

/// A named group of plugins, possibly spanning several stages.
pub trait PluginModule: Send + Sync {
    /// Returns the module name manifests refer to.
    fn name(&self) -> &str;

    /// Instantiates the module's plugins into `exports`.
    ///
    /// Called once per discovery, so every pipeline run gets fresh instances.
    fn exports(&self, exports: &mut PluginExports);
}

/// Contents of a `*.plugin.json` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Name of the compiled-in module to load.
    pub module: String,
    /// Module contract version the manifest was written for.
    #[serde(default = "default_version")]
    pub version: u32,
}

const fn default_version() -> u32 {
    MODULE_CONTRACT_VERSION
}

impl ModuleManifest {
    /// Creates a manifest for the current contract version.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: MODULE_CONTRACT_VERSION,
        }
    }
}
