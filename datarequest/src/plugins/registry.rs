//! Module registry and per-stage plugin discovery.

use super::{CapabilityContract, ModuleManifest, PluginExports, PluginModule, SharedPlugin};
use super::{MANIFEST_SUFFIX, MODULE_CONTRACT_VERSION};
use crate::errors::{PipelineError, PluginLoadError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The plugins discovered for one stage, keyed case-insensitively by id.
pub struct PluginSet<C: CapabilityContract> {
    directory: PathBuf,
    plugins: Vec<SharedPlugin<C>>,
    index: HashMap<String, usize>,
}

impl<C: CapabilityContract> PluginSet<C> {
    /// Creates an empty set for the given stage directory.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            plugins: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds a plugin. Returns false if its id is already taken.
    pub fn insert(&mut self, plugin: SharedPlugin<C>) -> bool {
        let key = plugin.id().to_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.plugins.len());
        self.plugins.push(plugin);
        true
    }

    /// Looks up a plugin by id, ignoring case.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<SharedPlugin<C>> {
        self.index
            .get(&id.to_lowercase())
            .map(|&i| Arc::clone(&self.plugins[i]))
    }

    /// Looks up a plugin by id, failing with `PluginNotFound`.
    pub fn resolve(&self, id: &str) -> Result<SharedPlugin<C>, PipelineError> {
        self.get(id)
            .ok_or_else(|| PipelineError::plugin_not_found(C::KIND.name(), id, &self.directory))
    }

    /// Returns the ids of every plugin, in discovery order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.id()).collect()
    }

    /// Returns the directory the set was discovered in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the number of plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl<C: CapabilityContract> std::fmt::Debug for PluginSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginSet")
            .field("stage", &C::KIND)
            .field("directory", &self.directory)
            .field("plugins", &self.ids())
            .finish()
    }
}

/// Table of compiled-in plugin modules, and discovery over stage directories.
#[derive(Default)]
pub struct PluginRegistry {
    modules: RwLock<HashMap<String, Arc<dyn PluginModule>>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module and returns the registry.
    #[must_use]
    pub fn with_module(self, module: impl PluginModule + 'static) -> Self {
        self.register_module(module);
        self
    }

    /// Registers a module. A module with the same name is replaced.
    pub fn register_module(&self, module: impl PluginModule + 'static) {
        let key = module.name().to_lowercase();
        if self.modules.write().insert(key, Arc::new(module)).is_some() {
            debug!("Replaced previously registered plugin module");
        }
    }

    /// Returns true if a module is registered under `name`, ignoring case.
    #[must_use]
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.read().contains_key(&name.to_lowercase())
    }

    /// Lists registered module names, sorted.
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .modules
            .read()
            .values()
            .map(|m| m.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Discovers the plugins implementing contract `C` in `directory`.
    ///
    /// Every `*.plugin.json` manifest in the directory names a module to
    /// load. Modules that fail to load are skipped with a warning. A missing
    /// or unreadable directory yields an empty set.
    pub fn discover<C: CapabilityContract>(&self, directory: &Path) -> PluginSet<C> {
        let mut set = PluginSet::new(directory);

        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(directory = %directory.display(), "Plugin directory not found");
                return set;
            }
            Err(err) => {
                warn!(directory = %directory.display(), error = %err, "Error scanning plugin directory");
                return set;
            }
        };

        let mut manifests: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_manifest(path))
            .collect();
        manifests.sort();

        for path in manifests {
            let module = match self.load_module(&path) {
                Ok(module) => module,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping plugin module");
                    continue;
                }
            };

            let mut exports = PluginExports::new();
            module.exports(&mut exports);

            for plugin in exports.take::<C>() {
                let id = plugin.id().to_string();
                if !set.insert(plugin) {
                    warn!(
                        directory = %directory.display(),
                        plugin = %id,
                        module = %module.name(),
                        "Duplicate plugin id, keeping the first one discovered"
                    );
                }
            }

            info!(
                path = %path.display(),
                module = %module.name(),
                "Loaded module {}.",
                file_name(&path)
            );
        }

        set
    }

    fn load_module(&self, path: &Path) -> Result<Arc<dyn PluginModule>, PluginLoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| PluginLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest: ModuleManifest =
            serde_json::from_str(&json).map_err(|source| PluginLoadError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;

        if manifest.version != MODULE_CONTRACT_VERSION {
            return Err(PluginLoadError::UnsupportedVersion {
                module: manifest.module,
                found: manifest.version,
                supported: MODULE_CONTRACT_VERSION,
            });
        }

        self.modules
            .read()
            .get(&manifest.module.to_lowercase())
            .cloned()
            .ok_or(PluginLoadError::UnknownModule {
                module: manifest.module,
            })
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("modules", &self.module_names())
            .finish()
    }
}

fn is_manifest(path: &Path) -> bool {
    path.is_file() && file_name(path).ends_with(MANIFEST_SUFFIX)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CleanContext, ExportContext};
    use crate::testing::{CallLog, RecordingPlugin, TestModule};
    use pretty_assertions::assert_eq;

    fn clean_module(name: &str, ids: &'static [&'static str]) -> TestModule {
        let log = CallLog::new();
        TestModule::new(name, move |exports| {
            for id in ids {
                exports.export::<CleanContext, _>(RecordingPlugin::new(*id, &log));
            }
        })
    }

    fn write_manifest(dir: &Path, file: &str, body: &str) {
        std::fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let registry = PluginRegistry::new().with_module(clean_module("a", &["Trim"]));
        let set = registry.discover::<CleanContext>(Path::new("/definitely/not/here"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_discover_filters_by_contract() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "a.plugin.json", r#"{"module": "a"}"#);

        let registry = PluginRegistry::new().with_module(clean_module("a", &["Trim", "Validate"]));

        let clean = registry.discover::<CleanContext>(dir.path());
        assert_eq!(clean.ids(), vec!["Trim", "Validate"]);

        let export = registry.discover::<ExportContext>(dir.path());
        assert!(export.is_empty());
    }

    #[test]
    fn test_bad_modules_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "1-broken.plugin.json", "{ nope");
        write_manifest(dir.path(), "2-unknown.plugin.json", r#"{"module": "ghost"}"#);
        write_manifest(dir.path(), "3-future.plugin.json", r#"{"module": "a", "version": 9}"#);
        write_manifest(dir.path(), "4-good.plugin.json", r#"{"module": "A"}"#);
        write_manifest(dir.path(), "notes.txt", "ignored");

        let registry = PluginRegistry::new().with_module(clean_module("a", &["Trim"]));
        let set = registry.discover::<CleanContext>(dir.path());

        assert_eq!(set.ids(), vec!["Trim"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "a.plugin.json", r#"{"module": "a"}"#);
        write_manifest(dir.path(), "b.plugin.json", r#"{"module": "b"}"#);

        let registry = PluginRegistry::new()
            .with_module(clean_module("a", &["Trim"]))
            .with_module(clean_module("b", &["trim", "Validate"]));

        let set = registry.discover::<CleanContext>(dir.path());
        assert_eq!(set.ids(), vec!["Trim", "Validate"]);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let log = CallLog::new();
        let mut set = PluginSet::<CleanContext>::new("Plugins/Clean");
        assert!(set.insert(Arc::new(RecordingPlugin::new("AuditRequestCleanPlugin", &log))));

        assert!(set.resolve("auditrequestcleanplugin").is_ok());
        assert!(set.resolve("AUDITREQUESTCLEANPLUGIN").is_ok());

        let err = set.resolve("Validate").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::PluginNotFound { ref stage, ref plugin, .. }
                if stage == "Clean" && plugin == "Validate"
        ));
    }

    #[test]
    fn test_module_names() {
        let registry = PluginRegistry::new()
            .with_module(clean_module("beta", &[]))
            .with_module(clean_module("alpha", &[]));

        assert_eq!(registry.module_names(), vec!["alpha", "beta"]);
        assert!(registry.has_module("ALPHA"));
        assert!(!registry.has_module("gamma"));
    }
}
