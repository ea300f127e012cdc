//! On-disk fixtures for pipeline tests.

use crate::config::PipelineSettings;
use crate::core::StageKind;
use crate::plugins::{ModuleManifest, MANIFEST_SUFFIX};
use tempfile::TempDir;

/// A temporary pipeline installation: config files plus stage directories.
#[derive(Debug)]
pub struct PipelineFixture {
    dir: TempDir,
    settings: PipelineSettings,
}

impl PipelineFixture {
    /// Creates an empty installation in a fresh temporary directory.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let settings = PipelineSettings::rooted_at(dir.path());
        Self { dir, settings }
    }

    /// Returns settings pointing at this installation.
    #[must_use]
    pub fn settings(&self) -> PipelineSettings {
        self.settings.clone()
    }

    /// Returns the installation root.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Writes a stage's config file.
    pub fn write_stage_config(&self, kind: StageKind, json: &str) {
        std::fs::write(self.settings.config_root.join(kind.config_file()), json)
            .expect("write stage config");
    }

    /// Writes the global config file.
    pub fn write_global_config(&self, json: &str) {
        std::fs::write(
            self.settings.config_root.join(&self.settings.global_config_file),
            json,
        )
        .expect("write global config");
    }

    /// Places a manifest for `module` in a stage's plugin directory.
    pub fn install_module(&self, kind: StageKind, module: &str) {
        let dir = self.settings.stage_directory(kind);
        std::fs::create_dir_all(&dir).expect("create stage directory");
        let manifest = serde_json::to_string(&ModuleManifest::new(module)).expect("serialize manifest");
        std::fs::write(dir.join(format!("{module}{MANIFEST_SUFFIX}")), manifest)
            .expect("write manifest");
    }
}

impl Default for PipelineFixture {
    fn default() -> Self {
        Self::new()
    }
}
