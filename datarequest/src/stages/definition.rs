//! Static stage definitions.

use crate::config::{GlobalConfig, PipelineSettings};
use crate::context::{
    CleanContext, CleanupContext, ExportContext, RequestContext, SetupContext, StageContext,
    TestContext,
};
use crate::core::StageKind;
use std::path::PathBuf;
use uuid::Uuid;

/// Prepares a fresh stage context from the global configuration.
pub type ContextInitializer<C> = fn(&mut C, &GlobalConfig);

/// How to run one stage: where its plugins and config live, and whether a
/// failure compensates executed plugins.
#[derive(Debug, Clone)]
pub struct StageDefinition<C: StageContext> {
    /// The stage.
    pub kind: StageKind,
    /// Directory scanned for plugin modules.
    pub plugin_directory: PathBuf,
    /// Config file name, resolved by the config store.
    pub config_file: PathBuf,
    /// Whether a failure rolls back executed plugins.
    pub rollback_enabled: bool,
    /// Optional context initializer run before the first plugin.
    pub initializer: Option<ContextInitializer<C>>,
}

impl<C: StageContext> StageDefinition<C> {
    /// Creates the standard definition of `C`'s stage for a layout.
    #[must_use]
    pub fn new(settings: &PipelineSettings) -> Self {
        Self {
            kind: C::KIND,
            plugin_directory: settings.stage_directory(C::KIND),
            config_file: PathBuf::from(C::KIND.config_file()),
            rollback_enabled: C::KIND.rollback_enabled(),
            initializer: None,
        }
    }

    /// Sets the context initializer.
    #[must_use]
    pub fn with_initializer(mut self, initializer: ContextInitializer<C>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Enables or disables rollback.
    #[must_use]
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback_enabled = enabled;
        self
    }

    /// Returns the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Creates and initializes the stage's context.
    #[must_use]
    pub fn create_context(&self, run_id: Uuid, global: &GlobalConfig) -> C {
        let mut ctx = C::new(run_id);
        if let Some(initializer) = self.initializer {
            initializer(&mut ctx, global);
        }
        ctx
    }
}

/// Copies the `Input` and `Output` connection strings into a request context.
///
/// A missing key yields an empty string.
pub fn inject_connection_strings(ctx: &mut RequestContext, global: &GlobalConfig) {
    ctx.input_connection_string = global.connection_string("Input").to_string();
    ctx.output_connection_string = global.connection_string("Output").to_string();
}

/// The fixed six-stage sequence, one typed definition per stage.
#[derive(Debug, Clone)]
pub struct StageDefinitions {
    /// Setup stage.
    pub setup: StageDefinition<SetupContext>,
    /// Clean stage.
    pub clean: StageDefinition<CleanContext>,
    /// PerformRequest stage.
    pub perform_request: StageDefinition<RequestContext>,
    /// Test stage.
    pub test: StageDefinition<TestContext>,
    /// Export stage.
    pub export: StageDefinition<ExportContext>,
    /// Cleanup stage.
    pub cleanup: StageDefinition<CleanupContext>,
}

impl StageDefinitions {
    /// Creates the standard definitions for a layout.
    #[must_use]
    pub fn standard(settings: &PipelineSettings) -> Self {
        Self {
            setup: StageDefinition::new(settings),
            clean: StageDefinition::new(settings),
            perform_request: StageDefinition::new(settings)
                .with_initializer(inject_connection_strings),
            test: StageDefinition::new(settings),
            export: StageDefinition::new(settings),
            cleanup: StageDefinition::new(settings),
        }
    }

    /// Returns `(stage, plugin directory, rollback enabled)` in execution order.
    #[must_use]
    pub fn summary(&self) -> Vec<(StageKind, PathBuf, bool)> {
        vec![
            (self.setup.kind, self.setup.plugin_directory.clone(), self.setup.rollback_enabled),
            (self.clean.kind, self.clean.plugin_directory.clone(), self.clean.rollback_enabled),
            (
                self.perform_request.kind,
                self.perform_request.plugin_directory.clone(),
                self.perform_request.rollback_enabled,
            ),
            (self.test.kind, self.test.plugin_directory.clone(), self.test.rollback_enabled),
            (self.export.kind, self.export.plugin_directory.clone(), self.export.rollback_enabled),
            (
                self.cleanup.kind,
                self.cleanup.plugin_directory.clone(),
                self.cleanup.rollback_enabled,
            ),
        ]
    }
}
