//! The pipeline manager: runs the six stages in order.

use crate::config::{GlobalConfig, PipelineSettings};
use crate::core::StageKind;
use crate::errors::PipelineError;
use crate::events::{StatusChannel, StatusUpdate};
use crate::plugins::{CapabilityContract, PluginRegistry};
use crate::stages::{StageDefinition, StageDefinitions, StageReport, StageRunner};
use crate::utils::elapsed_ms;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Result of a pipeline run in which every stage completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Identifier shared by every stage context of the run.
    pub run_id: Uuid,
    /// Per-stage outcomes, in execution order.
    pub stages: Vec<StageReport>,
    /// Total execution time in milliseconds.
    pub duration_ms: f64,
}

impl PipelineReport {
    /// Returns the report of a stage.
    #[must_use]
    pub fn stage(&self, kind: StageKind) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == kind)
    }
}

/// Drives the fixed stage sequence: Setup, Clean, PerformRequest, Test,
/// Export, Cleanup.
///
/// Each stage gets a fresh context. The first failing stage halts the run
/// and its error is returned; no later stage is started.
#[derive(Debug)]
pub struct PipelineManager {
    settings: PipelineSettings,
    global: Arc<GlobalConfig>,
    definitions: StageDefinitions,
    registry: Arc<PluginRegistry>,
    runner: StageRunner,
    status: Arc<StatusChannel>,
}

impl PipelineManager {
    /// Creates a manager, loading the global configuration from `settings`.
    ///
    /// A missing global config file yields the defaults.
    pub fn new(
        settings: PipelineSettings,
        registry: Arc<PluginRegistry>,
        status: Arc<StatusChannel>,
    ) -> Result<Self, PipelineError> {
        let global = settings
            .config_store()
            .load_global(&settings.global_config_file)?;
        Ok(Self::with_global_config(settings, global, registry, status))
    }

    /// Creates a manager with an already loaded global configuration.
    #[must_use]
    pub fn with_global_config(
        settings: PipelineSettings,
        global: GlobalConfig,
        registry: Arc<PluginRegistry>,
        status: Arc<StatusChannel>,
    ) -> Self {
        let runner = StageRunner::new(
            settings.config_store(),
            Arc::clone(&registry),
            Arc::clone(&status),
        );
        Self {
            definitions: StageDefinitions::standard(&settings),
            settings,
            global: Arc::new(global),
            registry,
            runner,
            status,
        }
    }

    /// Returns the installation layout.
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Returns the global configuration.
    #[must_use]
    pub fn global_config(&self) -> &GlobalConfig {
        &self.global
    }

    /// Returns the stage definitions.
    #[must_use]
    pub fn definitions(&self) -> &StageDefinitions {
        &self.definitions
    }

    /// Returns the stage definitions for modification before a run.
    pub fn definitions_mut(&mut self) -> &mut StageDefinitions {
        &mut self.definitions
    }

    /// Returns the status channel.
    #[must_use]
    pub fn status(&self) -> &Arc<StatusChannel> {
        &self.status
    }

    /// Lists the plugin ids discoverable in each stage directory.
    #[must_use]
    pub fn list_plugins(&self) -> Vec<(StageKind, Vec<String>)> {
        let d = &self.definitions;
        vec![
            self.discovered(&d.setup),
            self.discovered(&d.clean),
            self.discovered(&d.perform_request),
            self.discovered(&d.test),
            self.discovered(&d.export),
            self.discovered(&d.cleanup),
        ]
    }

    /// Runs every stage in order.
    ///
    /// Returns the per-stage reports, or the error of the first failing
    /// stage after that stage's rollback has finished.
    pub async fn execute(&self) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id);

        async {
            let start = Instant::now();
            match self.run_stages(run_id).await {
                Ok(stages) => {
                    info!("DataRequestPipeline completed successfully.");
                    self.status.publish(StatusUpdate::pipeline_completed());
                    Ok(PipelineReport {
                        run_id,
                        stages,
                        duration_ms: elapsed_ms(start),
                    })
                }
                Err(err) => {
                    error!(error = %err, "Pipeline halted due to error: {err}");
                    self.status
                        .publish(StatusUpdate::pipeline_halted(&err.to_string()));
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, run_id: Uuid) -> Result<Vec<StageReport>, PipelineError> {
        let d = &self.definitions;
        Ok(vec![
            self.run_stage(&d.setup, run_id).await?,
            self.run_stage(&d.clean, run_id).await?,
            self.run_stage(&d.perform_request, run_id).await?,
            self.run_stage(&d.test, run_id).await?,
            self.run_stage(&d.export, run_id).await?,
            self.run_stage(&d.cleanup, run_id).await?,
        ])
    }

    async fn run_stage<C: CapabilityContract>(
        &self,
        definition: &StageDefinition<C>,
        run_id: Uuid,
    ) -> Result<StageReport, PipelineError> {
        let mut ctx = definition.create_context(run_id, &self.global);
        self.runner
            .run(definition, &mut ctx)
            .instrument(info_span!("stage", stage = definition.name()))
            .await
    }

    fn discovered<C: CapabilityContract>(
        &self,
        definition: &StageDefinition<C>,
    ) -> (StageKind, Vec<String>) {
        let set = self.registry.discover::<C>(&definition.plugin_directory);
        let ids = set.ids().into_iter().map(String::from).collect();
        (definition.kind, ids)
    }
}
