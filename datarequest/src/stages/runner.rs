//! The stage runner: ordered plugin invocation with rollback on failure.

use super::guard::guarded;
use super::{ExecutedSet, RollbackCoordinator, StageDefinition};
use crate::config::ConfigStore;
use crate::core::{StageKind, StageLifecycle, StageState};
use crate::errors::PipelineError;
use crate::events::{StatusChannel, StatusUpdate};
use crate::plugins::{CapabilityContract, PluginRegistry};
use crate::utils::elapsed_ms;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Outcome of a stage that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage.
    pub stage: StageKind,
    /// Final state. Always `Completed` for a returned report.
    pub state: StageState,
    /// True if the stage was disabled by configuration.
    pub skipped: bool,
    /// Ids of the plugins that ran, in order.
    pub executed: Vec<String>,
    /// Wall time spent in the stage.
    pub duration_ms: f64,
}

/// Runs one stage's configured plugins against its context.
#[derive(Debug, Clone)]
pub struct StageRunner {
    config: ConfigStore,
    registry: Arc<PluginRegistry>,
    status: Arc<StatusChannel>,
    rollback: RollbackCoordinator,
}

impl StageRunner {
    /// Creates a new stage runner.
    #[must_use]
    pub fn new(
        config: ConfigStore,
        registry: Arc<PluginRegistry>,
        status: Arc<StatusChannel>,
    ) -> Self {
        Self {
            config,
            registry,
            rollback: RollbackCoordinator::new(Arc::clone(&status)),
            status,
        }
    }

    /// Runs a stage.
    ///
    /// 1. Loads the stage config; a disabled stage completes immediately.
    /// 2. Discovers the stage's plugins.
    /// 3. Resolves and executes each configured id in order. A missing id or
    ///    a failing plugin stops the stage; plugins that already completed
    ///    are compensated in reverse order when the stage enables rollback,
    ///    and the original error is returned.
    pub async fn run<C: CapabilityContract>(
        &self,
        definition: &StageDefinition<C>,
        ctx: &mut C,
    ) -> Result<StageReport, PipelineError> {
        let stage = definition.name();
        let start = Instant::now();
        let mut lifecycle = StageLifecycle::new(stage);

        info!(
            stage,
            directory = %definition.plugin_directory.display(),
            "Starting stage for plugins in: {}",
            definition.plugin_directory.display()
        );

        let config = match self.config.load_stage(&definition.config_file) {
            Ok(config) => config,
            Err(err) => {
                lifecycle.transition(StageState::Failed);
                let err = PipelineError::from(err);
                self.status
                    .publish(StatusUpdate::stage_failed(stage, &err.to_string()));
                return Err(err);
            }
        };

        if !config.enabled {
            info!(stage, "Stage {stage} is disabled via configuration.");
            lifecycle.transition(StageState::Completed);
            self.status.publish(StatusUpdate::stage_skipped(stage));
            return Ok(StageReport {
                stage: definition.kind,
                state: lifecycle.state(),
                skipped: true,
                executed: Vec::new(),
                duration_ms: elapsed_ms(start),
            });
        }

        lifecycle.transition(StageState::Running);
        self.status.publish(StatusUpdate::stage_started(stage));

        let plugins = self.registry.discover::<C>(&definition.plugin_directory);
        let mut executed = ExecutedSet::new();

        for plugin_id in &config.plugins {
            let plugin = match plugins.resolve(plugin_id) {
                Ok(plugin) => plugin,
                Err(err) => {
                    error!(stage, plugin = %plugin_id, "{err}");
                    return Err(self.fail(definition, &mut lifecycle, executed, ctx, err).await);
                }
            };

            let id = plugin.id().to_string();
            info!(stage, plugin = %id, "Starting plugin {id} in stage {stage}.");
            self.status.publish(StatusUpdate::plugin_started(stage, &id));

            let outcome = guarded(plugin.execute(ctx)).await;
            match outcome {
                Ok(()) => {
                    self.status.publish(StatusUpdate::plugin_succeeded(stage, &id));
                    executed.push(plugin);
                }
                Err(plugin_err) => {
                    error!(stage, plugin = %id, error = %plugin_err, "Error in plugin {id}");
                    self.status
                        .publish(StatusUpdate::plugin_failed(stage, &id, &plugin_err.message));
                    let err = PipelineError::plugin_execution(stage, id, plugin_err.message);
                    return Err(self.fail(definition, &mut lifecycle, executed, ctx, err).await);
                }
            }
        }

        lifecycle.transition(StageState::Completed);
        info!(stage, executed = executed.len(), "Stage {stage} completed.");
        self.status.publish(StatusUpdate::stage_completed(stage));

        Ok(StageReport {
            stage: definition.kind,
            state: lifecycle.state(),
            skipped: false,
            executed: executed.ids(),
            duration_ms: elapsed_ms(start),
        })
    }

    async fn fail<C: CapabilityContract>(
        &self,
        definition: &StageDefinition<C>,
        lifecycle: &mut StageLifecycle,
        executed: ExecutedSet<C>,
        ctx: &mut C,
        error: PipelineError,
    ) -> PipelineError {
        let stage = definition.name();

        if definition.rollback_enabled {
            lifecycle.transition(StageState::RollingBack);
            let report = self.rollback.rollback(stage, executed, ctx).await;
            if !report.is_clean() {
                warn!(
                    stage,
                    failures = report.failures.len(),
                    "Rollback finished with failures"
                );
            }
            lifecycle.transition(StageState::RolledBack);
        } else {
            if !executed.is_empty() {
                info!(
                    stage,
                    executed = executed.len(),
                    "Rollback disabled for stage {stage}; executed plugins are left as is"
                );
            }
            lifecycle.transition(StageState::Failed);
        }

        self.status
            .publish(StatusUpdate::stage_failed(stage, &error.to_string()));
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineSettings;
    use crate::context::{CleanContext, CleanupContext, StageContext};
    use crate::events::{CollectingListener, StatusKind};
    use crate::plugins::PluginExports;
    use crate::testing::{trail, CallLog, PipelineFixture, RecordingPlugin, TestModule};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    struct Harness {
        fixture: PipelineFixture,
        runner: StageRunner,
        listener: Arc<CollectingListener>,
    }

    impl Harness {
        fn new<F>(exports: F) -> Self
        where
            F: Fn(&mut PluginExports) + Send + Sync + 'static,
        {
            let fixture = PipelineFixture::new();
            let registry = PluginRegistry::new().with_module(TestModule::new("mocks", exports));
            let status = Arc::new(StatusChannel::new());
            let listener = Arc::new(CollectingListener::new());
            status.subscribe(listener.clone());

            let runner = StageRunner::new(
                fixture.settings().config_store(),
                Arc::new(registry),
                status,
            );

            Self {
                fixture,
                runner,
                listener,
            }
        }

        fn settings(&self) -> PipelineSettings {
            self.fixture.settings()
        }

        fn kinds(&self) -> Vec<StatusKind> {
            self.listener.updates().iter().map(|u| u.kind).collect()
        }
    }

    fn clean_plugins(
        plugins: Vec<RecordingPlugin>,
    ) -> impl Fn(&mut PluginExports) + Send + Sync + 'static {
        move |exports: &mut PluginExports| {
            for plugin in &plugins {
                exports.export::<CleanContext, _>(plugin.clone());
            }
        }
    }

    #[tokio::test]
    async fn test_all_plugins_succeed() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(
            vec![
                RecordingPlugin::new("Trim", &log),
                RecordingPlugin::new("Validate", &log),
            ],
        ));
        harness.fixture.install_module(StageKind::Clean, "mocks");
        harness
            .fixture
            .write_stage_config(StageKind::Clean, r#"{"enabled": true, "plugins": ["Trim", "Validate"]}"#);

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let report = harness.runner.run(&definition, &mut ctx).await.unwrap();

        assert_eq!(report.state, StageState::Completed);
        assert!(!report.skipped);
        assert_eq!(report.executed, vec!["Trim", "Validate"]);
        assert!(log.rolled_back().is_empty());
        assert_eq!(trail(&ctx), vec!["Trim", "Validate"]);
        assert_eq!(
            harness.kinds(),
            vec![
                StatusKind::StageStarted,
                StatusKind::PluginStarted,
                StatusKind::PluginSucceeded,
                StatusKind::PluginStarted,
                StatusKind::PluginSucceeded,
                StatusKind::StageCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_rolls_back_executed_plugins_only() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(
            vec![
                RecordingPlugin::new("Trim", &log),
                RecordingPlugin::new("Validate", &log).fail_execute("invalid payload"),
            ],
        ));
        harness.fixture.install_module(StageKind::Clean, "mocks");
        harness
            .fixture
            .write_stage_config(StageKind::Clean, r#"{"enabled": true, "plugins": ["Trim", "Validate"]}"#);

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let err = harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::PluginExecution { ref plugin, ref message, .. }
                if plugin == "Validate" && message == "invalid payload"
        ));
        assert_eq!(log.rolled_back(), vec!["Trim"]);
        assert_eq!(
            log.entries(),
            vec!["Trim.execute", "Validate.execute", "Trim.rollback"]
        );
    }

    #[tokio::test]
    async fn test_rollback_order_is_reverse_of_completion() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(
            vec![
                RecordingPlugin::new("p0", &log),
                RecordingPlugin::new("p1", &log),
                RecordingPlugin::new("p2", &log),
                RecordingPlugin::new("p3", &log).fail_execute("boom"),
                RecordingPlugin::new("p4", &log),
            ],
        ));
        harness.fixture.install_module(StageKind::Clean, "mocks");
        harness.fixture.write_stage_config(
            StageKind::Clean,
            r#"{"plugins": ["p0", "p1", "p2", "p3", "p4"]}"#,
        );

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert_eq!(log.executed(), vec!["p0", "p1", "p2", "p3"]);
        assert_eq!(log.rolled_back(), vec!["p2", "p1", "p0"]);
    }

    #[tokio::test]
    async fn test_rollback_failure_keeps_original_error() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(
            vec![
                RecordingPlugin::new("a", &log),
                RecordingPlugin::new("b", &log).fail_rollback("cannot undo"),
                RecordingPlugin::new("c", &log).fail_execute("original"),
            ],
        ));
        harness.fixture.install_module(StageKind::Clean, "mocks");
        harness
            .fixture
            .write_stage_config(StageKind::Clean, r#"{"plugins": ["a", "b", "c"]}"#);

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let err = harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert_eq!(err.to_string(), "Error in plugin c: original");
        assert_eq!(log.rolled_back(), vec!["b", "a"]);
        assert!(harness.kinds().contains(&StatusKind::RollbackFailed));
        assert_eq!(harness.kinds().last(), Some(&StatusKind::StageFailed));
    }

    #[tokio::test]
    async fn test_disabled_stage_invokes_nothing() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(vec![RecordingPlugin::new("Trim", &log)]));
        harness.fixture.install_module(StageKind::Clean, "mocks");
        harness
            .fixture
            .write_stage_config(StageKind::Clean, r#"{"enabled": false, "plugins": ["Trim", "Missing"]}"#);

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let report = harness.runner.run(&definition, &mut ctx).await.unwrap();

        assert!(report.skipped);
        assert_eq!(report.state, StageState::Completed);
        assert!(log.is_empty());
        assert_eq!(harness.kinds(), vec![StatusKind::StageSkipped]);
    }

    #[tokio::test]
    async fn test_missing_config_file_runs_nothing() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(vec![RecordingPlugin::new("Trim", &log)]));
        harness.fixture.install_module(StageKind::Clean, "mocks");

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let report = harness.runner.run(&definition, &mut ctx).await.unwrap();

        assert_eq!(report.state, StageState::Completed);
        assert!(report.executed.is_empty());
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_plugin_not_found_stops_before_slot() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(
            vec![
                RecordingPlugin::new("Trim", &log),
                RecordingPlugin::new("Validate", &log),
            ],
        ));
        harness.fixture.install_module(StageKind::Clean, "mocks");
        harness
            .fixture
            .write_stage_config(StageKind::Clean, r#"{"plugins": ["Trim", "Ghost", "Validate"]}"#);

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let err = harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert!(matches!(err, PipelineError::PluginNotFound { ref plugin, .. } if plugin == "Ghost"));
        assert_eq!(log.executed(), vec!["Trim"]);
        assert_eq!(log.rolled_back(), vec!["Trim"]);
    }

    #[tokio::test]
    async fn test_plugin_not_found_first_slot_runs_nothing() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(vec![RecordingPlugin::new("Trim", &log)]));
        harness
            .fixture
            .write_stage_config(StageKind::Clean, r#"{"plugins": ["Trim"]}"#);

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let err = harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert!(matches!(err, PipelineError::PluginNotFound { .. }));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_disabled_compensates_nothing() {
        let log = CallLog::new();
        let recorder = log.clone();
        let harness = Harness::new(move |exports: &mut PluginExports| {
            exports
                .export::<CleanupContext, _>(RecordingPlugin::new("Purge", &recorder))
                .export::<CleanupContext, _>(RecordingPlugin::new("Close", &recorder))
                .export::<CleanupContext, _>(
                    RecordingPlugin::new("Archive", &recorder).fail_execute("disk full"),
                );
        });
        harness.fixture.install_module(StageKind::Cleanup, "mocks");
        harness
            .fixture
            .write_stage_config(StageKind::Cleanup, r#"{"plugins": ["Purge", "Close", "Archive"]}"#);

        let definition = StageDefinition::<CleanupContext>::new(&harness.settings());
        assert!(!definition.rollback_enabled);

        let mut ctx = CleanupContext::new(Uuid::new_v4());
        let err = harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert_eq!(err.plugin(), Some("Archive"));
        assert_eq!(log.executed(), vec!["Purge", "Close", "Archive"]);
        assert!(log.rolled_back().is_empty());
        assert!(!harness.kinds().contains(&StatusKind::RollbackStarted));
    }

    #[tokio::test]
    async fn test_panicking_plugin_is_a_failure() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(
            vec![
                RecordingPlugin::new("Trim", &log),
                RecordingPlugin::new("Explode", &log).panic_on_execute(),
            ],
        ));
        harness.fixture.install_module(StageKind::Clean, "mocks");
        harness
            .fixture
            .write_stage_config(StageKind::Clean, r#"{"plugins": ["Trim", "Explode"]}"#);

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let err = harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert!(err.to_string().contains("plugin panicked"));
        assert_eq!(log.rolled_back(), vec!["Trim"]);
    }

    #[tokio::test]
    async fn test_config_parse_error_is_fatal() {
        let log = CallLog::new();
        let harness = Harness::new(clean_plugins(vec![RecordingPlugin::new("Trim", &log)]));
        harness.fixture.write_stage_config(StageKind::Clean, "{ broken");

        let definition = StageDefinition::<CleanContext>::new(&harness.settings());
        let mut ctx = CleanContext::new(Uuid::new_v4());
        let err = harness.runner.run(&definition, &mut ctx).await.unwrap_err();

        assert!(matches!(err, PipelineError::Config(_)));
        assert!(log.is_empty());
        assert_eq!(harness.kinds(), vec![StatusKind::StageFailed]);
    }
}
