//! Status updates broadcast while the pipeline runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a status update reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// A stage began invoking plugins.
    StageStarted,
    /// A stage was disabled and skipped.
    StageSkipped,
    /// Every plugin in a stage succeeded.
    StageCompleted,
    /// A stage failed.
    StageFailed,
    /// A plugin's primary operation is about to run.
    PluginStarted,
    /// A plugin's primary operation succeeded.
    PluginSucceeded,
    /// A plugin's primary operation failed.
    PluginFailed,
    /// Compensation of executed plugins began.
    RollbackStarted,
    /// A plugin was compensated.
    PluginRolledBack,
    /// A plugin's compensation failed.
    RollbackFailed,
    /// Every stage completed.
    PipelineCompleted,
    /// The pipeline stopped on a stage failure.
    PipelineHalted,
}

impl StatusKind {
    /// Returns true for kinds reporting a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::StageFailed | Self::PluginFailed | Self::RollbackFailed | Self::PipelineHalted
        )
    }
}

/// A human-readable progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// What happened.
    pub kind: StatusKind,
    /// The progress message shown to listeners.
    pub message: String,
    /// The stage involved, if any.
    pub stage: Option<String>,
    /// The plugin involved, if any.
    pub plugin: Option<String>,
    /// When the update was created (ISO 8601).
    pub timestamp: String,
}

impl StatusUpdate {
    /// Creates a new status update.
    #[must_use]
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stage: None,
            plugin: None,
            timestamp: crate::utils::iso_timestamp(),
        }
    }

    /// Sets the stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Sets the plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    /// Creates a "stage started" update.
    #[must_use]
    pub fn stage_started(stage: &str) -> Self {
        Self::new(StatusKind::StageStarted, format!("Starting stage {stage}."))
            .with_stage(stage)
    }

    /// Creates a "stage skipped" update.
    #[must_use]
    pub fn stage_skipped(stage: &str) -> Self {
        Self::new(
            StatusKind::StageSkipped,
            format!("Stage {stage} is disabled via configuration."),
        )
        .with_stage(stage)
    }

    /// Creates a "stage completed" update.
    #[must_use]
    pub fn stage_completed(stage: &str) -> Self {
        Self::new(StatusKind::StageCompleted, format!("Stage {stage} completed."))
            .with_stage(stage)
    }

    /// Creates a "stage failed" update.
    #[must_use]
    pub fn stage_failed(stage: &str, error: &str) -> Self {
        Self::new(StatusKind::StageFailed, format!("Stage {stage} failed: {error}"))
            .with_stage(stage)
    }

    /// Creates a "plugin started" update.
    #[must_use]
    pub fn plugin_started(stage: &str, plugin: &str) -> Self {
        Self::new(
            StatusKind::PluginStarted,
            format!("Starting plugin {plugin} in stage {stage}."),
        )
        .with_stage(stage)
        .with_plugin(plugin)
    }

    /// Creates a "plugin succeeded" update.
    #[must_use]
    pub fn plugin_succeeded(stage: &str, plugin: &str) -> Self {
        Self::new(
            StatusKind::PluginSucceeded,
            format!("Plugin {plugin} in stage {stage} completed."),
        )
        .with_stage(stage)
        .with_plugin(plugin)
    }

    /// Creates a "plugin failed" update.
    #[must_use]
    pub fn plugin_failed(stage: &str, plugin: &str, error: &str) -> Self {
        Self::new(StatusKind::PluginFailed, format!("Error in plugin {plugin}: {error}"))
            .with_stage(stage)
            .with_plugin(plugin)
    }

    /// Creates a "rollback started" update.
    #[must_use]
    pub fn rollback_started(stage: &str, count: usize) -> Self {
        Self::new(
            StatusKind::RollbackStarted,
            format!("Initiating rollback of {count} plugin(s) in stage {stage}..."),
        )
        .with_stage(stage)
    }

    /// Creates a "plugin rolled back" update.
    #[must_use]
    pub fn plugin_rolled_back(stage: &str, plugin: &str) -> Self {
        Self::new(
            StatusKind::PluginRolledBack,
            format!("Rolled back plugin {plugin} successfully."),
        )
        .with_stage(stage)
        .with_plugin(plugin)
    }

    /// Creates a "rollback failed" update.
    #[must_use]
    pub fn rollback_failed(stage: &str, plugin: &str, error: &str) -> Self {
        Self::new(
            StatusKind::RollbackFailed,
            format!("Error rolling back plugin {plugin}: {error}"),
        )
        .with_stage(stage)
        .with_plugin(plugin)
    }

    /// Creates a "pipeline completed" update.
    #[must_use]
    pub fn pipeline_completed() -> Self {
        Self::new(
            StatusKind::PipelineCompleted,
            "DataRequestPipeline completed successfully.",
        )
    }

    /// Creates a "pipeline halted" update.
    #[must_use]
    pub fn pipeline_halted(error: &str) -> Self {
        Self::new(
            StatusKind::PipelineHalted,
            format!("Pipeline halted due to error: {error}"),
        )
    }
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
