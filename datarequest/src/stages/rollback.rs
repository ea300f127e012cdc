//! Reverse-order compensation of executed plugins.

use super::guard::guarded;
use super::ExecutedSet;
use crate::context::StageContext;
use crate::events::{StatusChannel, StatusUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// A compensation that failed. Logged and reported, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackFailure {
    /// The plugin whose rollback failed.
    pub plugin: String,
    /// The failure message.
    pub message: String,
}

/// Outcome of a best-effort rollback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackReport {
    /// Plugins compensated successfully, in the order they were compensated.
    pub compensated: Vec<String>,
    /// Plugins whose compensation failed.
    pub failures: Vec<RollbackFailure>,
}

impl RollbackReport {
    /// Returns the number of compensation attempts.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.compensated.len() + self.failures.len()
    }

    /// Returns true if every compensation succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the compensating operation of executed plugins, last first.
#[derive(Debug, Clone)]
pub struct RollbackCoordinator {
    status: Arc<StatusChannel>,
}

impl RollbackCoordinator {
    /// Creates a coordinator publishing on `status`.
    #[must_use]
    pub fn new(status: Arc<StatusChannel>) -> Self {
        Self { status }
    }

    /// Compensates every plugin in `executed`, from last completed to first.
    ///
    /// Each plugin gets exactly one attempt. A failing or panicking
    /// compensation is logged with the plugin's id and the unwind continues.
    pub async fn rollback<C: StageContext>(
        &self,
        stage: &str,
        executed: ExecutedSet<C>,
        ctx: &mut C,
    ) -> RollbackReport {
        let mut report = RollbackReport::default();

        info!(stage, count = executed.len(), "Initiating rollback...");
        self.status
            .publish(StatusUpdate::rollback_started(stage, executed.len()));

        for plugin in executed.into_reverse() {
            let id = plugin.id().to_string();
            match guarded(plugin.rollback(ctx)).await {
                Ok(()) => {
                    info!(stage, plugin = %id, "Rolled back plugin {id} successfully.");
                    self.status.publish(StatusUpdate::plugin_rolled_back(stage, &id));
                    report.compensated.push(id);
                }
                Err(err) => {
                    warn!(stage, plugin = %id, error = %err, "Error rolling back plugin {id}");
                    self.status
                        .publish(StatusUpdate::rollback_failed(stage, &id, &err.message));
                    report.failures.push(RollbackFailure {
                        plugin: id,
                        message: err.message,
                    });
                }
            }
        }

        report
    }
}
