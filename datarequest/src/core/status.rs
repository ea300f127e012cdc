//! Stage kind and lifecycle state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageKind {
    /// Prepares the environment for the request.
    Setup,
    /// Cleans the incoming payload.
    Clean,
    /// Performs the data request against the configured endpoints.
    PerformRequest,
    /// Verifies the request results.
    Test,
    /// Exports the results.
    Export,
    /// Releases resources. Never rolled back.
    Cleanup,
}

impl StageKind {
    /// Every stage, in the order the pipeline runs them.
    pub const ALL: [Self; 6] = [
        Self::Setup,
        Self::Clean,
        Self::PerformRequest,
        Self::Test,
        Self::Export,
        Self::Cleanup,
    ];

    /// Returns the stage name, also used as its plugin directory name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setup => "Setup",
            Self::Clean => "Clean",
            Self::PerformRequest => "PerformRequest",
            Self::Test => "Test",
            Self::Export => "Export",
            Self::Cleanup => "Cleanup",
        }
    }

    /// Returns the stage's configuration file name.
    #[must_use]
    pub const fn config_file(self) -> &'static str {
        match self {
            Self::Setup => "setup.json",
            Self::Clean => "clean.json",
            Self::PerformRequest => "performRequest.json",
            Self::Test => "test.json",
            Self::Export => "export.json",
            Self::Cleanup => "cleanup.json",
        }
    }

    /// Returns whether a failure in this stage compensates executed plugins.
    #[must_use]
    pub const fn rollback_enabled(self) -> bool {
        !matches!(self, Self::Cleanup)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The lifecycle state of one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    /// Not started yet.
    #[default]
    Pending,
    /// Plugins are being invoked.
    Running,
    /// Every configured plugin succeeded, or the stage is disabled.
    Completed,
    /// The stage failed without compensating executed plugins.
    Failed,
    /// Executed plugins are being compensated.
    RollingBack,
    /// Compensation finished. The failure still propagates.
    RolledBack,
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::RollingBack => write!(f, "rolling_back"),
            Self::RolledBack => write!(f, "rolled_back"),
        }
    }
}

impl StageState {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::RolledBack)
    }

    /// Returns true if the state represents a failed invocation.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::RollingBack | Self::RolledBack)
    }

    /// Returns true if `next` is a legal successor of this state.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running | Self::Completed | Self::Failed)
                | (Self::Running, Self::Completed | Self::Failed | Self::RollingBack)
                | (Self::RollingBack, Self::RolledBack)
        )
    }
}
