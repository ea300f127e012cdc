//! Transition tracking for a single stage invocation.

use super::StageState;
use tracing::debug;

/// Records the state path of one stage invocation.
///
/// Illegal transitions are ignored and logged; the state never moves
/// backwards.
#[derive(Debug, Clone)]
pub struct StageLifecycle {
    stage: String,
    history: Vec<StageState>,
}

impl StageLifecycle {
    /// Creates a lifecycle in the `Pending` state.
    #[must_use]
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            history: vec![StageState::Pending],
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> StageState {
        self.history.last().copied().unwrap_or_default()
    }

    /// Returns every state visited, oldest first.
    #[must_use]
    pub fn history(&self) -> &[StageState] {
        &self.history
    }

    /// Moves to `next`. Returns false if the transition is not allowed.
    pub fn transition(&mut self, next: StageState) -> bool {
        let current = self.state();
        if !current.can_transition_to(next) {
            debug!(stage = %self.stage, from = %current, to = %next, "Ignoring illegal stage transition");
            return false;
        }
        debug!(stage = %self.stage, from = %current, to = %next, "Stage transition");
        self.history.push(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_path() {
        let mut lifecycle = StageLifecycle::new("Clean");
        assert!(lifecycle.transition(StageState::Running));
        assert!(lifecycle.transition(StageState::RollingBack));
        assert!(lifecycle.transition(StageState::RolledBack));

        assert_eq!(
            lifecycle.history(),
            &[
                StageState::Pending,
                StageState::Running,
                StageState::RollingBack,
                StageState::RolledBack
            ]
        );
    }

    #[test]
    fn test_illegal_transition_is_rejected() {
        let mut lifecycle = StageLifecycle::new("Export");
        assert!(lifecycle.transition(StageState::Completed));
        assert!(!lifecycle.transition(StageState::Running));
        assert_eq!(lifecycle.state(), StageState::Completed);
    }
}
