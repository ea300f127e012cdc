//! Status listener implementations.

use super::{StatusListener, StatusUpdate};
use parking_lot::RwLock;
use tracing::{info, warn};

/// A listener that logs updates using the tracing framework.
///
/// Failure updates are logged at warn level, everything else at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl StatusListener for LoggingListener {
    fn on_status(&self, update: &StatusUpdate) {
        if update.kind.is_failure() {
            warn!(
                kind = ?update.kind,
                stage = ?update.stage,
                plugin = ?update.plugin,
                "STATUS: {}", update.message
            );
        } else {
            info!(
                kind = ?update.kind,
                stage = ?update.stage,
                plugin = ?update.plugin,
                "STATUS: {}", update.message
            );
        }
    }
}

/// A listener backed by a closure.
pub struct FnListener<F>
where
    F: Fn(&StatusUpdate) + Send + Sync,
{
    func: F,
}

impl<F> FnListener<F>
where
    F: Fn(&StatusUpdate) + Send + Sync,
{
    /// Creates a new closure listener.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> std::fmt::Debug for FnListener<F>
where
    F: Fn(&StatusUpdate) + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}

impl<F> StatusListener for FnListener<F>
where
    F: Fn(&StatusUpdate) + Send + Sync,
{
    fn on_status(&self, update: &StatusUpdate) {
        (self.func)(update);
    }
}

/// A listener that stores every update, for tests and reports.
#[derive(Debug, Default)]
pub struct CollectingListener {
    updates: RwLock<Vec<StatusUpdate>>,
}

impl CollectingListener {
    /// Creates a new collecting listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected updates.
    #[must_use]
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.read().clone()
    }

    /// Returns the message of every collected update.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.updates.read().iter().map(|u| u.message.clone()).collect()
    }

    /// Returns the number of collected updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.read().is_empty()
    }

    /// Clears all collected updates.
    pub fn clear(&self) {
        self.updates.write().clear();
    }
}

impl StatusListener for CollectingListener {
    fn on_status(&self, update: &StatusUpdate) {
        self.updates.write().push(update.clone());
    }
}
