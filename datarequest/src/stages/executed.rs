//! The ordered record of plugins that completed within a stage.

use crate::context::StageContext;
use crate::plugins::SharedPlugin;

/// Plugins whose primary operation succeeded, in completion order.
pub struct ExecutedSet<C: StageContext> {
    plugins: Vec<SharedPlugin<C>>,
}

impl<C: StageContext> ExecutedSet<C> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self { plugins: Vec::new() }
    }

    /// Records a completed plugin.
    pub fn push(&mut self, plugin: SharedPlugin<C>) {
        self.plugins.push(plugin);
    }

    /// Returns the ids of completed plugins, in completion order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.id().to_string()).collect()
    }

    /// Returns the number of completed plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin has completed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Consumes the set, yielding plugins from last completed to first.
    pub fn into_reverse(self) -> impl Iterator<Item = SharedPlugin<C>> {
        self.plugins.into_iter().rev()
    }
}

impl<C: StageContext> Default for ExecutedSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: StageContext> std::fmt::Debug for ExecutedSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutedSet")
            .field("plugins", &self.ids())
            .finish()
    }
}
