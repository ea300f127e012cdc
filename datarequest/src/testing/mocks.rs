//! Mock plugins and modules for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::context::StageContext;
use crate::errors::PluginError;
use crate::plugins::{Plugin, PluginExports, PluginModule};

/// Property key under which [`RecordingPlugin`] appends its id on execute.
pub const TRAIL_KEY: &str = "trail";

/// A shared, ordered record of plugin operations.
///
/// Entries have the form `"<id>.execute"` or `"<id>.rollback"`.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Returns every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Returns the ids whose execute ran, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.ids_with_suffix(".execute")
    }

    /// Returns the ids whose rollback ran, in order.
    #[must_use]
    pub fn rolled_back(&self) -> Vec<String> {
        self.ids_with_suffix(".rollback")
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Clears the log.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn ids_with_suffix(&self, suffix: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| e.strip_suffix(suffix).map(String::from))
            .collect()
    }
}

/// A plugin usable in any stage that records its calls.
///
/// Execute and rollback succeed unless configured to fail or panic.
#[derive(Debug, Clone)]
pub struct RecordingPlugin {
    id: String,
    log: CallLog,
    execute_error: Option<String>,
    rollback_error: Option<String>,
    panic_on_execute: bool,
}

impl RecordingPlugin {
    /// Creates a plugin that always succeeds.
    #[must_use]
    pub fn new(id: impl Into<String>, log: &CallLog) -> Self {
        Self {
            id: id.into(),
            log: log.clone(),
            execute_error: None,
            rollback_error: None,
            panic_on_execute: false,
        }
    }

    /// Makes execute fail with `message`.
    #[must_use]
    pub fn fail_execute(mut self, message: impl Into<String>) -> Self {
        self.execute_error = Some(message.into());
        self
    }

    /// Makes rollback fail with `message`.
    #[must_use]
    pub fn fail_rollback(mut self, message: impl Into<String>) -> Self {
        self.rollback_error = Some(message.into());
        self
    }

    /// Makes execute panic.
    #[must_use]
    pub fn panic_on_execute(mut self) -> Self {
        self.panic_on_execute = true;
        self
    }
}

#[async_trait]
impl<C: StageContext> Plugin<C> for RecordingPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    async fn execute(&self, ctx: &mut C) -> Result<(), PluginError> {
        self.log.record(format!("{}.execute", self.id));
        let base = ctx.base_mut();
        let mut trail = base
            .remove(TRAIL_KEY)
            .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
            .unwrap_or_default();
        trail.push(self.id.clone());
        base.set(TRAIL_KEY, serde_json::json!(trail));

        if self.panic_on_execute {
            panic!("{} panicked", self.id);
        }
        match &self.execute_error {
            Some(message) => Err(PluginError::new(message.clone())),
            None => Ok(()),
        }
    }

    async fn rollback(&self, _ctx: &mut C) -> Result<(), PluginError> {
        self.log.record(format!("{}.rollback", self.id));
        match &self.rollback_error {
            Some(message) => Err(PluginError::new(message.clone())),
            None => Ok(()),
        }
    }
}

/// Returns the ids [`RecordingPlugin`]s appended to a context, in order.
#[must_use]
pub fn trail<C: StageContext>(ctx: &C) -> Vec<String> {
    ctx.base()
        .get(TRAIL_KEY)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

type ExportFn = Box<dyn Fn(&mut PluginExports) + Send + Sync>;

/// A module whose exports are produced by a closure.
pub struct TestModule {
    name: String,
    exports: ExportFn,
}

impl TestModule {
    /// Creates a new test module.
    pub fn new<F>(name: impl Into<String>, exports: F) -> Self
    where
        F: Fn(&mut PluginExports) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            exports: Box::new(exports),
        }
    }
}

impl std::fmt::Debug for TestModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestModule").field("name", &self.name).finish()
    }
}

impl PluginModule for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn exports(&self, exports: &mut PluginExports) {
        (self.exports)(exports);
    }
}
