//! The capability contract plugins implement, and typed export slots.

use crate::context::{
    CleanContext, CleanupContext, ExportContext, RequestContext, SetupContext, StageContext,
    TestContext,
};
use crate::errors::PluginError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// A unit of behavior participating in the stage whose context is `C`.
///
/// The context type selects the stage, so a plugin written for
/// [`CleanContext`] can only ever be run by the Clean stage.
#[async_trait]
pub trait Plugin<C: StageContext>: Send + Sync + Debug {
    /// Returns the identifier configured in the stage's plugin list.
    ///
    /// Matching against configuration is case-insensitive.
    fn id(&self) -> &str;

    /// Performs the plugin's work against the stage context.
    async fn execute(&self, ctx: &mut C) -> Result<(), PluginError>;

    /// Undoes the effects of a successful [`Plugin::execute`].
    ///
    /// Called at most once, and only if a later plugin in the same stage
    /// failed. Failures are logged and otherwise ignored.
    async fn rollback(&self, ctx: &mut C) -> Result<(), PluginError>;
}

/// A plugin instance shared between the discovered set and the executed set.
pub type SharedPlugin<C> = Arc<dyn Plugin<C>>;

/// Capability contract of the Setup stage.
pub type SetupPlugin = dyn Plugin<SetupContext>;
/// Capability contract of the Clean stage.
pub type CleanPlugin = dyn Plugin<CleanContext>;
/// Capability contract of the PerformRequest stage.
pub type PerformRequestPlugin = dyn Plugin<RequestContext>;
/// Capability contract of the Test stage.
pub type TestPlugin = dyn Plugin<TestContext>;
/// Capability contract of the Export stage.
pub type ExportPlugin = dyn Plugin<ExportContext>;
/// Capability contract of the Cleanup stage.
pub type CleanupPlugin = dyn Plugin<CleanupContext>;

/// Plugin instances exported by one module, sorted by capability contract.
#[derive(Default)]
pub struct PluginExports {
    setup: Vec<SharedPlugin<SetupContext>>,
    clean: Vec<SharedPlugin<CleanContext>>,
    perform_request: Vec<SharedPlugin<RequestContext>>,
    test: Vec<SharedPlugin<TestContext>>,
    export: Vec<SharedPlugin<ExportContext>>,
    cleanup: Vec<SharedPlugin<CleanupContext>>,
}

impl PluginExports {
    /// Creates an empty export table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exports a plugin under the contract of its context type.
    pub fn export<C, P>(&mut self, plugin: P) -> &mut Self
    where
        C: CapabilityContract,
        P: Plugin<C> + 'static,
    {
        C::slot(self).push(Arc::new(plugin));
        self
    }

    /// Removes and returns every plugin exported for contract `C`.
    pub fn take<C: CapabilityContract>(&mut self) -> Vec<SharedPlugin<C>> {
        std::mem::take(C::slot(self))
    }

    /// Returns the total number of exported plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.setup.len()
            + self.clean.len()
            + self.perform_request.len()
            + self.test.len()
            + self.export.len()
            + self.cleanup.len()
    }

    /// Returns true if nothing was exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for PluginExports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginExports")
            .field("setup", &self.setup.len())
            .field("clean", &self.clean.len())
            .field("perform_request", &self.perform_request.len())
            .field("test", &self.test.len())
            .field("export", &self.export.len())
            .field("cleanup", &self.cleanup.len())
            .finish()
    }
}

/// Context types that name a capability contract.
///
/// Maps a context type to its slot in [`PluginExports`], which is how
/// discovery keeps only the plugins implementing the stage's contract.
pub trait CapabilityContract: StageContext + Sized {
    /// Returns this contract's slot in an export table.
    fn slot(exports: &mut PluginExports) -> &mut Vec<SharedPlugin<Self>>;
}

macro_rules! impl_capability_contract {
    ($ctx:ty, $field:ident) => {
        impl CapabilityContract for $ctx {
            fn slot(exports: &mut PluginExports) -> &mut Vec<SharedPlugin<Self>> {
                &mut exports.$field
            }
        }
    };
}

impl_capability_contract!(SetupContext, setup);
impl_capability_contract!(CleanContext, clean);
impl_capability_contract!(RequestContext, perform_request);
impl_capability_contract!(TestContext, test);
impl_capability_contract!(ExportContext, export);
impl_capability_contract!(CleanupContext, cleanup);
