//! Stage-specific context types.

use super::BaseContext;
use crate::core::StageKind;
use std::fmt::Debug;
use uuid::Uuid;

/// A mutable context owned by one stage invocation.
///
/// Every plugin in the stage receives the same instance by mutable
/// reference, one plugin at a time.
pub trait StageContext: Send + Sync + Debug + 'static {
    /// The stage this context type belongs to.
    const KIND: StageKind;

    /// Creates an empty context for the given run.
    fn new(run_id: Uuid) -> Self;

    /// Returns the shared base fields.
    fn base(&self) -> &BaseContext;

    /// Returns the shared base fields mutably.
    fn base_mut(&mut self) -> &mut BaseContext;

    /// Returns the run id.
    fn run_id(&self) -> Uuid {
        self.base().run_id
    }
}

macro_rules! impl_stage_context {
    ($ty:ident, $kind:expr $(, $field:ident)*) => {
        impl StageContext for $ty {
            const KIND: StageKind = $kind;

            fn new(run_id: Uuid) -> Self {
                Self {
                    base: BaseContext::new(run_id, $kind),
                    $($field: Default::default(),)*
                }
            }

            fn base(&self) -> &BaseContext {
                &self.base
            }

            fn base_mut(&mut self) -> &mut BaseContext {
                &mut self.base
            }
        }
    };
}

/// Context for the Setup stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupContext {
    /// Shared fields.
    pub base: BaseContext,
}

/// Context for the Clean stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanContext {
    /// Shared fields.
    pub base: BaseContext,
    /// The text payload being cleaned.
    pub data: String,
}

/// Context for the PerformRequest stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Shared fields.
    pub base: BaseContext,
    /// Connection string of the request source.
    pub input_connection_string: String,
    /// Connection string of the request destination.
    pub output_connection_string: String,
}

/// Context for the Test stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TestContext {
    /// Shared fields.
    pub base: BaseContext,
}

/// Context for the Export stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportContext {
    /// Shared fields.
    pub base: BaseContext,
}

/// Context for the Cleanup stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupContext {
    /// Shared fields.
    pub base: BaseContext,
}

impl_stage_context!(SetupContext, StageKind::Setup);
impl_stage_context!(CleanContext, StageKind::Clean, data);
impl_stage_context!(
    RequestContext,
    StageKind::PerformRequest,
    input_connection_string,
    output_connection_string
);
impl_stage_context!(TestContext, StageKind::Test);
impl_stage_context!(ExportContext, StageKind::Export);
impl_stage_context!(CleanupContext, StageKind::Cleanup);
