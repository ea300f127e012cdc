//! Stage execution contexts.
//!
//! Each stage owns one mutable context for the duration of its invocation.
//! Contexts are never shared between stages; values a stage needs from the
//! global configuration are injected before the first plugin runs.

mod base;
mod stages;

pub use base::BaseContext;
pub use stages::{
    CleanContext, CleanupContext, ExportContext, RequestContext, SetupContext, StageContext,
    TestContext,
};
