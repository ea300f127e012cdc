//! Core domain model types.
//!
//! This module contains:
//! - The fixed stage sequence ([`StageKind`])
//! - Stage lifecycle states and transition tracking

mod lifecycle;
mod status;

pub use lifecycle::StageLifecycle;
pub use status::{StageKind, StageState};
