//! Stage execution.
//!
//! A stage loads its config, discovers the plugins of its capability
//! contract, and runs the configured ids in order. The first failure stops
//! the stage; when rollback is enabled the plugins that already completed
//! are compensated last-first.

mod definition;
mod executed;
mod guard;
mod rollback;
mod runner;

pub use definition::{inject_connection_strings, ContextInitializer, StageDefinition, StageDefinitions};
pub use executed::ExecutedSet;
pub use rollback::{RollbackCoordinator, RollbackFailure, RollbackReport};
pub use runner::{StageReport, StageRunner};
