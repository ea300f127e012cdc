//! # DataRequest
//!
//! A staged data request pipeline with pluggable, compensating stages.
//!
//! A run passes through six fixed stages: Setup, Clean, PerformRequest,
//! Test, Export and Cleanup. Each stage:
//!
//! - **Loads its own config**: `<stage>.json` enables the stage and lists
//!   plugin ids in execution order
//! - **Discovers plugins**: `*.plugin.json` manifests in the stage's plugin
//!   directory select compiled-in modules
//! - **Rolls back on failure**: plugins that already completed are
//!   compensated in reverse order (every stage except Cleanup)
//!
//! The first failing stage halts the run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use datarequest::prelude::*;
//! use std::sync::Arc;
//!
//! let status = Arc::new(StatusChannel::new());
//! let manager = PipelineManager::new(
//!     PipelineSettings::default(),
//!     Arc::new(builtin::registry()),
//!     Arc::clone(&status),
//! )?;
//!
//! let report = manager.execute().await?;
//! status.close();
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod logging;
pub mod pipeline;
pub mod plugins;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{GlobalConfig, PipelineSettings, StageConfig};
    pub use crate::context::{
        BaseContext, CleanContext, CleanupContext, ExportContext, RequestContext, SetupContext,
        StageContext, TestContext,
    };
    pub use crate::core::{StageKind, StageState};
    pub use crate::errors::{ConfigError, PipelineError, PluginError};
    pub use crate::events::{
        CollectingListener, LoggingListener, StatusChannel, StatusListener, StatusUpdate,
    };
    pub use crate::pipeline::{PipelineManager, PipelineReport};
    pub use crate::plugins::{builtin, Plugin, PluginExports, PluginModule, PluginRegistry};
    pub use crate::stages::{StageReport, StageRunner};
}
