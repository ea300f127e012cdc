//! Configuration loading.
//!
//! This module provides:
//! - Global configuration (connection strings, logging verbosity)
//! - Per-stage configuration (enabled flag, ordered plugin ids)
//! - The [`ConfigStore`] that loads both with defaulting on absence
//! - [`PipelineSettings`] describing the on-disk layout

mod global;
mod settings;
mod stage;
mod store;

pub use global::{GlobalConfig, LoggingConfig};
pub use settings::PipelineSettings;
pub use stage::StageConfig;
pub use store::ConfigStore;
