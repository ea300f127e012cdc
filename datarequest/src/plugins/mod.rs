//! Plugin contracts, module loading and discovery.
//!
//! This module provides:
//! - The per-stage capability contract ([`Plugin`])
//! - Compiled-in plugin modules ([`PluginModule`]) and their exports
//! - Directory-scoped discovery ([`PluginRegistry`]) and lookup ([`PluginSet`])
//! - The bundled `core` module

pub mod builtin;
mod contract;
mod module;
mod registry;

pub use contract::{
    CapabilityContract, CleanPlugin, CleanupPlugin, ExportPlugin, PerformRequestPlugin, Plugin,
    PluginExports, SetupPlugin, SharedPlugin, TestPlugin,
};
pub use module::{ModuleManifest, PluginModule, MANIFEST_SUFFIX, MODULE_CONTRACT_VERSION};
pub use registry::{PluginRegistry, PluginSet};
