//! The bundled `core` plugin module.

use super::{Plugin, PluginExports, PluginModule, PluginRegistry};
use crate::context::{CleanContext, StageContext};
use crate::errors::PluginError;
use async_trait::async_trait;
use tracing::info;

/// Name of the bundled module.
pub const CORE_MODULE: &str = "core";

const ORIGINAL_DATA_KEY: &str = "audit_request_clean.original";

/// Trims surrounding whitespace from the Clean stage payload.
///
/// Rollback restores the payload as it was before trimming.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditRequestCleanPlugin;

#[async_trait]
impl Plugin<CleanContext> for AuditRequestCleanPlugin {
    fn id(&self) -> &str {
        "AuditRequestCleanPlugin"
    }

    async fn execute(&self, ctx: &mut CleanContext) -> Result<(), PluginError> {
        info!(plugin = self.id(), "Starting cleaning operation");
        if !ctx.data.is_empty() {
            let original = ctx.data.clone();
            ctx.data = ctx.data.trim().to_string();
            ctx.base_mut()
                .set(ORIGINAL_DATA_KEY, serde_json::Value::String(original));
        }
        Ok(())
    }

    async fn rollback(&self, ctx: &mut CleanContext) -> Result<(), PluginError> {
        info!(plugin = self.id(), "Rolling back cleaning operation");
        if let Some(serde_json::Value::String(original)) = ctx.base_mut().remove(ORIGINAL_DATA_KEY) {
            ctx.data = original;
        }
        Ok(())
    }
}

/// The module exporting every bundled plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoreModule;

impl PluginModule for CoreModule {
    fn name(&self) -> &str {
        CORE_MODULE
    }

    fn exports(&self, exports: &mut PluginExports) {
        exports.export::<CleanContext, _>(AuditRequestCleanPlugin);
    }
}

/// Returns a registry holding every compiled-in module.
#[must_use]
pub fn registry() -> PluginRegistry {
    PluginRegistry::new().with_module(CoreModule)
}
