//! The context fields shared by every stage.

use crate::core::StageKind;
use std::collections::HashMap;
use uuid::Uuid;

/// Fields every stage context carries.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseContext {
    /// The pipeline run this context belongs to.
    pub run_id: Uuid,
    /// The stage that owns this context.
    pub stage: StageKind,
    /// Free-form values plugins may share within the stage.
    pub properties: HashMap<String, serde_json::Value>,
}

impl BaseContext {
    /// Creates a new base context.
    #[must_use]
    pub fn new(run_id: Uuid, stage: StageKind) -> Self {
        Self {
            run_id,
            stage,
            properties: HashMap::new(),
        }
    }

    /// Gets a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }

    /// Sets a property, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) -> Option<serde_json::Value> {
        self.properties.insert(key.into(), value)
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.properties.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties() {
        let mut base = BaseContext::new(Uuid::new_v4(), StageKind::Test);
        assert!(base.set("rows", serde_json::json!(3)).is_none());
        assert_eq!(base.get("rows"), Some(&serde_json::json!(3)));

        let previous = base.set("rows", serde_json::json!(4));
        assert_eq!(previous, Some(serde_json::json!(3)));

        assert_eq!(base.remove("rows"), Some(serde_json::json!(4)));
        assert!(base.get("rows").is_none());
    }
}
