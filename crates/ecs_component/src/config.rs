//! Entity manager configuration.

use serde::{Deserialize, Serialize};

use crate::entity::DEFAULT_MAX_ENTITY_ID;

/// Tunables for an [`EntityManager`](crate::EntityManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Largest entity id the manager may hand out.
    pub max_entity_id: u64,
}

impl ManagerConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_entity_id: DEFAULT_MAX_ENTITY_ID,
        }
    }

    /// Override the largest entity id.
    #[must_use]
    pub fn with_max_entity_id(mut self, max_entity_id: u64) -> Self {
        self.max_entity_id = max_entity_id;
        self
    }

    /// Parse a config from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}
