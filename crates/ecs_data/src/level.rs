//! Level metadata.

use serde::{Deserialize, Serialize};

/// Describes one saved level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Level number; the key levels are stored and looked up by.
    pub number: i32,
    pub name: String,
    pub description: String,
}

impl LevelInfo {
    #[must_use]
    pub fn new(number: i32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for LevelInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.number, self.name)
    }
}
