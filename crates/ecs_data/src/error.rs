//! Persistence error types.

use ecs_component::{EcsError, Entity};

/// Errors that can occur while saving or loading a level.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A component could not be serialised.
    #[error("failed to encode {kind} of {entity}: {source}")]
    Encode {
        entity: Entity,
        kind: String,
        #[source]
        source: rmp_serde::encode::Error,
    },

    /// A stored row could not be deserialised into its component type.
    #[error("failed to decode {kind} row of stored entity {entity}: {source}")]
    Decode {
        entity: u64,
        kind: String,
        #[source]
        source: rmp_serde::decode::Error,
    },

    /// No codec is registered for this component kind.
    #[error("no codec registered for component kind '{0}'")]
    UnknownKind(String),

    /// The store has no level with this number.
    #[error("level {0} does not exist")]
    UnknownLevel(i32),

    /// Backend failure.
    #[error("level store error: {0}")]
    Store(String),

    /// Failed to read or write the JSON form of a store.
    #[error("level store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The entity manager rejected a loaded entity or component.
    #[error(transparent)]
    Ecs(#[from] EcsError),
}
