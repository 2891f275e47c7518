//! Entity manager error types.

use crate::component::ComponentTypeId;
use crate::entity::Entity;

/// Errors returned by entity and component mutations.
///
/// Queries never fail; a missing entity or component is reported as `None`
/// or an empty iterator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// Every id in `1..=max_id` is held by a live entity.
    #[error("the maximum number of entities has been reached (max id {max_id})")]
    CapacityExhausted { max_id: u64 },

    /// The entity already holds a component of this kind.
    #[error("{entity} already has a component of kind '{kind}'")]
    DuplicateComponent { entity: Entity, kind: &'static str },

    /// The entity holds no component of this kind.
    #[error("{entity} has no component of kind {kind}")]
    NotFound { entity: Entity, kind: ComponentTypeId },

    /// The entity is not live in this manager.
    #[error("{0} does not exist")]
    UnknownEntity(Entity),
}
