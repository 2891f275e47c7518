//! Entity type and identity allocation.
//!
//! An [`Entity`] is a lightweight `u64` identifier with no inherent data. Ids
//! are handed out by an [`EntityAllocator`], which also remembers every id
//! that is currently live so that a live id is never handed out twice.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EcsError;

/// Largest id an allocator is allowed to hand out by default.
pub const DEFAULT_MAX_ENTITY_ID: u64 = u32::MAX as u64;

/// Handle to a game object in an [`EntityManager`](crate::EntityManager).
///
/// Allocated ids are strictly positive; `0` is kept for [`Entity::INVALID`].
/// The manager owns the components keyed by this handle, not the handle
/// itself: a copy outlives `remove_entity` and goes stale. Once the
/// allocator's counter saturates, a stale id can be handed out again by the
/// fallback scan, so holders must drop handles to removed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// Sentinel for "no entity". No allocator hands it out.
    pub const INVALID: Entity = Entity(0);

    /// Wrap a raw id, e.g. one read back from a log line or a test fixture.
    /// The id is not checked against any manager.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// `false` only for [`Entity::INVALID`]. Says nothing about liveness;
    /// ask the manager for that.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates entity ids and tracks which of them are live.
///
/// Ids are taken from a monotonically increasing counter starting at
/// [`EntityAllocator::MIN_ID`]. Once the counter has passed `max_id` it never
/// moves again, and every later allocation scans `MIN_ID..=max_id` for the
/// first id that is not live. The scan is slow on purpose: it only kicks in
/// after the whole id space has been handed out once.
///
/// The allocator itself is not synchronised; the entity manager keeps it
/// behind a mutex so allocation and release form one critical section.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Lowest id the counter has not handed out yet.
    lowest_unassigned: u64,
    /// Largest id that may be handed out.
    max_id: u64,
    /// Ids currently held by live entities.
    live: HashSet<u64>,
}

impl EntityAllocator {
    /// The smallest assignable id. `0` is reserved for [`Entity::INVALID`].
    pub const MIN_ID: u64 = 1;

    /// Creates a new allocator covering `1..=DEFAULT_MAX_ENTITY_ID`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_id(DEFAULT_MAX_ENTITY_ID)
    }

    /// Creates a new allocator covering `1..=max_id`.
    ///
    /// `max_id` is clamped to `[1, u64::MAX - 1]` so the counter can always
    /// step one past it.
    #[must_use]
    pub fn with_max_id(max_id: u64) -> Self {
        Self {
            lowest_unassigned: Self::MIN_ID,
            max_id: max_id.clamp(Self::MIN_ID, u64::MAX - 1),
            live: HashSet::new(),
        }
    }

    /// Allocates an id that no live entity holds and marks it live.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExhausted`] if every id in
    /// `1..=max_id` is live.
    pub fn allocate(&mut self) -> Result<Entity, EcsError> {
        let id = if self.lowest_unassigned <= self.max_id {
            let id = self.lowest_unassigned;
            self.lowest_unassigned += 1;
            id
        } else {
            self.scan_for_free_id()?
        };

        self.live.insert(id);
        Ok(Entity(id))
    }

    fn scan_for_free_id(&self) -> Result<u64, EcsError> {
        let capacity_exhausted = EcsError::CapacityExhausted {
            max_id: self.max_id,
        };
        if self.live.len() as u64 >= self.max_id {
            return Err(capacity_exhausted);
        }

        warn!(
            max_id = self.max_id,
            live = self.live.len(),
            "entity id counter saturated, scanning for a free id"
        );
        (Self::MIN_ID..=self.max_id)
            .find(|id| !self.live.contains(id))
            .ok_or(capacity_exhausted)
    }

    /// Marks `entity`'s id as free again.
    ///
    /// Returns `true` if the id was live.
    pub fn release(&mut self, entity: Entity) -> bool {
        self.live.remove(&entity.id())
    }

    /// Returns `true` if `entity`'s id is currently live.
    #[must_use]
    pub fn is_live(&self, entity: Entity) -> bool {
        self.live.contains(&entity.id())
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.live.len()
    }

    /// Returns every live entity, in no particular order.
    pub fn live(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.iter().copied().map(Entity)
    }

    /// Largest id this allocator may hand out.
    #[must_use]
    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    /// Returns `true` once the counter has handed out every id up to
    /// `max_id` and allocation falls back to scanning.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.lowest_unassigned > self.max_id
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
