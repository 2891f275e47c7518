//! The entity manager: the authoritative entity → component index.
//!
//! Components live in one table per kind, each mapping entity to instance.
//! Adding and looking up a component is O(1); removing an entity touches
//! every kind table.
//!
//! ## Threading
//!
//! Id allocation and release share one mutex, so [`EntityManager::create_entity`]
//! takes `&self` and can be called from many threads at once. Everything that
//! touches the component tables takes `&mut self` or borrows the manager for
//! the lifetime of its result, so the borrow checker supplies the external
//! synchronisation those operations need.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::Mutex;
use tracing::debug;

use crate::component::{AnyComponent, Component, ComponentTypeId};
use crate::config::ManagerConfig;
use crate::entity::{Entity, EntityAllocator};
use crate::error::EcsError;
use crate::events::{EventBus, ObserverId};
use crate::iter::EntityComponents;

/// One kind's components, keyed by the entity that holds them.
pub(crate) type KindTable = HashMap<Entity, Box<dyn AnyComponent>>;

/// Tracks live entities and owns every component attached to them.
///
/// Components are moved in by [`add_component`](Self::add_component) and only
/// ever lent out by queries. An entity that is not live never has components.
pub struct EntityManager {
    /// Id pool and the live-id set, guarded together.
    allocator: Mutex<EntityAllocator>,
    /// Component tables keyed by kind.
    components_by_kind: HashMap<ComponentTypeId, KindTable>,
    /// Lifecycle observers.
    events: EventBus,
}

impl EntityManager {
    /// Create an empty manager with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Create an empty manager with the given configuration.
    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            allocator: Mutex::new(EntityAllocator::with_max_id(config.max_entity_id)),
            components_by_kind: HashMap::new(),
            events: EventBus::default(),
        }
    }

    // -- Entity lifecycle --

    /// Create a new entity with no components.
    ///
    /// Safe to call concurrently through a shared reference; two calls never
    /// return the same id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExhausted`] if every id is live.
    pub fn create_entity(&self) -> Result<Entity, EcsError> {
        let entity = self.allocator.lock().allocate()?;
        debug!(%entity, "entity created");

        self.events.entity_added(entity);
        Ok(entity)
    }

    /// Remove an entity and every component attached to it.
    ///
    /// Component-removing observers see each component before it goes; the
    /// entity-removed observers run once everything is gone.
    ///
    /// Returns `false` (and notifies nobody) if the entity was not live.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        if !self.allocator.get_mut().release(entity) {
            return false;
        }

        for table in self.components_by_kind.values() {
            if let Some(component) = table.get(&entity) {
                self.events.component_removing(entity, &**component);
            }
        }
        for table in self.components_by_kind.values_mut() {
            table.remove(&entity);
        }
        debug!(%entity, "entity removed");

        self.events.entity_removed(entity);
        true
    }

    /// Remove every entity, notifying observers as [`remove_entity`](Self::remove_entity) does.
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self.allocator.get_mut().live().collect();
        for entity in entities {
            self.remove_entity(entity);
        }
    }

    /// Returns `true` if the entity is live.
    #[must_use]
    pub fn contains_entity(&self, entity: Entity) -> bool {
        self.allocator.lock().is_live(entity)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.allocator.lock().count()
    }

    /// Returns every live entity, in no particular order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.allocator.lock().live().collect()
    }

    // -- Component mutation --

    /// Attach a component to an entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownEntity`] if the entity is not live.
    /// - [`EcsError::DuplicateComponent`] if the entity already holds a
    ///   component of this kind. The held component is left untouched.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<(), EcsError> {
        self.add_boxed(entity, Box::new(component))
    }

    /// Attach an already type-erased component to an entity.
    ///
    /// # Errors
    ///
    /// Same as [`add_component`](Self::add_component).
    pub fn add_boxed(
        &mut self,
        entity: Entity,
        component: Box<dyn AnyComponent>,
    ) -> Result<(), EcsError> {
        if !self.allocator.get_mut().is_live(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }

        let table = self.components_by_kind.entry(component.kind()).or_default();
        match table.entry(entity) {
            Entry::Occupied(_) => Err(EcsError::DuplicateComponent {
                entity,
                kind: component.kind_name(),
            }),
            Entry::Vacant(slot) => {
                let component = slot.insert(component);
                self.events.component_added(entity, &**component);
                Ok(())
            }
        }
    }

    /// Detach and return the entity's component of kind `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotFound`] if the entity holds no `T`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T, EcsError> {
        let kind = T::component_type_id();
        let not_found = EcsError::NotFound { entity, kind };

        let holds_t = self
            .get_component_by_kind(entity, kind)
            .is_some_and(|component| component.is::<T>());
        if !holds_t {
            return Err(not_found);
        }

        self.remove_component_by_kind(entity, kind)?
            .into_any()
            .downcast::<T>()
            .map(|component| *component)
            .map_err(|_| not_found)
    }

    /// Detach and return the entity's component of the given kind.
    ///
    /// Component-removing observers run while the component is still indexed.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotFound`] if the entity holds no component of
    /// that kind.
    pub fn remove_component_by_kind(
        &mut self,
        entity: Entity,
        kind: ComponentTypeId,
    ) -> Result<Box<dyn AnyComponent>, EcsError> {
        let not_found = EcsError::NotFound { entity, kind };
        let Some(table) = self.components_by_kind.get_mut(&kind) else {
            return Err(not_found);
        };
        let Some(component) = table.get(&entity) else {
            return Err(not_found);
        };

        self.events.component_removing(entity, &**component);
        table.remove(&entity).ok_or(not_found)
    }

    // -- Component queries --

    /// Returns the entity's component of kind `T`, if it has one.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.get_component_by_kind(entity, T::component_type_id())?
            .downcast_ref()
    }

    /// Mutable form of [`get_component`](Self::get_component).
    #[must_use]
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components_by_kind
            .get_mut(&T::component_type_id())?
            .get_mut(&entity)?
            .downcast_mut()
    }

    /// Returns the entity's component of the given kind, if it has one.
    #[must_use]
    pub fn get_component_by_kind(
        &self,
        entity: Entity,
        kind: ComponentTypeId,
    ) -> Option<&dyn AnyComponent> {
        self.components_by_kind
            .get(&kind)?
            .get(&entity)
            .map(|component| &**component)
    }

    /// Returns `true` if the entity holds a component of kind `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.get_component_by_kind(entity, T::component_type_id()).is_some()
    }

    /// Every component of kind `T`, in no particular order.
    pub fn components<T: Component>(&self) -> impl Iterator<Item = &T> {
        self.components_by_kind(T::component_type_id())
            .filter_map(|component| component.downcast_ref())
    }

    /// Every component of the given kind, in no particular order.
    pub fn components_by_kind(
        &self,
        kind: ComponentTypeId,
    ) -> impl Iterator<Item = &dyn AnyComponent> {
        self.components_by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|table| table.values().map(|component| &**component))
    }

    /// Every entity holding a component of kind `T`, in no particular order.
    pub fn entities_with<T: Component>(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities_with_kind(T::component_type_id())
    }

    /// Every entity holding a component of the given kind.
    pub fn entities_with_kind(&self, kind: ComponentTypeId) -> impl Iterator<Item = Entity> + '_ {
        self.components_by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|table| table.keys().copied())
    }

    /// Some component of kind `T`, or `None` if there are none.
    ///
    /// Meant for kinds expected to exist exactly once (a camera, a clock);
    /// which instance is returned when there are several is unspecified.
    #[must_use]
    pub fn first_component<T: Component>(&self) -> Option<&T> {
        self.components::<T>().next()
    }

    /// Some entity holding a component of kind `T`, or `None`.
    #[must_use]
    pub fn first_entity_with<T: Component>(&self) -> Option<Entity> {
        self.entities_with::<T>().next()
    }

    /// Every component held by one entity, in no particular order.
    pub fn components_of(&self, entity: Entity) -> impl Iterator<Item = &dyn AnyComponent> {
        self.components_by_kind
            .values()
            .filter_map(move |table| table.get(&entity))
            .map(|component| &**component)
    }

    /// Total number of (entity, component) pairs.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components_by_kind.values().map(HashMap::len).sum()
    }

    /// Iterate over every (entity, component) pair across all kinds.
    pub fn iter(&self) -> EntityComponents<'_> {
        EntityComponents::new(self.components_by_kind.values())
    }

    // -- Observers --

    /// Call `observer` after each entity is created.
    pub fn on_entity_added(
        &mut self,
        observer: impl Fn(Entity) + Send + Sync + 'static,
    ) -> ObserverId {
        self.events.subscribe_entity_added(Box::new(observer))
    }

    /// Call `observer` after each entity and its components are removed.
    pub fn on_entity_removed(
        &mut self,
        observer: impl Fn(Entity) + Send + Sync + 'static,
    ) -> ObserverId {
        self.events.subscribe_entity_removed(Box::new(observer))
    }

    /// Call `observer` after each component is attached.
    pub fn on_component_added(
        &mut self,
        observer: impl Fn(Entity, &dyn AnyComponent) + Send + Sync + 'static,
    ) -> ObserverId {
        self.events.subscribe_component_added(Box::new(observer))
    }

    /// Call `observer` just before each component is detached, including
    /// the components swept away by [`remove_entity`](Self::remove_entity).
    pub fn on_component_removing(
        &mut self,
        observer: impl Fn(Entity, &dyn AnyComponent) + Send + Sync + 'static,
    ) -> ObserverId {
        self.events.subscribe_component_removing(Box::new(observer))
    }

    /// Drop a previously registered observer.
    ///
    /// Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.events.unsubscribe(id)
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entity_count())
            .field("kinds", &self.components_by_kind.len())
            .field("components", &self.component_count())
            .field("observers", &self.events.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a EntityManager {
    type Item = (Entity, &'a dyn AnyComponent);
    type IntoIter = EntityComponents<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
