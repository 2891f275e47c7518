//! Lifecycle observers for the entity manager.
//!
//! Four events are published, each synchronously and in subscription order:
//!
//! | event                | fired                                   |
//! |----------------------|-----------------------------------------|
//! | entity added         | after the id is reserved                |
//! | entity removed       | after the entity and its components are gone |
//! | component added      | after the component is indexed          |
//! | component removing   | before the component leaves the index   |
//!
//! Observers receive the entity (and a borrowed component) but no handle to
//! the manager, so they cannot mutate the store from inside a callback.

use crate::component::AnyComponent;
use crate::entity::Entity;

/// Callback for entity events.
pub type EntityObserver = Box<dyn Fn(Entity) + Send + Sync>;

/// Callback for component events.
pub type ComponentObserver = Box<dyn Fn(Entity, &dyn AnyComponent) + Send + Sync>;

/// Handle returned on subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registered observers, one list per event.
#[derive(Default)]
pub(crate) struct EventBus {
    next_id: u64,
    entity_added: Vec<(ObserverId, EntityObserver)>,
    entity_removed: Vec<(ObserverId, EntityObserver)>,
    component_added: Vec<(ObserverId, ComponentObserver)>,
    component_removing: Vec<(ObserverId, ComponentObserver)>,
}

impl EventBus {
    fn next_id(&mut self) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn subscribe_entity_added(&mut self, observer: EntityObserver) -> ObserverId {
        let id = self.next_id();
        self.entity_added.push((id, observer));
        id
    }

    pub(crate) fn subscribe_entity_removed(&mut self, observer: EntityObserver) -> ObserverId {
        let id = self.next_id();
        self.entity_removed.push((id, observer));
        id
    }

    pub(crate) fn subscribe_component_added(&mut self, observer: ComponentObserver) -> ObserverId {
        let id = self.next_id();
        self.component_added.push((id, observer));
        id
    }

    pub(crate) fn subscribe_component_removing(
        &mut self,
        observer: ComponentObserver,
    ) -> ObserverId {
        let id = self.next_id();
        self.component_removing.push((id, observer));
        id
    }

    /// Drop the observer with the given id from whichever list holds it.
    ///
    /// Returns `true` if an observer was removed.
    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.len();
        self.entity_added.retain(|(oid, _)| *oid != id);
        self.entity_removed.retain(|(oid, _)| *oid != id);
        self.component_added.retain(|(oid, _)| *oid != id);
        self.component_removing.retain(|(oid, _)| *oid != id);
        self.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entity_added.len()
            + self.entity_removed.len()
            + self.component_added.len()
            + self.component_removing.len()
    }

    pub(crate) fn entity_added(&self, entity: Entity) {
        for (_, observer) in &self.entity_added {
            observer(entity);
        }
    }

    pub(crate) fn entity_removed(&self, entity: Entity) {
        for (_, observer) in &self.entity_removed {
            observer(entity);
        }
    }

    pub(crate) fn component_added(&self, entity: Entity, component: &dyn AnyComponent) {
        for (_, observer) in &self.component_added {
            observer(entity, component);
        }
    }

    pub(crate) fn component_removing(&self, entity: Entity, component: &dyn AnyComponent) {
        for (_, observer) in &self.component_removing {
            observer(entity, component);
        }
    }
}
