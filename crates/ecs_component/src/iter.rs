//! Traversal over every (entity, component) pair in a manager.

use std::collections::hash_map;
use std::iter::FusedIterator;

use crate::component::{AnyComponent, ComponentTypeId};
use crate::entity::Entity;
use crate::manager::KindTable;

/// Lazy iterator over every (entity, component) pair across all kinds.
///
/// Created by [`EntityManager::iter`](crate::EntityManager::iter). The walk is
/// kind by kind, then entity by entity within a kind; neither level has a
/// defined order. The iterator borrows the manager, so the store cannot be
/// mutated while a traversal is live. To start over, create a new one.
pub struct EntityComponents<'a> {
    /// Cursor over the kind tables.
    kinds: hash_map::Values<'a, ComponentTypeId, KindTable>,
    /// Cursor inside the current kind table.
    current: Option<hash_map::Iter<'a, Entity, Box<dyn AnyComponent>>>,
}

impl<'a> EntityComponents<'a> {
    pub(crate) fn new(kinds: hash_map::Values<'a, ComponentTypeId, KindTable>) -> Self {
        Self {
            kinds,
            current: None,
        }
    }
}

impl<'a> Iterator for EntityComponents<'a> {
    type Item = (Entity, &'a dyn AnyComponent);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = &mut self.current
                && let Some((entity, component)) = current.next()
            {
                return Some((*entity, &**component));
            }
            self.current = Some(self.kinds.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let in_current = self.current.as_ref().map_or(0, ExactSizeIterator::len);
        if self.kinds.len() == 0 {
            (in_current, Some(in_current))
        } else {
            (in_current, None)
        }
    }
}

impl FusedIterator for EntityComponents<'_> {}
