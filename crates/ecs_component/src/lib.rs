//! # ecs_component
//!
//! The entity/component index of the entity system: what an entity is, what
//! a component is, and the [`EntityManager`] that ties them together.
//!
//! This crate provides:
//!
//! - [`Entity`] — opaque, strictly positive `u64` identities.
//! - [`EntityAllocator`] — counter-first id allocation with a linear
//!   fallback scan once the counter saturates.
//! - [`Component`] / [`AnyComponent`] — typed and type-erased component
//!   access, keyed by a stable [`ComponentTypeId`].
//! - [`EntityManager`] — the component store, lifecycle observers and the
//!   cross-kind [`EntityComponents`] iterator.
//! - [`ManagerConfig`] — tunables for the manager.

pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod iter;
pub mod manager;

pub use component::{AnyComponent, Component, ComponentTypeId};
pub use config::ManagerConfig;
pub use entity::{Entity, EntityAllocator};
pub use error::EcsError;
pub use events::ObserverId;
pub use iter::EntityComponents;
pub use manager::EntityManager;
