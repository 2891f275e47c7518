//! # ecs_system
//!
//! Per-frame processing on top of the entity manager.
//!
//! A [`System`] owns the logic for one aspect of the game and is handed the
//! [`EntityManager`](ecs_component::EntityManager) explicitly on every call.
//! A [`SystemManager`] runs its systems in a fixed order, and a [`World`]
//! bundles one manager of each with a [`GameStep`] clock.
//!
//! ## Usage
//!
//! ```rust
//! use ecs_component::EntityManager;
//! use ecs_system::{ExecutionType, GameStep, System, World};
//!
//! struct Counter;
//!
//! impl System for Counter {
//!     fn name(&self) -> &str {
//!         "counter"
//!     }
//!
//!     fn process(
//!         &mut self,
//!         entities: &mut EntityManager,
//!         _step: &GameStep,
//!     ) -> anyhow::Result<()> {
//!         let _ = entities.entity_count();
//!         Ok(())
//!     }
//! }
//!
//! let mut world = World::new();
//! world.add_system(Counter, ExecutionType::Update).unwrap();
//! world.step();
//! ```

pub mod error;
pub mod manager;
pub mod step;
pub mod system;
pub mod world;

pub use error::SchedulerError;
pub use manager::SystemManager;
pub use step::GameStep;
pub use system::{ExecutionType, Pass, System};
pub use world::World;
