//! # ecs_data
//!
//! Saving an [`EntityManager`](ecs_component::EntityManager) to a numbered
//! level and loading it back.
//!
//! - [`LevelStore`] / [`LevelTransaction`] are the backend seam. A save runs
//!   inside one transaction: commit on success, roll back on any failure.
//! - [`MemoryLevelStore`] is the bundled backend, persisted as JSON.
//! - [`ComponentCodecs`] maps kind names back to concrete component types.
//!   Only registered kinds can be saved or loaded.
//! - [`DataAdapter`] ties the three together and applies an optional
//!   [`Transformer`] before saving and after loading.

pub mod adapter;
pub mod codec;
pub mod error;
pub mod level;
pub mod memory;
pub mod store;
pub mod transform;

pub use adapter::DataAdapter;
pub use codec::ComponentCodecs;
pub use error::DataError;
pub use level::LevelInfo;
pub use memory::{MemoryLevelStore, MemoryTransaction};
pub use store::{ComponentRow, LevelStore, LevelTransaction};
pub use transform::Transformer;
