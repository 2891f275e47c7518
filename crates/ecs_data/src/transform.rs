//! Hooks that reshape a manager around persistence.

use ecs_component::EntityManager;

/// Adjusts a manager's contents before a save and after a load.
///
/// Typical uses are stripping runtime-only components before saving and
/// rebuilding them after loading.
pub trait Transformer: Send {
    /// Runs before a save, on the manager about to be written.
    fn transform_pre_save(&mut self, entities: &mut EntityManager);

    /// Runs after a successful load, on the populated manager.
    fn transform_post_load(&mut self, entities: &mut EntityManager);
}
