//! Level transformer for the demo.

use ecs_component::EntityManager;
use ecs_data::Transformer;
use tracing::debug;

use crate::components::{Name, Selected};

/// Drops the selection before saving and selects the first named entity
/// after loading.
#[derive(Debug, Default)]
pub struct SelectionTransformer;

impl Transformer for SelectionTransformer {
    fn transform_pre_save(&mut self, entities: &mut EntityManager) {
        let selected: Vec<_> = entities.entities_with::<Selected>().collect();
        for entity in selected {
            if entities.remove_component::<Selected>(entity).is_ok() {
                debug!(%entity, "selection dropped before save");
            }
        }
    }

    fn transform_post_load(&mut self, entities: &mut EntityManager) {
        if entities.first_entity_with::<Selected>().is_some() {
            return;
        }
        let Some(entity) = entities.entities_with::<Name>().min() else {
            return;
        };
        if entities.add_component(entity, Selected).is_ok() {
            debug!(%entity, "selected after load");
        }
    }
}
