//! Systems driving the demo.

use ecs_component::EntityManager;
use ecs_system::{GameStep, System};
use tracing::info;

use crate::components::{Name, Position, Selected, Velocity};

/// Moves every entity with a velocity.
pub struct Movement;

impl System for Movement {
    fn name(&self) -> &str {
        "movement"
    }

    fn process(&mut self, entities: &mut EntityManager, step: &GameStep) -> anyhow::Result<()> {
        let dt = step.delta().as_secs_f32();
        let moving: Vec<_> = entities.entities_with::<Velocity>().collect();
        for entity in moving {
            let Some(&velocity) = entities.get_component::<Velocity>(entity) else {
                continue;
            };
            if let Some(position) = entities.get_component_mut::<Position>(entity) {
                position.x += velocity.dx * dt;
                position.y += velocity.dy * dt;
            }
        }
        Ok(())
    }
}

/// Wraps positions back into a square arena.
pub struct Wrap {
    pub size: f32,
}

impl System for Wrap {
    fn name(&self) -> &str {
        "wrap"
    }

    fn process(&mut self, entities: &mut EntityManager, _step: &GameStep) -> anyhow::Result<()> {
        anyhow::ensure!(self.size > 0.0, "arena size must be positive, got {}", self.size);
        let placed: Vec<_> = entities.entities_with::<Position>().collect();
        for entity in placed {
            if let Some(position) = entities.get_component_mut::<Position>(entity) {
                position.x = position.x.rem_euclid(self.size);
                position.y = position.y.rem_euclid(self.size);
            }
        }
        Ok(())
    }
}

/// Logs where the selected entity is, every `every` frames.
pub struct Report {
    pub every: u64,
}

impl System for Report {
    fn name(&self) -> &str {
        "report"
    }

    fn process(&mut self, entities: &mut EntityManager, step: &GameStep) -> anyhow::Result<()> {
        if self.every == 0 || step.frame() % self.every != 0 {
            return Ok(());
        }
        let Some(selected) = entities.first_entity_with::<Selected>() else {
            info!(frame = step.frame(), entities = entities.entity_count(), "nothing selected");
            return Ok(());
        };
        let label = entities
            .get_component::<Name>(selected)
            .map_or("<unnamed>", |name| name.0.as_str());
        let position = entities
            .get_component::<Position>(selected)
            .ok_or_else(|| anyhow::anyhow!("selected entity {selected} has no position"))?;
        info!(
            frame = step.frame(),
            delta_ms = step.delta_ms(),
            %selected,
            entity_name = label,
            x = position.x,
            y = position.y,
            "selected entity"
        );
        Ok(())
    }
}
