//! The world: one entity manager, one system manager, one clock.

use ecs_component::{EntityManager, ManagerConfig};
use tracing::debug;

use crate::error::SchedulerError;
use crate::manager::SystemManager;
use crate::step::GameStep;
use crate::system::{ExecutionType, Pass, System};

/// Everything one running game needs per frame.
#[derive(Debug, Default)]
pub struct World {
    entities: EntityManager,
    systems: SystemManager,
    game_step: GameStep,
}

impl World {
    /// Create an empty world with default manager settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world whose entity manager uses `config`.
    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            entities: EntityManager::with_config(config),
            systems: SystemManager::new(),
            game_step: GameStep::new(),
        }
    }

    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    #[must_use]
    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut SystemManager {
        &mut self.systems
    }

    #[must_use]
    pub fn game_step(&self) -> &GameStep {
        &self.game_step
    }

    /// Register a system at the end of the run order.
    ///
    /// # Errors
    ///
    /// See [`SystemManager::add_system`].
    pub fn add_system<S: System + 'static>(
        &mut self,
        system: S,
        execution: ExecutionType,
    ) -> Result<(), SchedulerError> {
        self.systems.add_system(system, execution)
    }

    /// Advance the clock and run the update pass.
    ///
    /// Returns the number of systems that failed.
    pub fn step(&mut self) -> usize {
        self.game_step.step();
        self.run(Pass::Update)
    }

    /// Run the draw pass against the current step.
    ///
    /// Returns the number of systems that failed.
    pub fn draw(&mut self) -> usize {
        self.run(Pass::Draw)
    }

    fn run(&mut self, pass: Pass) -> usize {
        let failures = self.systems.process(pass, &mut self.entities, &self.game_step);
        debug!(?pass, frame = self.game_step.frame(), failures, "pass finished");
        failures
    }
}
