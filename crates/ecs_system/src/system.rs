//! The [`System`] trait and the passes a system can join.

use ecs_component::EntityManager;

use crate::step::GameStep;

/// One unit of per-frame game logic.
///
/// A system holds no reference to the entity manager; it is handed one on
/// every call to [`System::process`].
pub trait System: Send {
    /// Unique name of this system within a [`SystemManager`](crate::SystemManager).
    fn name(&self) -> &str;

    /// Disabled systems are skipped by the scheduler.
    fn enabled(&self) -> bool {
        true
    }

    /// Run one frame of this system's logic.
    ///
    /// # Errors
    ///
    /// Any error is logged by the scheduler and does not stop the systems
    /// that come after this one.
    fn process(&mut self, entities: &mut EntityManager, step: &GameStep) -> anyhow::Result<()>;
}

/// A single pass of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Update,
    Draw,
}

/// Which pass(es) a system takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionType {
    #[default]
    Update,
    Draw,
    UpdateAndDraw,
}

impl ExecutionType {
    /// Returns `true` if a system registered with this type runs in `pass`.
    #[must_use]
    pub fn runs_in(self, pass: Pass) -> bool {
        matches!(
            (self, pass),
            (Self::UpdateAndDraw, _) | (Self::Update, Pass::Update) | (Self::Draw, Pass::Draw)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_in() {
        assert!(ExecutionType::Update.runs_in(Pass::Update));
        assert!(!ExecutionType::Update.runs_in(Pass::Draw));
        assert!(ExecutionType::Draw.runs_in(Pass::Draw));
        assert!(!ExecutionType::Draw.runs_in(Pass::Update));
        assert!(ExecutionType::UpdateAndDraw.runs_in(Pass::Update));
        assert!(ExecutionType::UpdateAndDraw.runs_in(Pass::Draw));
    }
}
