//! Ordered registry of systems.
//!
//! Systems run in the order they sit in the registry: registration order for
//! [`SystemManager::add_system`], or an explicit position for
//! [`SystemManager::insert_system`]. Names are unique.

use ecs_component::EntityManager;
use tracing::{debug, warn};

use crate::error::SchedulerError;
use crate::step::GameStep;
use crate::system::{ExecutionType, Pass, System};

/// A registered system and the passes it runs in.
struct SystemEntry {
    execution: ExecutionType,
    system: Box<dyn System>,
}

/// Runs registered systems in order, once per pass.
#[derive(Default)]
pub struct SystemManager {
    systems: Vec<SystemEntry>,
}

impl SystemManager {
    /// Create a new empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Append a system to the end of the run order.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateSystem`] if a system with the same
    /// name is already registered.
    pub fn add_system<S: System + 'static>(
        &mut self,
        system: S,
        execution: ExecutionType,
    ) -> Result<(), SchedulerError> {
        self.add_boxed(Box::new(system), execution)
    }

    /// Append an already boxed system to the end of the run order.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateSystem`] on a name clash.
    pub fn add_boxed(
        &mut self,
        system: Box<dyn System>,
        execution: ExecutionType,
    ) -> Result<(), SchedulerError> {
        let index = self.systems.len();
        self.insert_boxed(index, system, execution)
    }

    /// Insert a system at `index` in the run order, shifting later systems
    /// back by one.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateSystem`] on a name clash, or
    /// [`SchedulerError::IndexOutOfRange`] if `index > len()`.
    pub fn insert_system<S: System + 'static>(
        &mut self,
        index: usize,
        system: S,
        execution: ExecutionType,
    ) -> Result<(), SchedulerError> {
        self.insert_boxed(index, Box::new(system), execution)
    }

    fn insert_boxed(
        &mut self,
        index: usize,
        system: Box<dyn System>,
        execution: ExecutionType,
    ) -> Result<(), SchedulerError> {
        if self.position(system.name()).is_some() {
            return Err(SchedulerError::DuplicateSystem(system.name().to_owned()));
        }
        if index > self.systems.len() {
            return Err(SchedulerError::IndexOutOfRange {
                index,
                len: self.systems.len(),
            });
        }

        debug!(system = system.name(), index, ?execution, "system registered");
        self.systems.insert(index, SystemEntry { execution, system });
        Ok(())
    }

    /// Remove a system by name and hand it back.
    pub fn remove_system(&mut self, name: &str) -> Option<Box<dyn System>> {
        let index = self.position(name)?;
        debug!(system = name, "system removed");
        Some(self.systems.remove(index).system)
    }

    /// Returns a system by name.
    #[must_use]
    pub fn get_system(&self, name: &str) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|entry| entry.system.name() == name)
            .map(|entry| &*entry.system)
    }

    /// Returns a system by name, mutably.
    pub fn get_system_mut(&mut self, name: &str) -> Option<&mut (dyn System + 'static)> {
        self.systems
            .iter_mut()
            .find(|entry| entry.system.name() == name)
            .map(|entry| &mut *entry.system)
    }

    /// Returns the execution type a system was registered with.
    #[must_use]
    pub fn execution_of(&self, name: &str) -> Option<ExecutionType> {
        self.systems
            .iter()
            .find(|entry| entry.system.name() == name)
            .map(|entry| entry.execution)
    }

    /// Names of all registered systems, in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|entry| entry.system.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Run every enabled system registered for `pass`, in order.
    ///
    /// A system that returns an error is logged and skipped over; the rest
    /// still run. Returns the number of systems that failed.
    pub fn process(&mut self, pass: Pass, entities: &mut EntityManager, step: &GameStep) -> usize {
        let mut failures = 0;
        for entry in &mut self.systems {
            if !entry.execution.runs_in(pass) || !entry.system.enabled() {
                continue;
            }
            if let Err(err) = entry.system.process(entities, step) {
                warn!(
                    system = entry.system.name(),
                    ?pass,
                    frame = step.frame(),
                    error = %err,
                    "system failed"
                );
                failures += 1;
            }
        }
        failures
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.systems
            .iter()
            .position(|entry| entry.system.name() == name)
    }
}

impl std::fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: String,
        log: Log,
        enabled: bool,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &str, log: &Log) -> Self {
            Self {
                name: name.to_owned(),
                log: Arc::clone(log),
                enabled: true,
                fail: false,
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn disabled(mut self) -> Self {
            self.enabled = false;
            self
        }
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        fn process(
            &mut self,
            _entities: &mut EntityManager,
            _step: &GameStep,
        ) -> anyhow::Result<()> {
            self.log.lock().push(self.name.clone());
            if self.fail {
                anyhow::bail!("{} broke", self.name);
            }
            Ok(())
        }
    }

    fn run(manager: &mut SystemManager, pass: Pass) -> usize {
        let mut entities = EntityManager::new();
        manager.process(pass, &mut entities, &GameStep::new())
    }

    #[test]
    fn test_runs_in_registration_order() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        for name in ["input", "physics", "render"] {
            manager
                .add_system(Recorder::new(name, &log), ExecutionType::Update)
                .unwrap();
        }

        assert_eq!(run(&mut manager, Pass::Update), 0);
        assert_eq!(*log.lock(), vec!["input", "physics", "render"]);
    }

    #[test]
    fn test_insert_at_position() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager
            .add_system(Recorder::new("a", &log), ExecutionType::Update)
            .unwrap();
        manager
            .add_system(Recorder::new("c", &log), ExecutionType::Update)
            .unwrap();
        manager
            .insert_system(1, Recorder::new("b", &log), ExecutionType::Update)
            .unwrap();

        assert_eq!(manager.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let err = manager
            .insert_system(9, Recorder::new("d", &log), ExecutionType::Update)
            .unwrap_err();
        assert_eq!(err, SchedulerError::IndexOutOfRange { index: 9, len: 3 });
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager
            .add_system(Recorder::new("physics", &log), ExecutionType::Update)
            .unwrap();
        let err = manager
            .add_system(Recorder::new("physics", &log), ExecutionType::Draw)
            .unwrap_err();
        assert_eq!(err, SchedulerError::DuplicateSystem("physics".into()));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.execution_of("physics"), Some(ExecutionType::Update));
    }

    #[test]
    fn test_pass_filtering() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager
            .add_system(Recorder::new("update", &log), ExecutionType::Update)
            .unwrap();
        manager
            .add_system(Recorder::new("draw", &log), ExecutionType::Draw)
            .unwrap();
        manager
            .add_system(Recorder::new("both", &log), ExecutionType::UpdateAndDraw)
            .unwrap();

        run(&mut manager, Pass::Update);
        assert_eq!(*log.lock(), vec!["update", "both"]);

        log.lock().clear();
        run(&mut manager, Pass::Draw);
        assert_eq!(*log.lock(), vec!["draw", "both"]);
    }

    #[test]
    fn test_disabled_system_skipped() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager
            .add_system(Recorder::new("off", &log).disabled(), ExecutionType::Update)
            .unwrap();
        manager
            .add_system(Recorder::new("on", &log), ExecutionType::Update)
            .unwrap();

        run(&mut manager, Pass::Update);
        assert_eq!(*log.lock(), vec!["on"]);
    }

    #[test]
    fn test_failure_does_not_stop_later_systems() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager
            .add_system(Recorder::new("first", &log).failing(), ExecutionType::Update)
            .unwrap();
        manager
            .add_system(Recorder::new("second", &log), ExecutionType::Update)
            .unwrap();

        assert_eq!(run(&mut manager, Pass::Update), 1);
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_and_get() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager
            .add_system(Recorder::new("physics", &log), ExecutionType::Update)
            .unwrap();

        assert_eq!(manager.get_system("physics").map(|s| s.name()), Some("physics"));
        assert!(manager.get_system_mut("physics").is_some());
        assert!(manager.get_system("missing").is_none());

        let removed = manager.remove_system("physics").unwrap();
        assert_eq!(removed.name(), "physics");
        assert!(manager.is_empty());
        assert!(manager.remove_system("physics").is_none());
    }
}
