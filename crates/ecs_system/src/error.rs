//! Scheduler error types.

/// Errors returned when registering systems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// A system with this name is already registered.
    #[error("a system named '{0}' is already registered")]
    DuplicateSystem(String),

    /// Insertion index past the end of the system list.
    #[error("cannot insert system at position {index}, only {len} registered")]
    IndexOutOfRange { index: usize, len: usize },
}
