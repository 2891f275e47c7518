//! Frame timing.

use std::time::{Duration, Instant};

/// Time elapsed between consecutive game steps.
///
/// The first step has no predecessor and reports a delta of zero.
#[derive(Debug, Clone, Default)]
pub struct GameStep {
    /// When the previous step happened.
    last_step: Option<Instant>,
    /// Time between the previous step and the one before it.
    delta: Duration,
    /// Number of steps taken so far.
    frame: u64,
}

impl GameStep {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock to now.
    pub fn step(&mut self) {
        self.step_at(Instant::now());
    }

    /// Advance the clock to `now`.
    ///
    /// An instant earlier than the previous step yields a zero delta.
    pub fn step_at(&mut self, now: Instant) {
        self.delta = self
            .last_step
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_step = Some(now);
        self.frame += 1;
    }

    /// Time since the previous step.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Milliseconds since the previous step.
    #[must_use]
    pub fn delta_ms(&self) -> f64 {
        self.delta.as_secs_f64() * 1000.0
    }

    /// Number of steps taken so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
