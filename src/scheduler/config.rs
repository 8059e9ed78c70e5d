use std::time::Duration;

use super::Tick;

/// Configuration of a virtual-time scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
  /// Clock value the scheduler starts at.
  pub initial_clock: Tick,
  /// Wall-clock length of one tick, used to convert ticks into durations.
  pub tick_unit: Duration,
  /// Maximum number of actions a single run may execute.
  ///
  /// `None` runs until the queue is empty.
  pub max_steps: Option<u64>,
}

impl SchedulerConfig {
  pub const fn new() -> Self {
    Self { initial_clock: 0, tick_unit: Duration::from_micros(1), max_steps: None }
  }

  #[must_use]
  pub const fn initial_clock(mut self, clock: Tick) -> Self {
    self.initial_clock = clock;
    self
  }

  #[must_use]
  pub const fn tick_unit(mut self, unit: Duration) -> Self {
    self.tick_unit = unit;
    self
  }

  /// Guards against actions that keep rescheduling themselves forever.
  #[must_use]
  pub const fn max_steps(mut self, steps: u64) -> Self {
    self.max_steps = Some(steps);
    self
  }
}

impl Default for SchedulerConfig {
  fn default() -> Self { Self::new() }
}
