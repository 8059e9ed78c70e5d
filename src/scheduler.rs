//! Scheduler abstraction and the virtual-time schedulers built on it.
//!
//! A [`Scheduler`] knows the current time and can run an action at an
//! absolute time. [`VirtualTimeScheduler`] implements it over a simulated
//! clock that only moves when its queue is drained, and [`TestScheduler`]
//! decorates that with collision avoidance and the marble-test entry points.

use std::{cell::Cell, rc::Rc, time::Duration};

use crate::{error::SchedulerError, subscription::Subscription};

mod config;
pub mod test_scheduler;
pub mod virtual_time;

pub use config::SchedulerConfig;
pub use test_scheduler::TestScheduler;
pub use virtual_time::{VirtualClock, VirtualTimeScheduler};

/// Scalar virtual time.
pub type Tick = u64;

/// What a scheduled action returns. An `Err` aborts the run that executes it.
pub type ActionResult = Result<(), SchedulerError>;

/// A Scheduler orders actions in time and executes them.
pub trait Scheduler {
  /// Current time of this scheduler.
  fn now(&self) -> Tick;

  /// Schedules `action` to run with `state` at `due_time`.
  ///
  /// Use `()` as the state when the action needs none.
  fn schedule_absolute<S, F>(&self, due_time: Tick, action: F, state: S) -> TaskHandle
  where
    S: 'static,
    F: FnOnce(S) -> ActionResult + 'static;

  /// Adds a relative span to an absolute time, saturating at the end of time.
  #[inline]
  fn add(&self, absolute: Tick, relative: Tick) -> Tick { absolute.saturating_add(relative) }

  /// Converts a span into this scheduler's relative time unit.
  #[inline]
  fn to_relative(&self, span: Tick) -> Tick { span }

  /// Schedules `action` to run `delay` after the current time.
  fn schedule_relative<S, F>(&self, delay: Tick, action: F, state: S) -> TaskHandle
  where
    S: 'static,
    F: FnOnce(S) -> ActionResult + 'static,
  {
    let due_time = self.add(self.now(), self.to_relative(delay));
    self.schedule_absolute(due_time, action, state)
  }
}

/// Cancellation handle of a scheduled action.
///
/// Unsubscribing before the action runs prevents it from running.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle(Rc<Cell<bool>>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  #[inline]
  pub(crate) fn mark_finished(&self) { self.0.set(true) }
}

impl Subscription for TaskHandle {
  #[inline]
  fn unsubscribe(&mut self) { self.0.set(true) }

  #[inline]
  fn is_closed(&self) -> bool { self.0.get() }
}

/// Converts an absolute tick count into a wall-clock duration, given the
/// length of one tick.
pub fn to_duration(ticks: Tick, unit: Duration) -> Duration {
  let nanos = unit.as_nanos().saturating_mul(u128::from(ticks));
  let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
  Duration::new(secs, (nanos % 1_000_000_000) as u32)
}
