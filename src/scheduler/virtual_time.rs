//! Virtual time scheduler.
//!
//! Time is a [`Tick`] counter that only advances while the scheduler drains
//! its queue: each popped action moves the clock to its due time before it
//! runs. Nothing ever sleeps.
//!
//! Actions run one at a time, in due time order, FIFO for equal due times.
//! The scheduler's state is never borrowed while an action runs, so an action
//! may schedule more work, read the clock or [`stop`] the run.
//!
//! [`stop`]: VirtualTimeScheduler::stop

use std::{
  cell::{Cell, RefCell},
  cmp::Ordering,
  collections::BinaryHeap,
  rc::Rc,
};

use tracing::{trace, warn};

use super::{ActionResult, Scheduler, SchedulerConfig, TaskHandle, Tick};
use crate::{error::SchedulerError, subscription::Subscription};

/// Read handle on a scheduler's clock.
///
/// Only the owning scheduler moves it, and never backwards.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock(Rc<Cell<Tick>>);

impl VirtualClock {
  fn new(initial: Tick) -> Self { VirtualClock(Rc::new(Cell::new(initial))) }

  #[inline]
  pub fn now(&self) -> Tick { self.0.get() }

  fn advance_to(&self, time: Tick) {
    if time > self.0.get() {
      self.0.set(time);
    }
  }
}

// ==================== Internal State ====================

struct VirtualTimeState {
  queue: BinaryHeap<ScheduledAction>,
  next_action_id: u64,
  running: bool,
  max_steps: Option<u64>,
}

struct ScheduledAction {
  due_time: Tick,
  id: u64,
  action: Box<dyn FnOnce() -> ActionResult>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledAction {
  fn eq(&self, other: &Self) -> bool { self.due_time == other.due_time && self.id == other.id }
}

impl Eq for ScheduledAction {}

impl PartialOrd for ScheduledAction {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledAction {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by id
    other
      .due_time
      .cmp(&self.due_time)
      .then_with(|| other.id.cmp(&self.id))
  }
}

// ==================== VirtualTimeScheduler ====================

/// A scheduler over simulated time.
///
/// Clones are handles on the same clock and queue.
#[derive(Clone)]
pub struct VirtualTimeScheduler {
  clock: VirtualClock,
  state: Rc<RefCell<VirtualTimeState>>,
}

impl Default for VirtualTimeScheduler {
  fn default() -> Self { Self::new(&SchedulerConfig::default()) }
}

impl VirtualTimeScheduler {
  pub fn new(config: &SchedulerConfig) -> Self {
    VirtualTimeScheduler {
      clock: VirtualClock::new(config.initial_clock),
      state: Rc::new(RefCell::new(VirtualTimeState {
        queue: BinaryHeap::new(),
        next_action_id: 0,
        running: false,
        max_steps: config.max_steps,
      })),
    }
  }

  /// A read handle on the clock that does not keep the queue alive.
  pub fn clock(&self) -> VirtualClock { self.clock.clone() }

  pub fn pending_count(&self) -> usize { self.state.borrow().queue.len() }

  pub fn is_empty(&self) -> bool { self.state.borrow().queue.is_empty() }

  /// Whether a run loop is currently draining the queue.
  pub fn is_running(&self) -> bool { self.state.borrow().running }

  /// Runs every queued action, including actions scheduled while running,
  /// until the queue is empty or [`stop`](Self::stop) is called.
  ///
  /// The first action that fails aborts the run and its error is returned;
  /// the remaining actions stay queued.
  pub fn start(&self) -> Result<(), SchedulerError> { self.run_until(None) }

  /// Makes the current run return after the action being executed.
  pub fn stop(&self) { self.state.borrow_mut().running = false; }

  /// Runs all actions due at or before `time`, then sets the clock to `time`.
  pub fn advance_to(&self, time: Tick) -> Result<(), SchedulerError> {
    self.check_forward(time)?;
    self.run_until(Some(time))?;
    self.clock.advance_to(time);
    Ok(())
  }

  /// Same as [`advance_to`](Self::advance_to) relative to the current time.
  pub fn advance_by(&self, delta: Tick) -> Result<(), SchedulerError> {
    self.advance_to(self.add(self.now(), delta))
  }

  /// Moves the clock forward without running anything.
  pub fn sleep(&self, delta: Tick) -> Result<(), SchedulerError> {
    let time = self.add(self.now(), delta);
    self.check_forward(time)?;
    self.clock.advance_to(time);
    Ok(())
  }

  fn check_forward(&self, requested: Tick) -> Result<(), SchedulerError> {
    let clock = self.now();
    if requested < clock {
      return Err(SchedulerError::TimeTravel { clock, requested });
    }
    Ok(())
  }

  fn run_until(&self, limit: Option<Tick>) -> Result<(), SchedulerError> {
    let max_steps = {
      let mut state = self.state.borrow_mut();
      if state.running {
        return Err(SchedulerError::AlreadyRunning);
      }
      state.running = true;
      state.max_steps
    };

    let mut steps = 0u64;
    loop {
      let next = {
        let mut state = self.state.borrow_mut();
        let due = state.running
          && state
            .queue
            .peek()
            .is_some_and(|next| limit.map_or(true, |limit| next.due_time <= limit));
        if due { state.queue.pop() } else { None }
      };

      let Some(scheduled) = next else {
        break;
      };
      if scheduled.handle.is_closed() {
        continue;
      }

      if let Some(limit) = max_steps {
        if steps >= limit {
          warn!(limit, "virtual time run hit its step limit");
          let mut state = self.state.borrow_mut();
          state.running = false;
          state.queue.push(scheduled);
          return Err(SchedulerError::StepLimitExceeded { limit });
        }
      }
      steps += 1;

      self.clock.advance_to(scheduled.due_time);
      trace!(due_time = scheduled.due_time, id = scheduled.id, "running action");
      scheduled.handle.mark_finished();
      if let Err(err) = (scheduled.action)() {
        warn!(clock = self.now(), error = %err, "scheduled action failed, aborting run");
        self.state.borrow_mut().running = false;
        return Err(err);
      }
    }

    self.state.borrow_mut().running = false;
    Ok(())
  }
}

impl Scheduler for VirtualTimeScheduler {
  #[inline]
  fn now(&self) -> Tick { self.clock.now() }

  fn schedule_absolute<S, F>(&self, due_time: Tick, action: F, state: S) -> TaskHandle
  where
    S: 'static,
    F: FnOnce(S) -> ActionResult + 'static,
  {
    let handle = TaskHandle::new();
    let mut inner = self.state.borrow_mut();
    let id = inner.next_action_id;
    inner.next_action_id += 1;
    trace!(due_time, id, "action scheduled");
    inner.queue.push(ScheduledAction {
      due_time,
      id,
      action: Box::new(move || action(state)),
      handle: handle.clone(),
    });
    handle
  }
}

#[cfg(test)]
mod test {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  fn record(
    scheduler: &VirtualTimeScheduler, log: &Rc<RefCell<Vec<(Tick, &'static str)>>>, at: Tick,
    name: &'static str,
  ) -> TaskHandle {
    let s = scheduler.clone();
    scheduler.schedule_absolute(
      at,
      move |log: Rc<RefCell<Vec<_>>>| {
        log.borrow_mut().push((s.now(), name));
        Ok(())
      },
      log.clone(),
    )
  }

  #[test]
  fn starts_at_initial_clock() {
    let scheduler = VirtualTimeScheduler::new(&SchedulerConfig::new().initial_clock(42));
    assert_eq!(scheduler.now(), 42);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn runs_in_due_time_order() {
    let scheduler = VirtualTimeScheduler::default();
    let log = Rc::new(RefCell::new(vec![]));
    record(&scheduler, &log, 300, "c");
    record(&scheduler, &log, 100, "a");
    record(&scheduler, &log, 200, "b");
    assert_eq!(scheduler.pending_count(), 3);

    scheduler.start().unwrap();

    assert_eq!(*log.borrow(), vec![(100, "a"), (200, "b"), (300, "c")]);
    assert_eq!(scheduler.now(), 300);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn fifo_ordering_same_time() {
    let scheduler = VirtualTimeScheduler::default();
    let log = Rc::new(RefCell::new(vec![]));
    for name in ["0", "1", "2", "3"] {
      record(&scheduler, &log, 10, name);
    }
    scheduler.start().unwrap();
    let names: Vec<_> = log.borrow().iter().map(|(_, n)| *n).collect();
    assert_eq!(names, vec!["0", "1", "2", "3"]);
  }

  #[test]
  fn past_due_action_does_not_move_clock_back() {
    let scheduler = VirtualTimeScheduler::default();
    scheduler.sleep(50).unwrap();
    let log = Rc::new(RefCell::new(vec![]));
    record(&scheduler, &log, 10, "late");
    scheduler.start().unwrap();
    assert_eq!(*log.borrow(), vec![(50, "late")]);
  }

  #[test]
  fn cancelled_action_is_skipped() {
    let scheduler = VirtualTimeScheduler::default();
    let log = Rc::new(RefCell::new(vec![]));
    let mut handle = record(&scheduler, &log, 100, "cancelled");
    record(&scheduler, &log, 200, "kept");
    handle.unsubscribe();

    scheduler.start().unwrap();

    assert_eq!(*log.borrow(), vec![(200, "kept")]);
  }

  #[test]
  fn actions_can_schedule_actions() {
    let scheduler = VirtualTimeScheduler::default();
    let log = Rc::new(RefCell::new(vec![]));
    let s = scheduler.clone();
    let l = log.clone();
    scheduler.schedule_absolute(
      10,
      move |_| {
        record(&s, &l, 25, "nested");
        Ok(())
      },
      (),
    );
    scheduler.start().unwrap();
    assert_eq!(*log.borrow(), vec![(25, "nested")]);
  }

  #[test]
  fn failing_action_aborts_run() {
    let scheduler = VirtualTimeScheduler::default();
    let log = Rc::new(RefCell::new(vec![]));
    record(&scheduler, &log, 10, "before");
    scheduler.schedule_absolute(20, |_| Err(SchedulerError::action("boom")), ());
    record(&scheduler, &log, 30, "after");

    let err = scheduler.start().unwrap_err();

    assert_eq!(err, SchedulerError::Action("boom".into()));
    assert_eq!(*log.borrow(), vec![(10, "before")]);
    assert_eq!(scheduler.now(), 20);
    assert_eq!(scheduler.pending_count(), 1);
    assert!(!scheduler.is_running());
  }

  #[test]
  fn stop_from_inside_an_action() {
    let scheduler = VirtualTimeScheduler::default();
    let log = Rc::new(RefCell::new(vec![]));
    let s = scheduler.clone();
    scheduler.schedule_absolute(
      10,
      move |_| {
        s.stop();
        Ok(())
      },
      (),
    );
    record(&scheduler, &log, 20, "later");

    scheduler.start().unwrap();
    assert!(log.borrow().is_empty());
    assert_eq!(scheduler.now(), 10);

    scheduler.start().unwrap();
    assert_eq!(*log.borrow(), vec![(20, "later")]);
  }

  #[test]
  fn reentrant_start_is_rejected() {
    let scheduler = VirtualTimeScheduler::default();
    let s = scheduler.clone();
    scheduler.schedule_absolute(5, move |_| s.start(), ());
    assert_eq!(scheduler.start(), Err(SchedulerError::AlreadyRunning));
  }

  #[test]
  fn advance_runs_only_due_actions() {
    let scheduler = VirtualTimeScheduler::default();
    let log = Rc::new(RefCell::new(vec![]));
    record(&scheduler, &log, 50, "a");
    record(&scheduler, &log, 150, "b");

    scheduler.advance_by(100).unwrap();
    assert_eq!(*log.borrow(), vec![(50, "a")]);
    assert_eq!(scheduler.now(), 100);
    assert_eq!(scheduler.pending_count(), 1);

    scheduler.advance_to(150).unwrap();
    assert_eq!(*log.borrow(), vec![(50, "a"), (150, "b")]);
  }

  #[test]
  fn advance_backwards_fails() {
    let scheduler = VirtualTimeScheduler::default();
    scheduler.advance_to(100).unwrap();
    assert_eq!(
      scheduler.advance_to(99),
      Err(SchedulerError::TimeTravel { clock: 100, requested: 99 })
    );
  }

  #[test]
  fn step_limit() {
    let scheduler = VirtualTimeScheduler::new(&SchedulerConfig::new().max_steps(2));
    for at in [1, 2, 3] {
      scheduler.schedule_absolute(at, |_| Ok(()), ());
    }
    assert_eq!(scheduler.start(), Err(SchedulerError::StepLimitExceeded { limit: 2 }));
    assert_eq!(scheduler.now(), 2);
    assert_eq!(scheduler.pending_count(), 1);
  }

  #[test]
  fn clock_handle_follows_scheduler() {
    let scheduler = VirtualTimeScheduler::default();
    let clock = scheduler.clock();
    scheduler.schedule_absolute(70, |_| Ok(()), ());
    scheduler.start().unwrap();
    assert_eq!(clock.now(), 70);
  }
}
