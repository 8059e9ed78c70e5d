//! Test scheduler for marble tests.
//!
//! [`TestScheduler`] is a [`VirtualTimeScheduler`] that never runs an action
//! "now": anything scheduled at or before the current clock is pushed to the
//! next free instant, so an action scheduled from inside another action
//! always runs strictly after it.
//!
//! # Usage
//!
//! ```rust
//! use rxmarble::{prelude::*, testing::*};
//!
//! let scheduler = TestScheduler::new();
//! let source = scheduler.create_cold_observable(vec![
//!   on_next::<_, RxError>(10, 1),
//!   on_next(20, 2),
//!   on_completed(30),
//! ]);
//!
//! let messages = scheduler
//!   .start_with_create(move || source.map(|v| Ok(v * 10)))
//!   .unwrap();
//!
//! assert_eq!(messages, vec![on_next(210, 10), on_next(220, 20), on_completed(230)]);
//! ```

use std::{
  cell::{Cell, RefCell},
  convert::Infallible,
  fmt::Display,
  rc::Rc,
  time::Duration,
};

use tracing::debug;

use super::{
  ActionResult, Scheduler, SchedulerConfig, TaskHandle, Tick, VirtualClock, VirtualTimeScheduler,
};
use crate::{
  error::SchedulerError,
  notification::{Messages, Notification, Recorded},
  observable::Observable,
  subscription::Subscription,
  testing::{ColdObservable, HotObservable, TestObserver, CREATED, DISPOSED, SUBSCRIBED},
};

/// A virtual time scheduler with collision avoidance and the
/// `start_with_*` orchestration used by marble tests.
///
/// Clones share the clock and the queue.
#[derive(Clone)]
pub struct TestScheduler {
  inner: VirtualTimeScheduler,
  last_deferred: Rc<Cell<Tick>>,
  tick_unit: Duration,
}

impl Default for TestScheduler {
  fn default() -> Self { Self::new() }
}

impl TestScheduler {
  pub fn new() -> Self { Self::with_config(SchedulerConfig::new()) }

  pub fn with_config(config: SchedulerConfig) -> Self {
    TestScheduler {
      inner: VirtualTimeScheduler::new(&config),
      last_deferred: Rc::default(),
      tick_unit: config.tick_unit,
    }
  }

  /// A read handle on the clock.
  pub fn clock(&self) -> VirtualClock { self.inner.clock() }

  /// See [`VirtualTimeScheduler::start`].
  pub fn start(&self) -> Result<(), SchedulerError> { self.inner.start() }

  pub fn stop(&self) { self.inner.stop() }

  pub fn advance_to(&self, time: Tick) -> Result<(), SchedulerError> { self.inner.advance_to(time) }

  pub fn advance_by(&self, delta: Tick) -> Result<(), SchedulerError> {
    self.inner.advance_by(delta)
  }

  pub fn sleep(&self, delta: Tick) -> Result<(), SchedulerError> { self.inner.sleep(delta) }

  pub fn pending_count(&self) -> usize { self.inner.pending_count() }

  pub fn is_empty(&self) -> bool { self.inner.is_empty() }

  pub fn is_running(&self) -> bool { self.inner.is_running() }

  /// Wall-clock equivalent of `absolute` ticks in the configured tick unit.
  pub fn to_duration(&self, absolute: Tick) -> Duration {
    super::to_duration(absolute, self.tick_unit)
  }

  /// A source that replays `messages` for each subscriber, with times taken
  /// as offsets from the subscription.
  pub fn create_cold_observable<Item, Err>(
    &self, messages: impl IntoIterator<Item = Recorded<Notification<Item, Err>>>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable::new(self.clone(), messages)
  }

  /// A source that emits `messages` at their absolute times, whether or not
  /// anyone is subscribed.
  pub fn create_hot_observable<Item, Err>(
    &self, messages: impl IntoIterator<Item = Recorded<Notification<Item, Err>>>,
  ) -> HotObservable<Item, Err>
  where
    Item: Clone + 'static,
    Err: Clone + 'static,
  {
    HotObservable::new(self, messages)
  }

  /// The instant an action requested for `due_time` will actually run at.
  ///
  /// A time at or before the clock is moved to the next free instant after
  /// it; every call that defers gets a distinct instant. The returned time is
  /// always later than the clock, so scheduling at it is never deferred again.
  pub(crate) fn resolve_due_time(&self, due_time: Tick) -> Tick {
    let clock = self.now();
    if due_time > clock {
      return due_time;
    }
    let due = clock.max(self.last_deferred.get()).saturating_add(1);
    self.last_deferred.set(due);
    debug!(requested = due_time, due_time = due, clock, "deferred action");
    due
  }

  pub fn create_observer<Item, Err>(&self) -> TestObserver<Item, Err> {
    TestObserver::new(self.clock())
  }

  /// Creates the observable returned by `create` at `created`, subscribes a
  /// fresh [`TestObserver`] to it at `subscribed` and releases that
  /// subscription at `disposed`, then runs the scheduler and returns
  /// everything the observer recorded.
  pub fn start_with_timing<S, Item, Err, F>(
    &self, create: F, created: Tick, subscribed: Tick, disposed: Tick,
  ) -> Result<Messages<Item, Err>, SchedulerError>
  where
    F: FnOnce() -> S + 'static,
    S: Observable<Item, Err, TestObserver<Item, Err>> + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.try_start_with_timing(move || Ok::<_, Infallible>(create()), created, subscribed, disposed)
  }

  /// [`start_with_timing`](Self::start_with_timing) with a factory that may
  /// fail. Its error aborts the run as [`SchedulerError::Action`].
  pub fn try_start_with_timing<S, Item, Err, F, E>(
    &self, create: F, created: Tick, subscribed: Tick, disposed: Tick,
  ) -> Result<Messages<Item, Err>, SchedulerError>
  where
    F: FnOnce() -> Result<S, E> + 'static,
    E: Display,
    S: Observable<Item, Err, TestObserver<Item, Err>> + 'static,
    Item: 'static,
    Err: 'static,
  {
    let source: Rc<RefCell<Option<S>>> = Rc::default();
    let subscription: Rc<RefCell<Option<S::Unsub>>> = Rc::default();
    let observer = self.create_observer::<Item, Err>();
    let clock = self.clock();

    let slot = source.clone();
    self.schedule_absolute(
      created,
      move |clock: VirtualClock| {
        debug!(clock = clock.now(), "creating observable");
        let created = create().map_err(SchedulerError::action)?;
        *slot.borrow_mut() = Some(created);
        Ok(())
      },
      clock.clone(),
    );

    let slot = subscription.clone();
    let recorder = observer.clone();
    self.schedule_absolute(
      subscribed,
      move |clock: VirtualClock| {
        debug!(clock = clock.now(), "subscribing observer");
        let source = source.borrow_mut().take();
        let source = source.ok_or(SchedulerError::NotCreated { clock: clock.now() })?;
        *slot.borrow_mut() = Some(source.actual_subscribe(recorder));
        Ok(())
      },
      clock.clone(),
    );

    let slot = subscription;
    self.schedule_absolute(
      disposed,
      move |clock: VirtualClock| {
        debug!(clock = clock.now(), "disposing subscription");
        let subscription = slot.borrow_mut().take();
        let mut subscription =
          subscription.ok_or(SchedulerError::NotSubscribed { clock: clock.now() })?;
        subscription.unsubscribe();
        Ok(())
      },
      clock,
    );

    self.start()?;
    Ok(observer.take_messages())
  }

  /// [`start_with_timing`](Self::start_with_timing) with the default
  /// creation and subscription instants.
  pub fn start_with_dispose<S, Item, Err, F>(
    &self, create: F, disposed: Tick,
  ) -> Result<Messages<Item, Err>, SchedulerError>
  where
    F: FnOnce() -> S + 'static,
    S: Observable<Item, Err, TestObserver<Item, Err>> + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.start_with_timing(create, CREATED, SUBSCRIBED, disposed)
  }

  /// [`start_with_timing`](Self::start_with_timing) at the default instants:
  /// created at 100, subscribed at 200, disposed at 1000.
  pub fn start_with_create<S, Item, Err, F>(
    &self, create: F,
  ) -> Result<Messages<Item, Err>, SchedulerError>
  where
    F: FnOnce() -> S + 'static,
    S: Observable<Item, Err, TestObserver<Item, Err>> + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.start_with_timing(create, CREATED, SUBSCRIBED, DISPOSED)
  }
}

impl Scheduler for TestScheduler {
  #[inline]
  fn now(&self) -> Tick { self.inner.now() }

  fn schedule_absolute<S, F>(&self, due_time: Tick, action: F, state: S) -> TaskHandle
  where
    S: 'static,
    F: FnOnce(S) -> ActionResult + 'static,
  {
    self.inner.schedule_absolute(self.resolve_due_time(due_time), action, state)
  }
}

#[cfg(test)]
mod test {
  use std::{cell::RefCell, rc::Rc};

  use proptest::prelude::*;

  use crate::{prelude::*, testing::*};

  fn log_at(scheduler: &TestScheduler, log: &Rc<RefCell<Vec<Tick>>>, at: Tick) {
    let clock = scheduler.clock();
    let log = log.clone();
    scheduler.schedule_absolute(
      at,
      move |_| {
        log.borrow_mut().push(clock.now());
        Ok(())
      },
      (),
    );
  }

  #[test]
  fn past_and_present_are_deferred_to_distinct_instants() {
    let scheduler = TestScheduler::new();
    scheduler.advance_to(100).unwrap();
    let log = Rc::new(RefCell::new(vec![]));
    log_at(&scheduler, &log, 100);
    log_at(&scheduler, &log, 40);
    log_at(&scheduler, &log, 150);

    scheduler.start().unwrap();

    assert_eq!(*log.borrow(), vec![101, 102, 150]);
  }

  #[test]
  fn action_scheduled_now_from_an_action_runs_later() {
    let scheduler = TestScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let s = scheduler.clone();
    let l = log.clone();
    scheduler.schedule_absolute(
      50,
      move |_| {
        log_at(&s, &l, s.now());
        log_at(&s, &l, s.now());
        Ok(())
      },
      (),
    );

    scheduler.start().unwrap();

    assert_eq!(*log.borrow(), vec![51, 52]);
  }

  #[test]
  fn relative_scheduling_is_deferred_too() {
    let scheduler = TestScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let clock = scheduler.clock();
    let l = log.clone();
    scheduler.schedule_relative(
      0,
      move |_| {
        l.borrow_mut().push(clock.now());
        Ok(())
      },
      (),
    );
    scheduler.start().unwrap();
    assert_eq!(*log.borrow(), vec![1]);
  }

  #[test]
  fn start_with_create_uses_default_instants() {
    let scheduler = TestScheduler::new();
    let calls = Rc::new(RefCell::new(vec![]));
    let c = calls.clone();
    let clock = scheduler.clock();

    let messages = scheduler
      .start_with_create(move || {
        c.borrow_mut().push(clock.now());
        observable::empty::<i32, RxError>()
      })
      .unwrap();

    let expected: Messages<i32, RxError> = vec![on_completed(200)];
    assert_eq!(messages, expected);
    assert_eq!(*calls.borrow(), vec![CREATED]);
    assert_eq!(scheduler.now(), DISPOSED);
  }

  #[test]
  fn never_ending_source_records_nothing() {
    let scheduler = TestScheduler::new();
    let source = scheduler.create_cold_observable::<i32, RxError>(vec![]);

    let messages = scheduler.start_with_create(move || source).unwrap();

    assert!(messages.is_empty());
  }

  #[test]
  fn dispose_releases_the_subscription() {
    let scheduler = TestScheduler::new();
    let cold = scheduler.create_cold_observable(vec![
      on_next::<_, RxError>(100, 1),
      on_next(900, 2),
    ]);
    let source = cold.clone();

    let messages = scheduler.start_with_create(move || source).unwrap();

    assert_eq!(messages, vec![on_next(300, 1)]);
    assert_eq!(cold.subscriptions(), vec![subscribe(SUBSCRIBED, DISPOSED)]);
  }

  #[test]
  fn failing_factory_aborts_the_run() {
    let scheduler = TestScheduler::new();
    let result = scheduler.try_start_with_timing(
      || Err::<observable::ObservableIter<std::vec::IntoIter<i32>, RxError>, _>("no source"),
      CREATED,
      SUBSCRIBED,
      DISPOSED,
    );

    let result: Result<Messages<i32, RxError>, _> = result;
    assert_eq!(result, Err(SchedulerError::Action("no source".into())));
    assert_eq!(scheduler.now(), CREATED);
  }

  #[test]
  fn subscribe_before_create_is_an_error() {
    let scheduler = TestScheduler::new();
    let result: Result<Messages<i32, RxError>, _> =
      scheduler.start_with_timing(|| observable::empty::<i32, RxError>(), 300, 200, 1000);

    assert_eq!(result, Err(SchedulerError::NotCreated { clock: 200 }));
  }

  #[test]
  fn dispose_before_subscribe_is_an_error() {
    let scheduler = TestScheduler::new();
    let result: Result<Messages<i32, RxError>, _> =
      scheduler.start_with_timing(|| observable::empty::<i32, RxError>(), 100, 500, 400);

    assert_eq!(result, Err(SchedulerError::NotSubscribed { clock: 400 }));
  }

  #[test]
  fn to_duration_uses_configured_unit() {
    let config = SchedulerConfig::new().tick_unit(std::time::Duration::from_millis(1));
    let scheduler = TestScheduler::with_config(config);
    assert_eq!(scheduler.to_duration(1500), std::time::Duration::from_millis(1500));
  }

  #[test]
  fn initial_clock_from_config() {
    let scheduler = TestScheduler::with_config(SchedulerConfig::new().initial_clock(10));
    let log = Rc::new(RefCell::new(vec![]));
    log_at(&scheduler, &log, 5);
    scheduler.start().unwrap();
    assert_eq!(*log.borrow(), vec![11]);
  }

  proptest! {
    #[test]
    fn clock_observed_by_actions_never_decreases(
      times in proptest::collection::vec(0u64..500, 1..40),
      start in 0u64..300,
    ) {
      let scheduler = TestScheduler::new();
      scheduler.advance_to(start).unwrap();
      let log = Rc::new(RefCell::new(vec![]));
      for at in &times {
        log_at(&scheduler, &log, *at);
      }
      scheduler.start().unwrap();

      let log = log.borrow();
      prop_assert_eq!(log.len(), times.len());
      prop_assert!(log.windows(2).all(|w| w[0] <= w[1]));
      prop_assert!(log.iter().all(|t| *t > start));
      let deferred: Vec<_> = times.iter().filter(|t| **t <= start).collect();
      for i in 0..deferred.len() {
        prop_assert!(log.contains(&(start + 1 + i as u64)));
      }
    }
  }
}
