//! Marble-test building blocks driven by a [`TestScheduler`].
//!
//! [`ColdObservable`] and [`HotObservable`] replay pre-recorded notifications
//! on the scheduler's clock, [`TestObserver`] records what reaches it, and
//! the helpers in this module build the expected records to compare against.
//!
//! # Example
//!
//! ```
//! use rxmarble::{prelude::*, testing::*};
//!
//! let scheduler = TestScheduler::new();
//! let source = scheduler.create_cold_observable(vec![
//!   on_next::<_, RxError>(10, 3),
//!   on_next(20, 9),
//!   on_next(30, 4),
//!   on_completed(40),
//! ]);
//!
//! let messages = scheduler.start_with_create(move || source.max()).unwrap();
//!
//! assert_eq!(messages, vec![on_next::<_, RxError>(240, 9), on_completed(240)]);
//! ```
//!
//! [`TestScheduler`]: crate::scheduler::TestScheduler

use std::cell::RefCell;

use crate::{
  notification::{Notification, Recorded},
  observer::Observer,
  scheduler::{TestScheduler, Tick},
  subscription::{LocalSubscription, Subscription},
};

mod cold_observable;
mod hot_observable;
mod test_observer;

pub use cold_observable::ColdObservable;
pub use hot_observable::HotObservable;
pub use test_observer::TestObserver;

/// Default virtual time at which `start_with_*` creates the observable.
pub const CREATED: Tick = 100;
/// Default virtual time at which `start_with_*` subscribes.
pub const SUBSCRIBED: Tick = 200;
/// Default virtual time at which `start_with_*` disposes the subscription.
pub const DISPOSED: Tick = 1000;

/// When a replay source was subscribed to, and when that subscription ended
/// (`None` while it is still live).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionRecord {
  pub subscribe: Tick,
  pub unsubscribe: Option<Tick>,
}

impl SubscriptionRecord {
  pub fn new(subscribe: Tick, unsubscribe: Option<Tick>) -> Self {
    SubscriptionRecord { subscribe, unsubscribe }
  }
}

pub fn on_next<Item, Err>(time: Tick, value: Item) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Next(value))
}

pub fn on_error<Item, Err>(time: Tick, err: Err) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Error(err))
}

pub fn on_completed<Item, Err>(time: Tick) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Completed)
}

/// A subscription that started at `start` and ended at `end`.
pub fn subscribe(start: Tick, end: Tick) -> SubscriptionRecord {
  SubscriptionRecord::new(start, Some(end))
}

/// Emits `notification` to `observer` unless `subscription` was released.
///
/// A terminal notification, or an observer that stopped accepting, releases
/// the subscription.
fn deliver<Item, Err, O>(
  subscription: &LocalSubscription, observer: &RefCell<O>, notification: Notification<Item, Err>,
) where
  O: Observer<Item, Err> + ?Sized,
{
  if subscription.is_closed() {
    return;
  }
  let terminal = notification.is_terminal();
  let finished = {
    let mut observer = observer.borrow_mut();
    notification.accept(&mut *observer);
    observer.is_finished()
  };
  if terminal || finished {
    subscription.clone().unsubscribe();
  }
}

/// Resolves the instant of the next recorded message. It is never earlier
/// than the instant of the message recorded before it, so a replay keeps the
/// recorded order even when some of its messages had to be deferred.
fn replay_due_time(scheduler: &TestScheduler, requested: Tick, previous: &mut Tick) -> Tick {
  let due = scheduler.resolve_due_time(requested.max(*previous));
  *previous = due;
  due
}
