use std::{cell::RefCell, rc::Rc};

use super::{deliver, replay_due_time, SubscriptionRecord};
use crate::{
  notification::{Notification, Recorded},
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Scheduler, TestScheduler, VirtualClock},
  subscription::{LocalSubscription, TearDown},
};

type SharedObserver<Item, Err> = Rc<RefCell<dyn Observer<Item, Err>>>;

/// Emits a recorded sequence on one shared timeline.
///
/// Message times are absolute and scheduled when the observable is created;
/// a subscriber only sees the messages that fire while it is subscribed.
pub struct HotObservable<Item, Err> {
  clock: VirtualClock,
  inner: Rc<RefCell<HotInner<Item, Err>>>,
}

struct HotInner<Item, Err> {
  observers: Vec<(usize, LocalSubscription, SharedObserver<Item, Err>)>,
  subscriptions: Vec<SubscriptionRecord>,
  next_id: usize,
}

impl<Item, Err> HotObservable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub(crate) fn new(
    scheduler: &TestScheduler,
    messages: impl IntoIterator<Item = Recorded<Notification<Item, Err>>>,
  ) -> Self {
    let inner = Rc::new(RefCell::new(HotInner {
      observers: vec![],
      subscriptions: vec![],
      next_id: 0,
    }));
    // The scheduled emissions own the timeline, so it keeps running after
    // every handle on this observable is gone.
    let mut previous = 0;
    for message in messages {
      let due = replay_due_time(scheduler, message.time, &mut previous);
      let inner = inner.clone();
      let notification = message.value;
      scheduler.schedule_absolute(
        due,
        move |_| {
          emit(&inner, notification);
          Ok(())
        },
        (),
      );
    }
    HotObservable { clock: scheduler.clock(), inner }
  }
}

fn emit<Item: Clone, Err: Clone>(
  inner: &RefCell<HotInner<Item, Err>>, notification: Notification<Item, Err>,
) {
  // Snapshot, so observers can subscribe or unsubscribe while being notified.
  let observers = inner.borrow().observers.clone();
  for (_, subscription, observer) in observers {
    deliver(&subscription, &*observer, notification.clone());
  }
}

impl<Item, Err> HotObservable<Item, Err> {
  /// Every subscription served so far, in subscription order.
  pub fn subscriptions(&self) -> Vec<SubscriptionRecord> {
    self.inner.borrow().subscriptions.clone()
  }

  /// Number of currently attached observers.
  pub fn observer_count(&self) -> usize { self.inner.borrow().observers.len() }
}

impl<Item, Err> Clone for HotObservable<Item, Err> {
  fn clone(&self) -> Self { HotObservable { clock: self.clock.clone(), inner: self.inner.clone() } }
}

impl<Item, Err, O> Observable<Item, Err, O> for HotObservable<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
{
  type Unsub = LocalSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = LocalSubscription::default();
    let observer: SharedObserver<Item, Err> = Rc::new(RefCell::new(observer));
    let (id, index) = {
      let mut inner = self.inner.borrow_mut();
      let id = inner.next_id;
      inner.next_id += 1;
      inner.observers.push((id, subscription.clone(), observer));
      inner.subscriptions.push(SubscriptionRecord::new(self.clock.now(), None));
      (id, inner.subscriptions.len() - 1)
    };

    let weak = Rc::downgrade(&self.inner);
    let clock = self.clock;
    subscription.add(TearDown::new(move || {
      if let Some(inner) = weak.upgrade() {
        let mut inner = inner.borrow_mut();
        inner.observers.retain(|(i, ..)| *i != id);
        inner.subscriptions[index].unsubscribe = Some(clock.now());
      }
    }));
    subscription
  }
}

impl<Item, Err> ObservableExt<Item, Err> for HotObservable<Item, Err> {}
