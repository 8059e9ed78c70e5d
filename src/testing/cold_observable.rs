use std::{cell::RefCell, rc::Rc};

use super::{deliver, replay_due_time, SubscriptionRecord};
use crate::{
  notification::{Notification, Recorded},
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Scheduler, TestScheduler},
  subscription::{LocalSubscription, TearDown},
};

/// Replays a recorded sequence independently for every subscriber.
///
/// Message times are offsets from the moment each subscriber subscribed.
pub struct ColdObservable<Item, Err> {
  scheduler: TestScheduler,
  messages: Rc<[Recorded<Notification<Item, Err>>]>,
  subscriptions: Rc<RefCell<Vec<SubscriptionRecord>>>,
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub(crate) fn new(
    scheduler: TestScheduler, messages: impl IntoIterator<Item = Recorded<Notification<Item, Err>>>,
  ) -> Self {
    ColdObservable {
      scheduler,
      messages: messages.into_iter().collect(),
      subscriptions: Rc::default(),
    }
  }

  /// Every subscription served so far, in subscription order.
  pub fn subscriptions(&self) -> Vec<SubscriptionRecord> { self.subscriptions.borrow().clone() }
}

impl<Item, Err> Clone for ColdObservable<Item, Err> {
  fn clone(&self) -> Self {
    ColdObservable {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for ColdObservable<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Unsub = LocalSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let clock = self.scheduler.clock();
    let index = {
      let mut subscriptions = self.subscriptions.borrow_mut();
      subscriptions.push(SubscriptionRecord::new(clock.now(), None));
      subscriptions.len() - 1
    };

    let subscription = LocalSubscription::default();
    let observer = Rc::new(RefCell::new(observer));
    let origin = clock.now();
    let mut previous = 0;
    for message in self.messages.iter() {
      let requested = self.scheduler.add(origin, message.time);
      let due = replay_due_time(&self.scheduler, requested, &mut previous);
      let notification = message.value.clone();
      let sub = subscription.clone();
      let observer = observer.clone();
      let handle = self.scheduler.schedule_absolute(
        due,
        move |_| {
          deliver(&sub, &observer, notification);
          Ok(())
        },
        (),
      );
      subscription.add(handle);
    }

    let log = self.subscriptions.clone();
    subscription.add(TearDown::new(move || {
      log.borrow_mut()[index].unsubscribe = Some(clock.now());
    }));
    subscription
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ColdObservable<Item, Err> {}
