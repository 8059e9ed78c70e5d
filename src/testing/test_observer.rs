use std::{cell::RefCell, rc::Rc};

use crate::{
  notification::{Messages, Notification, Recorded},
  observer::Observer,
  scheduler::VirtualClock,
};

/// Observer that records every notification with the virtual time it
/// arrived at.
///
/// Clones share the same log.
pub struct TestObserver<Item, Err> {
  clock: VirtualClock,
  messages: Rc<RefCell<Messages<Item, Err>>>,
}

impl<Item, Err> TestObserver<Item, Err> {
  pub fn new(clock: VirtualClock) -> Self { TestObserver { clock, messages: Rc::default() } }

  /// A copy of the log recorded so far.
  pub fn messages(&self) -> Messages<Item, Err>
  where
    Item: Clone,
    Err: Clone,
  {
    self.messages.borrow().clone()
  }

  /// Moves the recorded log out, leaving this observer's log empty.
  pub fn take_messages(&self) -> Messages<Item, Err> {
    std::mem::take(&mut *self.messages.borrow_mut())
  }

  fn record(&self, notification: Notification<Item, Err>) {
    let time = self.clock.now();
    self.messages.borrow_mut().push(Recorded::new(time, notification));
  }
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self {
    TestObserver { clock: self.clock.clone(), messages: self.messages.clone() }
  }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { self.record(Notification::Next(value)) }

  #[inline]
  fn error(&mut self, err: Err) { self.record(Notification::Error(err)) }

  #[inline]
  fn complete(&mut self) { self.record(Notification::Completed) }

  /// A recorder accepts everything, so tests can see misbehaving sources.
  #[inline]
  fn is_finished(&self) -> bool { false }
}
