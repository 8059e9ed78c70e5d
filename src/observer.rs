//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three notification methods: next (for values), error (for
//! errors), and complete (for stream completion).

use std::{cell::RefCell, rc::Rc};

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable. `error` and `complete` are terminal: a well-behaved source
/// sends nothing after either of them.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  fn error(&mut self, err: Err);

  /// Handle completion of the observable
  fn complete(&mut self);

  /// Returns `true` once the observer will not accept more notifications.
  ///
  /// Sources check this to stop emitting early, e.g. after an operator
  /// turned a callback failure into an error.
  fn is_finished(&self) -> bool;
}

impl<Item, Err, O> Observer<Item, Err> for Rc<RefCell<O>>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { self.borrow_mut().next(value) }
  #[inline]
  fn error(&mut self, err: Err) { self.borrow_mut().error(err) }
  #[inline]
  fn complete(&mut self) { self.borrow_mut().complete() }
  #[inline]
  fn is_finished(&self) -> bool { self.borrow().is_finished() }
}

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }
  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }
  #[inline]
  fn complete(&mut self) { (**self).complete() }
  #[inline]
  fn is_finished(&self) -> bool { (**self).is_finished() }
}

/// Observer built from three closures, see
/// [`ObservableExt::subscribe_all`](crate::observable::ObservableExt::subscribe_all).
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
  is_stopped: bool,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self {
    ObserverAll { next, error, complete, is_stopped: false }
  }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  fn next(&mut self, value: Item) {
    if !self.is_stopped {
      (self.next)(value);
    }
  }

  fn error(&mut self, err: Err) {
    if !self.is_stopped {
      self.is_stopped = true;
      (self.error)(err);
    }
  }

  fn complete(&mut self) {
    if !self.is_stopped {
      self.is_stopped = true;
      (self.complete)();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.is_stopped }
}

#[cfg(test)]
mod test {
  use super::*;

  fn drive(o: &mut impl Observer<i32, ()>) {
    o.next(1);
    o.complete();
    o.next(2);
    o.error(());
    o.complete();
    assert!(o.is_finished());
  }

  #[test]
  fn observer_all_stops_after_terminal() {
    let mut nexts = vec![];
    let mut errors = 0;
    let mut completes = 0;
    drive(&mut ObserverAll::new(|v: i32| nexts.push(v), |_: ()| errors += 1, || completes += 1));
    assert_eq!(nexts, vec![1]);
    assert_eq!(errors, 0);
    assert_eq!(completes, 1);
  }

  #[test]
  fn shared_observer_forwards() {
    let mut values = vec![];
    {
      let inner = ObserverAll::new(|v: i32| values.push(v), |_: ()| {}, || {});
      let mut shared = Rc::new(RefCell::new(inner));
      drive(&mut shared);
    }
    assert_eq!(values, vec![1]);
  }
}
