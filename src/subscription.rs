use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  rc::Rc,
};

use smallvec::SmallVec;

/// Subscription returns from `Observable::actual_subscribe` to allow
/// unsubscribing.
///
/// Unsubscribing is idempotent: the first call releases the resources, every
/// later call is a no-op.
pub trait Subscription {
  /// This allows deregistering a stream before it has finished receiving all
  /// events (i.e. before `complete` is called).
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

/// Subscription of a source that has nothing left to release, such as a
/// synchronous source that already ran to completion.
impl Subscription for () {
  #[inline]
  fn unsubscribe(&mut self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: ?Sized> Subscription for Box<T>
where
  T: Subscription,
{
  #[inline]
  fn unsubscribe(&mut self) {
    let s = &mut **self;
    s.unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool {
    let s = &**self;
    s.is_closed()
  }
}

pub type BoxSubscription = Box<dyn Subscription>;

impl Debug for Box<dyn Subscription> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Box<dyn Subscription>")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

/// A composite subscription: unsubscribing it unsubscribes every teardown
/// added to it. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct LocalSubscription(Rc<RefCell<Inner<BoxSubscription>>>);

impl LocalSubscription {
  /// Adds a teardown. If this subscription is already closed the teardown is
  /// released immediately.
  pub fn add<S: Subscription + 'static>(&self, subscription: S) {
    let rejected = self.0.borrow_mut().add(Box::new(subscription));
    // Released outside the borrow, a teardown may look at this subscription.
    if let Some(mut s) = rejected {
      s.unsubscribe();
    }
  }

  pub fn teardown_size(&self) -> usize { self.0.borrow().teardown.len() }
}

impl Subscription for LocalSubscription {
  fn unsubscribe(&mut self) {
    let teardown = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    for mut v in teardown {
      v.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.borrow().closed }
}

struct Inner<T> {
  closed: bool,
  teardown: SmallVec<[T; 2]>,
}

impl<T> Debug for Inner<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Inner")
      .field("closed", &self.closed)
      .field("teardown_count", &self.teardown.len())
      .finish()
  }
}

impl<T: Subscription> Inner<T> {
  fn add(&mut self, v: T) -> Option<T> {
    if self.closed {
      Some(v)
    } else {
      self.teardown.retain(|v| !v.is_closed());
      self.teardown.push(v);
      None
    }
  }
}

impl<T> Default for Inner<T> {
  fn default() -> Self { Inner { closed: false, teardown: SmallVec::new() } }
}

/// Runs a closure the first time it is unsubscribed.
pub struct TearDown<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> TearDown<F> {
  pub fn new(f: F) -> Self { TearDown(Some(f)) }
}

impl<F: FnOnce()> Subscription for TearDown<F> {
  fn unsubscribe(&mut self) {
    if let Some(f) = self.0.take() {
      f()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_none() }
}
