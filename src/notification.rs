//! Materialized notifications and timestamped records.

use crate::{observer::Observer, scheduler::Tick};

/// One observer call, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  /// `Error` and `Completed` end a subscription.
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  /// Replays this notification on `observer`.
  pub fn accept<O>(self, observer: &mut O)
  where
    O: Observer<Item, Err> + ?Sized,
  {
    match self {
      Notification::Next(v) => observer.next(v),
      Notification::Error(e) => observer.error(e),
      Notification::Completed => observer.complete(),
    }
  }
}

/// A value stamped with the virtual time it was produced or observed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<T> {
  pub time: Tick,
  pub value: T,
}

impl<T> Recorded<T> {
  #[inline]
  pub fn new(time: Tick, value: T) -> Self { Recorded { time, value } }
}

/// Log of notifications as captured by a recording observer.
pub type Messages<Item, Err> = Vec<Recorded<Notification<Item, Err>>>;

#[cfg(test)]
mod test {
  use super::*;
  use crate::observer::ObserverAll;

  #[test]
  fn terminal_variants() {
    assert!(!Notification::<i32, ()>::Next(1).is_terminal());
    assert!(Notification::<i32, ()>::Error(()).is_terminal());
    assert!(Notification::<i32, ()>::Completed.is_terminal());
  }

  #[test]
  fn accept_dispatches_to_observer() {
    let mut seen = vec![];
    let mut completed = false;
    {
      let mut o = ObserverAll::new(|v: i32| seen.push(v), |_: &str| {}, || completed = true);
      Notification::Next(1).accept(&mut o);
      Notification::Next(2).accept(&mut o);
      Notification::Completed.accept(&mut o);
    }
    assert_eq!(seen, vec![1, 2]);
    assert!(completed);
  }
}
