use std::marker::PhantomData;

use crate::prelude::*;

/// Creates an observable that produces values from an iterator.
///
/// Emits synchronously during subscription and completes when all elements
/// have been emitted. Never emits an error; the error type is left to the
/// pipeline.
///
/// # Examples
///
/// ```
/// use rxmarble::prelude::*;
///
/// let mut sum = 0;
/// observable::from_iter(0..10).subscribe_all(|v| sum += v, |_: RxError| {}, || {});
/// assert_eq!(sum, 45);
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
{
  ObservableIter(iter, PhantomData)
}

/// An observable that completes without emitting.
pub fn empty<Item, Err>() -> ObservableIter<std::iter::Empty<Item>, Err> {
  from_iter(std::iter::empty())
}

pub struct ObservableIter<Iter, Err>(Iter, PhantomData<Err>);

impl<Iter: Clone, Err> Clone for ObservableIter<Iter, Err> {
  fn clone(&self) -> Self { ObservableIter(self.0.clone(), PhantomData) }
}

impl<Iter, Err, O> Observable<Iter::Item, Err, O> for ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_finished() {
        return;
      }
      observer.next(v);
    }
    if !observer.is_finished() {
      observer.complete();
    }
  }
}

impl<Iter, Err> ObservableExt<Iter::Item, Err> for ObservableIter<Iter, Err> where
  Iter: IntoIterator
{
}
