//! The Observable side of the contract and the operator extension trait.

use std::cmp::Ordering;

use crate::{
  error::EmptySequenceError,
  observer::{Observer, ObserverAll},
  ops::{
    extrema_by::{ExtremaByOp, Extremum, KeyOrder},
    map::MapOp,
    map_indexed::MapIndexedOp,
    minmax::{first_only, identity, partial_order, FirstOnly, MinMaxOp},
  },
};

mod from_iter;
mod trivial;
pub use from_iter::*;
pub use trivial::*;

/// A source of `Item`s, terminated by completion or an `Err`, that can push
/// them into an observer of type `O`.
///
/// Subscribing consumes the observable; sources that support several
/// subscribers are cheap to clone.
pub trait Observable<Item, Err, O> {
  /// Handle returned to the subscriber to cancel the subscription.
  type Unsub: crate::subscription::Subscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Operators available on every observable.
///
/// Callbacks that can fail return `Result`; an `Err` is delivered downstream
/// as the stream's error and never escapes to the caller.
pub trait ObservableExt<Item, Err>: Sized {
  /// Creates a new stream which calls a closure on each element and emits
  /// its `Ok` value.
  ///
  /// # Examples
  ///
  /// ```
  /// use rxmarble::prelude::*;
  ///
  /// let mut doubled = vec![];
  /// observable::from_iter(1..4)
  ///   .map(|v| Ok(v * 2))
  ///   .subscribe_all(|v| doubled.push(v), |_: RxError| {}, || {});
  /// assert_eq!(doubled, vec![2, 4, 6]);
  /// ```
  #[inline]
  fn map<Out, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<Out, Err>,
  {
    MapOp::new(self, f)
  }

  /// Like [`map`](Self::map) but the closure also receives the index of the
  /// element among the successfully mapped ones of this subscription.
  #[inline]
  fn map_indexed<Out, F>(self, f: F) -> MapIndexedOp<Self, F, Item>
  where
    F: FnMut(Item, usize) -> Result<Out, Err>,
  {
    MapIndexedOp::new(self, f)
  }

  /// Emits, on completion, every element whose key is the greatest.
  fn max_by<Key, KF>(self, key_selector: KF) -> ExtremaByOp<Self, KF, KeyOrder<Key>, Key>
  where
    KF: FnMut(&Item) -> Key,
    Key: PartialOrd,
  {
    ExtremaByOp::new(self, key_selector, partial_order::<Key> as KeyOrder<Key>, Extremum::Max)
  }

  /// [`max_by`](Self::max_by) with a custom key comparer.
  fn max_by_with<Key, KF, C>(self, key_selector: KF, comparer: C) -> ExtremaByOp<Self, KF, C, Key>
  where
    KF: FnMut(&Item) -> Key,
    C: FnMut(&Key, &Key) -> Ordering,
  {
    ExtremaByOp::new(self, key_selector, comparer, Extremum::Max)
  }

  /// Emits, on completion, every element whose key is the smallest.
  fn min_by<Key, KF>(self, key_selector: KF) -> ExtremaByOp<Self, KF, KeyOrder<Key>, Key>
  where
    KF: FnMut(&Item) -> Key,
    Key: PartialOrd,
  {
    ExtremaByOp::new(self, key_selector, partial_order::<Key> as KeyOrder<Key>, Extremum::Min)
  }

  /// [`min_by`](Self::min_by) with a custom key comparer.
  fn min_by_with<Key, KF, C>(self, key_selector: KF, comparer: C) -> ExtremaByOp<Self, KF, C, Key>
  where
    KF: FnMut(&Item) -> Key,
    C: FnMut(&Key, &Key) -> Ordering,
  {
    ExtremaByOp::new(self, key_selector, comparer, Extremum::Min)
  }

  /// Emits the item from the source observable that had the maximum value.
  ///
  /// Among equal maxima the first one emitted by the source wins. An empty
  /// source fails with [`EmptySequenceError`].
  ///
  /// # Examples
  ///
  /// ```
  /// use rxmarble::prelude::*;
  ///
  /// let mut max = None;
  /// observable::from_iter(vec![3., 4., 7., 5., 6.])
  ///   .max()
  ///   .subscribe_all(|v| max = Some(v), |_: RxError| {}, || {});
  /// assert_eq!(max, Some(7.));
  /// ```
  fn max(self) -> MinMaxOp<Self, Item, Err, KeyOrder<Item>>
  where
    Item: Clone + PartialOrd,
    Err: From<EmptySequenceError>,
  {
    self.max_with(partial_order::<Item> as KeyOrder<Item>)
  }

  /// [`max`](Self::max) with a custom comparer.
  fn max_with<C>(self, comparer: C) -> MinMaxOp<Self, Item, Err, C>
  where
    Item: Clone,
    C: FnMut(&Item, &Item) -> Ordering,
    Err: From<EmptySequenceError>,
  {
    let key = identity::<Item> as fn(&Item) -> Item;
    let extrema = ExtremaByOp::new(self, key, comparer, Extremum::Max);
    MapOp::new(extrema, first_only::<Item, Err> as FirstOnly<Item, Err>)
  }

  /// Emits the item from the source observable that had the minimum value.
  ///
  /// Among equal minima the first one emitted by the source wins. An empty
  /// source fails with [`EmptySequenceError`].
  fn min(self) -> MinMaxOp<Self, Item, Err, KeyOrder<Item>>
  where
    Item: Clone + PartialOrd,
    Err: From<EmptySequenceError>,
  {
    self.min_with(partial_order::<Item> as KeyOrder<Item>)
  }

  /// [`min`](Self::min) with a custom comparer.
  fn min_with<C>(self, comparer: C) -> MinMaxOp<Self, Item, Err, C>
  where
    Item: Clone,
    C: FnMut(&Item, &Item) -> Ordering,
    Err: From<EmptySequenceError>,
  {
    let key = identity::<Item> as fn(&Item) -> Item;
    let extrema = ExtremaByOp::new(self, key, comparer, Extremum::Min);
    MapOp::new(extrema, first_only::<Item, Err> as FirstOnly<Item, Err>)
  }

  /// Subscribes `observer`.
  #[inline]
  fn subscribe<O>(self, observer: O) -> <Self as Observable<Item, Err, O>>::Unsub
  where
    Self: Observable<Item, Err, O>,
    O: Observer<Item, Err>,
  {
    self.actual_subscribe(observer)
  }

  /// Subscribes with one closure per notification kind.
  #[inline]
  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> <Self as Observable<Item, Err, ObserverAll<N, E, C>>>::Unsub
  where
    Self: Observable<Item, Err, ObserverAll<N, E, C>>,
    N: FnMut(Item),
    E: FnMut(Err),
    C: FnMut(),
  {
    self.actual_subscribe(ObserverAll::new(next, error, complete))
  }
}
