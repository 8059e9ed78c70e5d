//! Extremum-by aggregation.
//!
//! Collects every element whose key is extremal according to a comparer and
//! emits them, in arrival order, as a single `Vec` once the source completes.
//! An empty source emits an empty `Vec`.

use std::{cmp::Ordering, marker::PhantomData};

use crate::prelude::*;

/// Default key comparer of [`ExtremaByOp`].
pub type KeyOrder<Key> = fn(&Key, &Key) -> Ordering;

/// Which end of the ordering an [`ExtremaByOp`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
  Max,
  Min,
}

/// Operator created by [`ObservableExt::max_by`], [`ObservableExt::min_by`]
/// and their `_with` variants.
#[derive(Clone)]
pub struct ExtremaByOp<S, KF, C, Key> {
  source: S,
  key_selector: KF,
  comparer: C,
  extremum: Extremum,
  _p: PhantomData<Key>,
}

impl<S, KF, C, Key> ExtremaByOp<S, KF, C, Key> {
  pub(crate) fn new(source: S, key_selector: KF, comparer: C, extremum: Extremum) -> Self {
    ExtremaByOp { source, key_selector, comparer, extremum, _p: PhantomData }
  }
}

impl<Item, Err, O, S, KF, C, Key> Observable<Vec<Item>, Err, O> for ExtremaByOp<S, KF, C, Key>
where
  O: Observer<Vec<Item>, Err>,
  S: Observable<Item, Err, ExtremaByObserver<O, KF, C, Item, Key>>,
  KF: FnMut(&Item) -> Key,
  C: FnMut(&Key, &Key) -> Ordering,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(ExtremaByObserver {
      observer,
      key_selector: self.key_selector,
      comparer: self.comparer,
      extremum: self.extremum,
      last_key: None,
      items: vec![],
    })
  }
}

impl<Item, Err, S, KF, C, Key> ObservableExt<Vec<Item>, Err> for ExtremaByOp<S, KF, C, Key>
where
  S: ObservableExt<Item, Err>,
  KF: FnMut(&Item) -> Key,
  C: FnMut(&Key, &Key) -> Ordering,
{
}

pub struct ExtremaByObserver<O, KF, C, Item, Key> {
  observer: O,
  key_selector: KF,
  comparer: C,
  extremum: Extremum,
  last_key: Option<Key>,
  items: Vec<Item>,
}

impl<Item, Err, O, KF, C, Key> Observer<Item, Err> for ExtremaByObserver<O, KF, C, Item, Key>
where
  O: Observer<Vec<Item>, Err>,
  KF: FnMut(&Item) -> Key,
  C: FnMut(&Key, &Key) -> Ordering,
{
  fn next(&mut self, value: Item) {
    let key = (self.key_selector)(&value);
    let ord = match self.last_key.as_ref() {
      None => Ordering::Greater,
      Some(last) => {
        let ord = (self.comparer)(&key, last);
        match self.extremum {
          Extremum::Max => ord,
          Extremum::Min => ord.reverse(),
        }
      }
    };
    match ord {
      Ordering::Greater => {
        self.last_key = Some(key);
        self.items.clear();
        self.items.push(value);
      }
      Ordering::Equal => self.items.push(value),
      Ordering::Less => {}
    }
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let items = std::mem::take(&mut self.items);
    self.observer.next(items);
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn keeps_all_elements_sharing_the_max_key() {
    let mut emitted = vec![];
    observable::from_iter::<_, RxError>(vec!["a", "bb", "cc", "d", "ee"])
      .max_by(|s: &&str| s.len())
      .subscribe_all(|v| emitted.push(v), |_| {}, || {});
    assert_eq!(emitted, vec![vec!["bb", "cc", "ee"]]);
  }

  #[test]
  fn min_by_key() {
    let mut emitted = vec![];
    observable::from_iter::<_, RxError>(vec![(1, 'x'), (0, 'y'), (2, 'z'), (0, 'w')])
      .min_by(|v: &(i32, char)| v.0)
      .subscribe_all(|v| emitted.push(v), |_| {}, || {});
    assert_eq!(emitted, vec![vec![(0, 'y'), (0, 'w')]]);
  }

  #[test]
  fn custom_comparer() {
    let mut emitted = vec![];
    observable::from_iter::<_, RxError>(vec![3, -7, 5])
      .max_by_with(|v: &i32| *v, |a: &i32, b: &i32| a.abs().cmp(&b.abs()))
      .subscribe_all(|v| emitted.push(v), |_| {}, || {});
    assert_eq!(emitted, vec![vec![-7]]);
  }

  #[test]
  fn empty_source_emits_empty_vec() {
    let mut emitted = vec![];
    let mut completed = false;
    observable::empty::<i32, RxError>()
      .max_by(|v: &i32| *v)
      .subscribe_all(|v| emitted.push(v), |_| {}, || completed = true);
    assert_eq!(emitted, vec![Vec::<i32>::new()]);
    assert!(completed);
  }
}
