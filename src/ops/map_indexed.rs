use std::marker::PhantomData;

use crate::prelude::*;

/// Operator created by [`ObservableExt::map_indexed`].
#[derive(Clone)]
pub struct MapIndexedOp<S, F, Item> {
  source: S,
  func: F,
  _p: PhantomData<Item>,
}

impl<S, F, Item> MapIndexedOp<S, F, Item> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { MapIndexedOp { source, func, _p: PhantomData } }
}

impl<Item, Out, Err, O, S, F> Observable<Out, Err, O> for MapIndexedOp<S, F, Item>
where
  O: Observer<Out, Err>,
  S: Observable<Item, Err, MapIndexedObserver<O, F>>,
  F: FnMut(Item, usize) -> Result<Out, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    // Every subscription starts counting from zero.
    self.source.actual_subscribe(MapIndexedObserver {
      observer,
      func: self.func,
      index: 0,
      is_stopped: false,
    })
  }
}

impl<Item, Out, Err, S, F> ObservableExt<Out, Err> for MapIndexedOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item, usize) -> Result<Out, Err>,
{
}

pub struct MapIndexedObserver<O, F> {
  observer: O,
  func: F,
  index: usize,
  is_stopped: bool,
}

impl<Item, Out, Err, O, F> Observer<Item, Err> for MapIndexedObserver<O, F>
where
  O: Observer<Out, Err>,
  F: FnMut(Item, usize) -> Result<Out, Err>,
{
  fn next(&mut self, value: Item) {
    if self.is_stopped {
      return;
    }
    match (self.func)(value, self.index) {
      Ok(v) => {
        self.index += 1;
        self.observer.next(v);
      }
      Err(err) => {
        self.is_stopped = true;
        self.observer.error(err);
      }
    }
  }

  fn error(&mut self, err: Err) {
    if !self.is_stopped {
      self.is_stopped = true;
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.is_stopped {
      self.is_stopped = true;
      self.observer.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.is_stopped || self.observer.is_finished() }
}
