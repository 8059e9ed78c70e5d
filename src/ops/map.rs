use std::marker::PhantomData;

use crate::prelude::*;

/// Operator created by [`ObservableExt::map`].
#[derive(Clone)]
pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _p: PhantomData<Item>,
}

impl<S, F, Item> MapOp<S, F, Item> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func, _p: PhantomData } }
}

impl<Item, Out, Err, O, S, F> Observable<Out, Err, O> for MapOp<S, F, Item>
where
  O: Observer<Out, Err>,
  S: Observable<Item, Err, MapObserver<O, F>>,
  F: FnMut(Item) -> Result<Out, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(MapObserver { observer, func: self.func, is_stopped: false })
  }
}

impl<Item, Out, Err, S, F> ObservableExt<Out, Err> for MapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> Result<Out, Err>,
{
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
  is_stopped: bool,
}

impl<Item, Out, Err, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<Out, Err>,
  F: FnMut(Item) -> Result<Out, Err>,
{
  fn next(&mut self, value: Item) {
    if self.is_stopped {
      return;
    }
    match (self.func)(value) {
      Ok(v) => self.observer.next(v),
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
