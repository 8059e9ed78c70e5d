use std::marker::PhantomData;

use crate::prelude::*;

/// Creates an observable that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `e` - An error to emit and terminate with
pub fn throw<Item, Err>(e: Err) -> Throw<Item, Err> { Throw(e, PhantomData) }

pub struct Throw<Item, Err>(Err, PhantomData<Item>);

impl<Item, Err: Clone> Clone for Throw<Item, Err> {
  fn clone(&self) -> Self { Throw(self.0.clone(), PhantomData) }
}

impl<Item, Err, O> Observable<Item, Err, O> for Throw<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub { observer.error(self.0) }
}

impl<Item, Err> ObservableExt<Item, Err> for Throw<Item, Err> {}
