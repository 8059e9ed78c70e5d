use std::cmp::Ordering;

use super::{extrema_by::ExtremaByOp, map::MapOp};
use crate::error::EmptySequenceError;

/// Realised as chained composition of extrema_by->map operators.
pub type MinMaxOp<Source, Item, Err, C> =
  MapOp<ExtremaByOp<Source, fn(&Item) -> Item, C, Item>, FirstOnly<Item, Err>, Vec<Item>>;

pub type FirstOnly<Item, Err> = fn(Vec<Item>) -> Result<Item, Err>;

pub(crate) fn identity<Item: Clone>(v: &Item) -> Item { v.clone() }

/// Total order over a partial one: incomparable values (NaN) count as equal.
pub(crate) fn partial_order<T: PartialOrd>(a: &T, b: &T) -> Ordering {
  a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Unwraps the result of an extremum-by to its first element, which is the
/// first extremal element the source produced.
pub(crate) fn first_only<Item, Err>(items: Vec<Item>) -> Result<Item, Err>
where
  Err: From<EmptySequenceError>,
{
  items.into_iter().next().ok_or_else(|| EmptySequenceError.into())
}
