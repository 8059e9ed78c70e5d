pub mod extrema_by;
pub mod map;
pub mod map_indexed;
pub mod minmax;

pub use extrema_by::{ExtremaByObserver, ExtremaByOp, Extremum, KeyOrder};
pub use map::{MapObserver, MapOp};
pub use map_indexed::{MapIndexedObserver, MapIndexedOp};
pub use minmax::{FirstOnly, MinMaxOp};
