//! # rxmarble: deterministic marble testing for Reactive Extensions
//!
//! A virtual-time scheduler, replay sources and a recording observer for
//! writing reproducible tests of reactive pipelines, plus the `map`,
//! `map_indexed` and `max` family of operators to test with.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxmarble::{prelude::*, testing::*};
//!
//! let scheduler = TestScheduler::new();
//! let source = scheduler.create_cold_observable(vec![
//!   on_next::<_, RxError>(10, 1),
//!   on_next(20, 2),
//!   on_completed(30),
//! ]);
//!
//! let messages = scheduler
//!   .start_with_create(move || source.map_indexed(|v, i| Ok(v * 100 + i)))
//!   .unwrap();
//!
//! assert_eq!(messages, vec![on_next(210, 100), on_next(220, 201), on_completed(230)]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TestScheduler`] | Virtual clock plus the `start_with_*` orchestration |
//! | [`Observable`] | Something an observer can subscribe to |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`testing`] | Cold/hot replay sources and the recording observer |
//!
//! Everything is single threaded: the clock only moves when the scheduler
//! drains its queue, and the same test always produces the same log.
//!
//! [`TestScheduler`]: scheduler::TestScheduler
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subscription;
pub mod testing;

pub use prelude::*;

#[cfg(doctest)]
mod readme {
  #![doc = include_str!("../README.md")]
}
