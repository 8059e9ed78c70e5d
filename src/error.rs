//! Error types.
//!
//! Two families live here. Stream errors travel downstream as `Error`
//! notifications and end up in a recorded log: [`RxError`] is a ready-made
//! stream error type, and [`EmptySequenceError`] is what the extremum
//! operators produce for a source that completed without elements.
//! [`SchedulerError`] is the harness-level failure returned from the run loop.

use thiserror::Error;

use crate::scheduler::Tick;

/// The source completed before producing any element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sequence contains no elements")]
pub struct EmptySequenceError;

/// General purpose stream error.
///
/// Operators that need to raise their own failures (like `max` on an empty
/// source) require `Err: From<EmptySequenceError>`, which this type
/// satisfies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RxError {
  /// A mapper, selector or other pipeline callback returned a failure.
  #[error("callback failed: {0}")]
  UserCallback(String),
  #[error(transparent)]
  EmptySequence(#[from] EmptySequenceError),
}

impl RxError {
  pub fn callback(msg: impl Into<String>) -> Self { RxError::UserCallback(msg.into()) }
}

/// Failure of the scheduler itself, as opposed to a failure inside a stream.
///
/// Returned from [`start`](crate::scheduler::VirtualTimeScheduler::start)
/// and the `start_with_*` entry points. A run that fails is aborted: the
/// actions still queued stay queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
  /// A scheduled action returned an error.
  #[error("scheduled action failed: {0}")]
  Action(String),
  #[error("scheduler is already running")]
  AlreadyRunning,
  #[error("cannot move virtual time backwards from {clock} to {requested}")]
  TimeTravel { clock: Tick, requested: Tick },
  #[error("subscribe ran at {clock} before the observable was created")]
  NotCreated { clock: Tick },
  #[error("dispose ran at {clock} before the observable was subscribed")]
  NotSubscribed { clock: Tick },
  #[error("run exceeded the limit of {limit} actions")]
  StepLimitExceeded { limit: u64 },
}

impl SchedulerError {
  /// Wraps any displayable failure raised by an action.
  pub fn action(err: impl std::fmt::Display) -> Self { SchedulerError::Action(err.to_string()) }
}
