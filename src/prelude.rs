//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core traits
pub use crate::observable::{self, Observable, ObservableExt};
pub use crate::observer::{Observer, ObserverAll};
// Notifications
pub use crate::notification::{Messages, Notification, Recorded};
// Schedulers
pub use crate::scheduler::{
  Scheduler, SchedulerConfig, TaskHandle, TestScheduler, Tick, VirtualClock, VirtualTimeScheduler,
};
// Subscription
pub use crate::subscription::*;
// Errors
pub use crate::error::{EmptySequenceError, RxError, SchedulerError};
