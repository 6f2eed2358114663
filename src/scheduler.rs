//! Schedulers decide *when* a unit of work runs.
//!
//! All schedulers here share one task model: a [`Task`] is some state plus a
//! step function, and each step reports through [`TaskState`] whether the
//! task is finished, wants to run again right away, or wants to sleep. The
//! returned [`TaskHandle`] cancels the task.
//!
//! - [`QueueScheduler`]: synchronous trampoline. Work scheduled while work is
//!   already running is queued instead of recursing.
//! - [`TestScheduler`]: virtual time, advanced explicitly by tests.
//! - `futures::executor::LocalSpawner` (feature `futures-scheduler`) and
//!   [`TokioLocalScheduler`] (feature `tokio-scheduler`): executor-backed.

use std::time::Duration;

mod future;
mod queue;
mod task;
mod test_scheduler;
pub use future::*;
pub use queue::QueueScheduler;
pub(crate) use task::{QueuedTask, TimedQueue};
pub use task::{Task, TaskHandle, TaskState};
pub use test_scheduler::TestScheduler;

#[cfg(feature = "futures-scheduler")]
mod local_pool;
#[cfg(feature = "tokio-scheduler")]
mod tokio_local;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_local::TokioLocalScheduler;

/// A Scheduler is an object to order tasks and schedule their execution.
///
/// Schedulers are cheap handles: cloning one yields another handle to the
/// same queue or executor.
pub trait Scheduler: Clone + 'static {
  /// Run `task` after `delay` (or as soon as possible for `None`), then keep
  /// stepping it for as long as it asks to be rescheduled.
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle;

  /// Run `f` once after `delay`.
  fn schedule_once(&self, f: impl FnOnce() + 'static, delay: Option<Duration>) -> TaskHandle {
    self.schedule(Task::once(f), delay)
  }
}
