use std::time::Duration;

use futures::{
  executor::LocalSpawner,
  future::{FutureExt, abortable},
  task::LocalSpawnExt,
};

use super::{Scheduler, SleepProvider, Task, TaskFuture, TaskHandle};
use crate::{config::report_unhandled_error, error::UnhandledError};

/// Timers backed by `futures-time`.
pub struct FuturesTimeSleep;

impl SleepProvider for FuturesTimeSleep {
  type Sleep = futures_time::task::Sleep;

  fn sleep(duration: Duration) -> Self::Sleep { futures_time::task::sleep(duration.into()) }
}

/// Runs tasks on a `futures` `LocalPool`. Nothing happens until the pool is
/// driven.
impl Scheduler for LocalSpawner {
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let future = TaskFuture::<S, FuturesTimeSleep>::new(task, handle.clone(), delay);
    let (future, abort) = abortable(future);
    handle.set_abort(abort);
    if let Err(err) = self.spawn_local(future.map(|_| ())) {
      report_unhandled_error(UnhandledError::Spawn(err.to_string()));
    }
    handle
  }
}
