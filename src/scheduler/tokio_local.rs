use std::time::Duration;

use futures::future::{FutureExt, abortable};

use super::{Scheduler, SleepProvider, Task, TaskFuture, TaskHandle};

/// Timers backed by `tokio::time`.
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
  type Sleep = tokio::time::Sleep;

  fn sleep(duration: Duration) -> Self::Sleep { tokio::time::sleep(duration) }
}

/// Spawns tasks onto the current tokio `LocalSet` with `spawn_local`.
///
/// Must be used from inside a `LocalSet`; `spawn_local` panics otherwise.
#[derive(Clone, Copy, Default)]
pub struct TokioLocalScheduler;

impl Scheduler for TokioLocalScheduler {
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let future = TaskFuture::<S, TokioSleep>::new(task, handle.clone(), delay);
    let (future, abort) = abortable(future);
    handle.set_abort(abort);
    tokio::task::spawn_local(future.map(|_| ()));
    handle
  }
}
