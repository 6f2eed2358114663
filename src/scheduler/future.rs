use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll, ready},
  time::Duration,
};

use pin_project_lite::pin_project;

use super::{Task, TaskHandle, TaskState};
use crate::subscription::SubscriptionLike;

/// Source of timer futures for an executor-backed scheduler.
pub trait SleepProvider: 'static {
  type Sleep: Future;

  fn sleep(duration: Duration) -> Self::Sleep;
}

pin_project! {
  /// Drives a [`Task`] to completion as a future: sleeps for the initial
  /// delay, then steps the task, sleeping or yielding between steps as it
  /// asks.
  pub struct TaskFuture<S, P>
  where
    P: SleepProvider,
  {
    task: Task<S>,
    handle: TaskHandle,
    #[pin]
    sleep: Option<P::Sleep>,
  }
}

impl<S, P: SleepProvider> TaskFuture<S, P> {
  pub fn new(task: Task<S>, handle: TaskHandle, delay: Option<Duration>) -> Self {
    TaskFuture { task, handle, sleep: delay.map(P::sleep) }
  }
}

impl<S, P: SleepProvider> Future for TaskFuture<S, P> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let mut this = self.project();
    loop {
      if let Some(sleep) = this.sleep.as_mut().as_pin_mut() {
        ready!(sleep.poll(cx));
        this.sleep.set(None);
      }
      if this.handle.is_closed() {
        return Poll::Ready(());
      }
      tracing::trace!("running scheduled task");
      match this.task.step() {
        TaskState::Finished => {
          this.handle.mark_finished();
          return Poll::Ready(());
        }
        TaskState::Yield => {
          cx.waker().wake_by_ref();
          return Poll::Pending;
        }
        TaskState::Sleeping(duration) => this.sleep.set(Some(P::sleep(duration))),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::Cell,
    future::{Ready, ready},
    rc::Rc,
  };

  use futures::executor::block_on;

  use super::*;
  use crate::subscription::SubscriptionLike;

  struct Immediate;

  impl SleepProvider for Immediate {
    type Sleep = Ready<()>;

    fn sleep(_: Duration) -> Self::Sleep { ready(()) }
  }

  #[rxkit_macro::test]
  fn steps_until_finished() {
    let steps = Rc::new(Cell::new(0));
    let c_steps = steps.clone();
    let task = Task::new(0, move |n: &mut u32| {
      *n += 1;
      c_steps.set(*n);
      match *n {
        1 => TaskState::Yield,
        2 => TaskState::Sleeping(Duration::from_secs(60)),
        _ => TaskState::Finished,
      }
    });
    let handle = TaskHandle::new();
    block_on(TaskFuture::<_, Immediate>::new(task, handle.clone(), Some(Duration::from_secs(1))));
    assert_eq!(steps.get(), 3);
    assert!(handle.is_finished());
  }

  #[rxkit_macro::test]
  fn cancelled_handle_resolves_without_stepping() {
    let stepped = Rc::new(Cell::new(false));
    let c_stepped = stepped.clone();
    let handle = TaskHandle::new();
    handle.unsubscribe().unwrap();
    block_on(TaskFuture::<_, Immediate>::new(Task::once(move || c_stepped.set(true)), handle, None));
    assert!(!stepped.get());
  }
}
