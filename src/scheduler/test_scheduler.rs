//! Virtual-time scheduler for deterministic tests of time-based operators.
//!
//! Nothing runs until the test moves the clock:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxkit::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! observable::of::<_, ()>(42)
//!   .delay(Duration::from_millis(100), scheduler.clone())
//!   .subscribe(|v| println!("{v}"));
//!
//! // Advance virtual time to trigger the delayed emission
//! scheduler.advance_by(Duration::from_millis(100));
//! ```
//!
//! Each instance owns its own clock and queue, so tests never share state.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  time::Duration,
};

use super::{QueuedTask, Scheduler, Task, TaskHandle, TimedQueue};

#[derive(Default)]
struct TestSchedulerState {
  now: Cell<Duration>,
  queue: RefCell<TimedQueue<Duration>>,
}

/// A scheduler whose clock only moves when told to.
#[derive(Clone, Default)]
pub struct TestScheduler(Rc<TestSchedulerState>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// The current virtual time, measured from the scheduler's creation.
  #[inline]
  pub fn now(&self) -> Duration { self.0.now.get() }

  /// Number of tasks still waiting to run.
  pub fn pending_count(&self) -> usize { self.0.queue.borrow_mut().live_count() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Move the clock forward by `duration`, running every task that becomes
  /// due on the way in time order.
  pub fn advance_by(&self, duration: Duration) { self.run_until(Some(self.now() + duration)) }

  /// Run every queued task, jumping the clock to each due time.
  ///
  /// Periodic tasks keep the queue non-empty; cancel them first or this
  /// never returns.
  pub fn flush(&self) { self.run_until(None) }

  fn run_until(&self, limit: Option<Duration>) {
    loop {
      let next = self.0.queue.borrow_mut().pop_due(limit);
      let Some((due, mut task)) = next else { break };
      if due > self.now() {
        self.0.now.set(due);
      }
      if let Some(delay) = task.run() {
        self.0.queue.borrow_mut().push(self.now() + delay, task);
      }
    }
    if let Some(limit) = limit {
      self.0.now.set(limit.max(self.now()));
    }
  }
}

impl Scheduler for TestScheduler {
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let due = self.now() + delay.unwrap_or_default();
    self
      .0
      .queue
      .borrow_mut()
      .push(due, QueuedTask::new(task, handle.clone()));
    handle
  }
}
