use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  time::{Duration, Instant},
};

use super::{QueuedTask, Scheduler, Task, TaskHandle, TimedQueue};

#[derive(Default)]
struct QueueState {
  running: Cell<bool>,
  queue: RefCell<TimedQueue<Instant>>,
}

/// Synchronous trampoline scheduler.
///
/// Scheduling from outside any task runs the task, and everything it
/// schedules in turn, before `schedule` returns. Scheduling from inside a
/// running task only queues, so chains of synchronous work run in a flat
/// loop instead of growing the stack.
///
/// Delayed tasks block the draining thread until they are due.
#[derive(Clone, Default)]
pub struct QueueScheduler(Rc<QueueState>);

/// Clears the running flag even if a task panics.
struct Running<'a>(&'a Cell<bool>);

impl Drop for Running<'_> {
  fn drop(&mut self) { self.0.set(false) }
}

impl QueueScheduler {
  pub fn new() -> Self { Self::default() }

  /// Whether a drain loop is active on this scheduler.
  #[inline]
  pub fn is_running(&self) -> bool { self.0.running.get() }

  fn drain(&self) {
    let _running = Running(&self.0.running);
    self.0.running.set(true);
    tracing::trace!("queue scheduler drain started");
    loop {
      let next = self.0.queue.borrow_mut().pop_due(None);
      let Some((due, mut task)) = next else { break };
      if task.is_closed() {
        continue;
      }
      let now = Instant::now();
      if due > now {
        std::thread::sleep(due - now);
      }
      if let Some(delay) = task.run() {
        self.0.queue.borrow_mut().push(Instant::now() + delay, task);
      }
    }
    tracing::trace!("queue scheduler drain finished");
  }
}

impl Scheduler for QueueScheduler {
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let due = Instant::now() + delay.unwrap_or_default();
    self
      .0
      .queue
      .borrow_mut()
      .push(due, QueuedTask::new(task, handle.clone()));
    if !self.is_running() {
      self.drain();
    }
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{scheduler::TaskState, subscription::SubscriptionLike};

  #[rxkit_macro::test]
  fn top_level_schedule_runs_before_returning() {
    let scheduler = QueueScheduler::new();
    let ran = Rc::new(Cell::new(false));
    let c_ran = ran.clone();
    let handle = scheduler.schedule_once(move || c_ran.set(true), None);
    assert!(ran.get());
    assert!(handle.is_finished());
    assert!(!scheduler.is_running());
  }

  #[rxkit_macro::test]
  fn nested_work_is_queued_not_recursed() {
    let scheduler = QueueScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let (c_log, c_scheduler) = (log.clone(), scheduler.clone());
    scheduler.schedule_once(
      move || {
        let inner_log = c_log.clone();
        c_scheduler.schedule_once(move || inner_log.borrow_mut().push("inner"), None);
        c_log.borrow_mut().push("outer done");
      },
      None,
    );
    assert_eq!(*log.borrow(), ["outer done", "inner"]);
  }

  #[rxkit_macro::test]
  fn deep_chains_keep_a_flat_stack() {
    fn chain(scheduler: QueueScheduler, count: Rc<Cell<usize>>) {
      if count.get() == 100_000 {
        return;
      }
      count.set(count.get() + 1);
      let next = scheduler.clone();
      scheduler.schedule_once(move || chain(next, count), None);
    }
    let count = Rc::new(Cell::new(0));
    chain(QueueScheduler::new(), count.clone());
    assert_eq!(count.get(), 100_000);
  }

  #[rxkit_macro::test]
  fn cancel_before_run_skips_the_task() {
    let scheduler = QueueScheduler::new();
    let ran = Rc::new(Cell::new(false));
    let (c_ran, c_scheduler) = (ran.clone(), scheduler.clone());
    scheduler.schedule_once(
      move || {
        let c_ran = c_ran.clone();
        let handle = c_scheduler.schedule_once(move || c_ran.set(true), None);
        handle.unsubscribe().unwrap();
      },
      None,
    );
    assert!(!ran.get());
  }

  #[rxkit_macro::test]
  fn cancel_during_step_stops_continuations() {
    let scheduler = QueueScheduler::new();
    let steps = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<TaskHandle>>> = Rc::default();
    let (c_steps, c_slot) = (steps.clone(), slot.clone());
    let task = Task::new((), move |_: &mut ()| {
      c_steps.set(c_steps.get() + 1);
      if let Some(handle) = c_slot.borrow().as_ref() {
        handle.unsubscribe().unwrap();
      }
      TaskState::Yield
    });

    // Scheduled from inside running work, so the handle is stored before the
    // first step.
    let (c_scheduler, c_slot) = (scheduler.clone(), slot.clone());
    scheduler.schedule_once(move || *c_slot.borrow_mut() = Some(c_scheduler.schedule(task, None)), None);
    assert_eq!(steps.get(), 1);
  }

  #[rxkit_macro::test]
  fn delayed_work_runs_in_due_order() {
    let scheduler = QueueScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let (c_log, c_scheduler) = (log.clone(), scheduler.clone());
    scheduler.schedule_once(
      move || {
        let (late, early) = (c_log.clone(), c_log.clone());
        c_scheduler.schedule_once(move || late.borrow_mut().push(2), Some(Duration::from_millis(4)));
        c_scheduler.schedule_once(move || early.borrow_mut().push(1), Some(Duration::from_millis(1)));
      },
      None,
    );
    assert_eq!(*log.borrow(), [1, 2]);
  }
}
