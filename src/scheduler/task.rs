use std::{
  cell::{Cell, RefCell},
  cmp::Ordering,
  collections::BinaryHeap,
  rc::Rc,
  time::Duration,
};

use futures::future::AbortHandle;

use crate::{
  error::UnsubscriptionError,
  subscription::{SubscriptionLike, Teardown},
};

/// What a task wants after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  Finished,
  /// Run again as soon as the scheduler gets to it.
  Yield,
  /// Run again after the given duration.
  Sleeping(Duration),
}

/// A unit of scheduled work: some state and a step function over it.
pub struct Task<S> {
  state: S,
  work: Box<dyn FnMut(&mut S) -> TaskState>,
}

impl<S> Task<S> {
  pub fn new(state: S, work: impl FnMut(&mut S) -> TaskState + 'static) -> Self {
    Task { state, work: Box::new(work) }
  }

  #[inline]
  pub fn step(&mut self) -> TaskState { (self.work)(&mut self.state) }
}

impl<F: FnOnce() + 'static> Task<Option<F>> {
  /// A task that runs `f` once and finishes.
  pub fn once(f: F) -> Self {
    Task::new(Some(f), |f: &mut Option<F>| {
      if let Some(f) = f.take() {
        f();
      }
      TaskState::Finished
    })
  }
}

#[derive(Default)]
struct HandleState {
  cancelled: Cell<bool>,
  finished: Cell<bool>,
  abort: RefCell<Option<AbortHandle>>,
}

/// Cancellation handle for a scheduled task.
///
/// Unsubscribing before the task runs prevents it from running.
/// Unsubscribing from inside the running step lets that step finish but
/// prevents every continuation it asked for.
#[derive(Clone, Default)]
pub struct TaskHandle(Rc<HandleState>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// A handle for work that already ran to completion.
  pub fn finished() -> Self {
    let handle = Self::default();
    handle.mark_finished();
    handle
  }

  #[inline]
  pub fn is_finished(&self) -> bool { self.0.finished.get() }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.get() }

  pub(crate) fn mark_finished(&self) {
    self.0.finished.set(true);
    self.0.abort.borrow_mut().take();
  }

  /// Attach the abort switch of the future driving this task, so cancelling
  /// also drops a pending sleep.
  pub(crate) fn set_abort(&self, abort: AbortHandle) {
    if self.is_cancelled() {
      abort.abort();
    } else {
      *self.0.abort.borrow_mut() = Some(abort);
    }
  }
}

impl SubscriptionLike for TaskHandle {
  fn unsubscribe(&self) -> Result<(), UnsubscriptionError> {
    if !self.0.cancelled.replace(true) {
      if let Some(abort) = self.0.abort.borrow_mut().take() {
        abort.abort();
      }
    }
    Ok(())
  }

  #[inline]
  fn is_closed(&self) -> bool { self.is_cancelled() || self.is_finished() }
}

impl From<TaskHandle> for Teardown {
  #[inline]
  fn from(handle: TaskHandle) -> Self { Teardown::handle(handle) }
}

/// A type-erased task waiting in a scheduler queue, with its handle.
pub(crate) struct QueuedTask {
  handle: TaskHandle,
  step: Box<dyn FnMut() -> TaskState>,
}

impl QueuedTask {
  pub(crate) fn new<S: 'static>(mut task: Task<S>, handle: TaskHandle) -> Self {
    QueuedTask { handle, step: Box::new(move || task.step()) }
  }

  /// Run one step. Returns the delay before the next step, or `None` when the
  /// task is done or was cancelled.
  pub(crate) fn run(&mut self) -> Option<Duration> {
    if self.handle.is_closed() {
      return None;
    }
    tracing::trace!("running scheduled task");
    let next = match (self.step)() {
      TaskState::Finished => None,
      TaskState::Yield => Some(Duration::ZERO),
      TaskState::Sleeping(d) => Some(d),
    };
    if next.is_none() {
      self.handle.mark_finished();
    }
    next.filter(|_| !self.handle.is_closed())
  }

  #[inline]
  pub(crate) fn is_closed(&self) -> bool { self.handle.is_closed() }
}

struct TimedEntry<T> {
  due: T,
  seq: u64,
  task: QueuedTask,
}

impl<T: Ord> PartialEq for TimedEntry<T> {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl<T: Ord> Eq for TimedEntry<T> {}

impl<T: Ord> PartialOrd for TimedEntry<T> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl<T: Ord> Ord for TimedEntry<T> {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by sequence number
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

/// Tasks ordered by due time, ties broken by insertion order.
pub(crate) struct TimedQueue<T> {
  heap: BinaryHeap<TimedEntry<T>>,
  next_seq: u64,
}

impl<T: Ord + Copy> TimedQueue<T> {
  pub(crate) fn push(&mut self, due: T, task: QueuedTask) {
    let seq = self.next_seq;
    self.next_seq += 1;
    self.heap.push(TimedEntry { due, seq, task });
  }

  /// Remove and return the earliest task if it is due at or before `limit`.
  pub(crate) fn pop_due(&mut self, limit: Option<T>) -> Option<(T, QueuedTask)> {
    let due = self.heap.peek()?.due;
    if limit.is_some_and(|limit| due > limit) {
      return None;
    }
    self.heap.pop().map(|e| (e.due, e.task))
  }

  /// Drop cancelled tasks and count the live ones.
  pub(crate) fn live_count(&mut self) -> usize {
    self.heap.retain(|e| !e.task.is_closed());
    self.heap.len()
  }
}

impl<T> Default for TimedQueue<T> {
  fn default() -> Self { TimedQueue { heap: BinaryHeap::new(), next_seq: 0 } }
}
