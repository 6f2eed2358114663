//! Concurrency-limited fan-in: `merge_all` and everything built on it.
//!
//! Outer values are projected to inner observables. At most `concurrent`
//! inners are subscribed at once; the rest wait in a FIFO buffer. The result
//! completes when the outer stream completed, the buffer is empty and no
//! inner is active. Any error, outer or inner, fails the whole stream at once
//! and tears down every active inner.
//!
//! Starting inners is done by a single drain loop, so inners that complete
//! synchronously hand their slot back to the loop instead of recursing. Long
//! synchronous `concat` chains therefore run in constant stack depth.

use std::{
  cell::RefCell,
  collections::VecDeque,
  rc::{Rc, Weak},
};

use crate::{
  observable::{self, Observable},
  observer::Observer,
  subscriber::Subscriber,
  subscription::Teardown,
};

/// Passing this as the concurrency limit means "no limit".
pub const UNBOUNDED: usize = usize::MAX;

struct MergeState<V> {
  active: usize,
  buffer: VecDeque<V>,
  outer_completed: bool,
  draining: bool,
}

struct MergeContext<V, Out, Err, F> {
  downstream: Subscriber<Out, Err>,
  project: RefCell<F>,
  concurrent: usize,
  state: RefCell<MergeState<V>>,
}

impl<V, Out, Err, F> MergeContext<V, Out, Err, F>
where
  V: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(V) -> Result<Observable<Out, Err>, Err> + 'static,
{
  fn new(downstream: Subscriber<Out, Err>, project: F, concurrent: usize) -> Rc<Self> {
    let state = MergeState { active: 0, buffer: VecDeque::new(), outer_completed: false, draining: false };
    let ctx = Rc::new(MergeContext {
      downstream: downstream.clone(),
      project: RefCell::new(project),
      concurrent,
      state: RefCell::new(state),
    });

    // Values still waiting for a slot are dropped, never projected, once the
    // result is unsubscribed.
    let weak: Weak<Self> = Rc::downgrade(&ctx);
    downstream.add(Teardown::action(move || {
      let Some(ctx) = weak.upgrade() else { return };
      let dropped = ctx
        .state
        .try_borrow_mut()
        .map(|mut state| std::mem::take(&mut state.buffer));
      drop(dropped);
    }));
    ctx
  }

  fn push(self: &Rc<Self>, value: V) {
    self.state.borrow_mut().buffer.push_back(value);
    self.drain();
  }

  fn drain(self: &Rc<Self>) {
    {
      let mut state = self.state.borrow_mut();
      if state.draining {
        return;
      }
      state.draining = true;
    }

    while !self.downstream.is_closed() {
      let next = {
        let mut state = self.state.borrow_mut();
        if state.active < self.concurrent {
          let next = state.buffer.pop_front();
          if next.is_some() {
            state.active += 1;
          }
          next
        } else {
          None
        }
      };
      let Some(value) = next else { break };
      self.subscribe_inner(value);
    }

    self.state.borrow_mut().draining = false;
    self.complete_if_done();
  }

  fn subscribe_inner(self: &Rc<Self>, value: V) {
    let projected = {
      let mut project = self.project.borrow_mut();
      (*project)(value)
    };
    let inner = match projected {
      Ok(inner) => inner,
      Err(err) => {
        self.downstream.error(err);
        return;
      }
    };
    let subscriber = Subscriber::new(InnerObserver(self.clone()));
    self.downstream.add(subscriber.subscription().clone());
    let subscription = inner.actual_subscribe(subscriber);

    // The slot frees up only after the inner's own teardowns ran. The context
    // must outlive the inner observer, which is dropped before teardowns run.
    let ctx = self.clone();
    subscription.add(Teardown::action(move || ctx.release_slot()));
  }

  fn release_slot(self: &Rc<Self>) {
    {
      let mut state = self.state.borrow_mut();
      state.active = state.active.saturating_sub(1);
    }
    self.drain();
  }

  fn outer_complete(self: &Rc<Self>) {
    self.state.borrow_mut().outer_completed = true;
    self.complete_if_done();
  }

  fn complete_if_done(&self) {
    let done = {
      let state = self.state.borrow();
      state.outer_completed && !state.draining && state.active == 0 && state.buffer.is_empty()
    };
    if done {
      self.downstream.complete();
    }
  }
}

struct OuterObserver<V, Out, Err, F>(Rc<MergeContext<V, Out, Err, F>>);

impl<V, Out, Err, F> Observer<V, Err> for OuterObserver<V, Out, Err, F>
where
  V: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(V) -> Result<Observable<Out, Err>, Err> + 'static,
{
  fn next(&mut self, value: V) { self.0.push(value) }

  fn error(&mut self, err: Err) { self.0.downstream.error(err) }

  fn complete(&mut self) { self.0.outer_complete() }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

struct InnerObserver<V, Out, Err, F>(Rc<MergeContext<V, Out, Err, F>>);

impl<V, Out, Err, F> Observer<Out, Err> for InnerObserver<V, Out, Err, F>
where
  V: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(V) -> Result<Observable<Out, Err>, Err> + 'static,
{
  fn next(&mut self, value: Out) { self.0.downstream.next(value) }

  fn error(&mut self, err: Err) { self.0.downstream.error(err) }

  fn complete(&mut self) {}

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Project each value to an observable and merge the results, keeping at
  /// most `concurrent` inner subscriptions alive at a time. A projection
  /// that returns `Err` fails the stream.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn try_merge_map<Out, F>(self, project: F, concurrent: usize) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Result<Observable<Out, Err>, Err> + Clone + 'static,
  {
    assert!(concurrent > 0, "merge concurrency must be at least 1");
    self.lift(move |downstream| OuterObserver(MergeContext::new(downstream, project.clone(), concurrent)))
  }

  /// Project each value to an observable and merge the results. Pass
  /// [`UNBOUNDED`] to subscribe every inner as soon as it arrives.
  pub fn merge_map<Out, F>(self, mut project: F, concurrent: usize) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Observable<Out, Err> + Clone + 'static,
  {
    self.try_merge_map(move |value| Ok(project(value)), concurrent)
  }

  /// Project each value to an observable and run them one after another.
  pub fn concat_map<Out, F>(self, project: F) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Observable<Out, Err> + Clone + 'static,
  {
    self.merge_map(project, 1)
  }

  /// Interleave the values of `self` and `other`.
  pub fn merge(self, other: Observable<Item, Err>) -> Observable<Item, Err> {
    observable::from_iter::<_, Err>([self, other]).merge_all(UNBOUNDED)
  }

  /// All values of `self`, then all values of `other`.
  pub fn concat(self, other: Observable<Item, Err>) -> Observable<Item, Err> {
    observable::from_iter::<_, Err>([self, other]).concat_all()
  }
}

impl<Item: 'static, Err: 'static> Observable<Observable<Item, Err>, Err> {
  /// Flatten a higher-order observable, keeping at most `concurrent` inner
  /// subscriptions alive at a time.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn merge_all(self, concurrent: usize) -> Observable<Item, Err> { self.try_merge_map(Ok, concurrent) }

  /// Flatten a higher-order observable strictly in order: each inner starts
  /// only after the previous one completed.
  pub fn concat_all(self) -> Observable<Item, Err> { self.merge_all(1) }
}

pub fn merge_all<Item, Err>(
  concurrent: usize,
) -> impl FnOnce(Observable<Observable<Item, Err>, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  move |source| source.merge_all(concurrent)
}

pub fn concat_all<Item, Err>() -> impl FnOnce(Observable<Observable<Item, Err>, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  |source| source.concat_all()
}

pub fn merge_map<Item, Out, Err, F>(
  project: F, concurrent: usize,
) -> impl FnOnce(Observable<Item, Err>) -> Observable<Out, Err>
where
  Item: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(Item) -> Observable<Out, Err> + Clone + 'static,
{
  move |source| source.merge_map(project, concurrent)
}

pub fn try_merge_map<Item, Out, Err, F>(
  project: F, concurrent: usize,
) -> impl FnOnce(Observable<Item, Err>) -> Observable<Out, Err>
where
  Item: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(Item) -> Result<Observable<Out, Err>, Err> + Clone + 'static,
{
  move |source| source.try_merge_map(project, concurrent)
}

pub fn concat_map<Item, Out, Err, F>(project: F) -> impl FnOnce(Observable<Item, Err>) -> Observable<Out, Err>
where
  Item: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(Item) -> Observable<Out, Err> + Clone + 'static,
{
  move |source| source.concat_map(project)
}

pub fn merge<Item, Err>(other: Observable<Item, Err>) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  move |source| source.merge(other)
}

pub fn concat<Item, Err>(
  other: Observable<Item, Err>,
) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  move |source| source.concat(other)
}
