use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::Subscription,
};

struct SwitchState {
  generation: u64,
  inner: Option<Subscription>,
  outer_completed: bool,
}

struct SwitchContext<Out, Err, F> {
  downstream: Subscriber<Out, Err>,
  project: RefCell<F>,
  state: RefCell<SwitchState>,
}

impl<Out: 'static, Err: 'static, F: 'static> SwitchContext<Out, Err, F> {
  fn switch_to(self: &Rc<Self>, inner: Observable<Out, Err>) {
    let (generation, previous) = {
      let mut state = self.state.borrow_mut();
      state.generation += 1;
      (state.generation, state.inner.take())
    };
    if let Some(previous) = previous {
      previous.unsubscribe_or_report();
    }

    let subscriber = Subscriber::new(SwitchInnerObserver { ctx: self.clone(), generation });
    let subscription = subscriber.subscription().clone();
    self.state.borrow_mut().inner = Some(subscription.clone());
    self.downstream.add(subscription);
    inner.actual_subscribe(subscriber);
  }

  fn inner_complete(&self, generation: u64) {
    let outer_completed = {
      let mut state = self.state.borrow_mut();
      if state.generation != generation {
        return;
      }
      state.inner = None;
      state.outer_completed
    };
    if outer_completed {
      self.downstream.complete();
    }
  }

  fn outer_complete(&self) {
    let inner_active = {
      let mut state = self.state.borrow_mut();
      state.outer_completed = true;
      state.inner.is_some()
    };
    if !inner_active {
      self.downstream.complete();
    }
  }
}

struct SwitchOuterObserver<Out, Err, F>(Rc<SwitchContext<Out, Err, F>>);

impl<Item, Out, Err, F> Observer<Item, Err> for SwitchOuterObserver<Out, Err, F>
where
  Out: 'static,
  Err: 'static,
  F: FnMut(Item) -> Observable<Out, Err> + 'static,
{
  fn next(&mut self, value: Item) {
    let inner = {
      let mut project = self.0.project.borrow_mut();
      (*project)(value)
    };
    self.0.switch_to(inner);
  }

  fn error(&mut self, err: Err) { self.0.downstream.error(err) }

  fn complete(&mut self) { self.0.outer_complete() }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

struct SwitchInnerObserver<Out, Err, F> {
  ctx: Rc<SwitchContext<Out, Err, F>>,
  generation: u64,
}

impl<Out, Err, F> SwitchInnerObserver<Out, Err, F> {
  fn is_current(&self) -> bool { self.ctx.state.borrow().generation == self.generation }
}

impl<Out: 'static, Err: 'static, F: 'static> Observer<Out, Err> for SwitchInnerObserver<Out, Err, F> {
  fn next(&mut self, value: Out) {
    if self.is_current() {
      self.ctx.downstream.next(value)
    }
  }

  fn error(&mut self, err: Err) {
    if self.is_current() {
      self.ctx.downstream.error(err)
    }
  }

  fn complete(&mut self) { self.ctx.inner_complete(self.generation) }

  fn is_closed(&self) -> bool { self.ctx.downstream.is_closed() || !self.is_current() }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Project each value to an observable and mirror only the most recent
  /// one. A new outer value unsubscribes the previous inner before the next
  /// one is subscribed.
  ///
  /// The result completes once the outer stream and the current inner have
  /// both completed.
  pub fn switch_map<Out, F>(self, project: F) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Observable<Out, Err> + Clone + 'static,
  {
    self.lift(move |downstream| {
      let state = SwitchState { generation: 0, inner: None, outer_completed: false };
      SwitchOuterObserver(Rc::new(SwitchContext {
        downstream,
        project: RefCell::new(project.clone()),
        state: RefCell::new(state),
      }))
    })
  }
}

impl<Item: 'static, Err: 'static> Observable<Observable<Item, Err>, Err> {
  /// Mirror the most recently emitted inner observable.
  pub fn switch_all(self) -> Observable<Item, Err> { self.switch_map(|inner| inner) }
}

pub fn switch_map<Item, Out, Err, F>(project: F) -> impl FnOnce(Observable<Item, Err>) -> Observable<Out, Err>
where
  Item: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(Item) -> Observable<Out, Err> + Clone + 'static,
{
  move |source| source.switch_map(project)
}

pub fn switch_all<Item, Err>() -> impl FnOnce(Observable<Observable<Item, Err>, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  |source| source.switch_all()
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  type Subj = Subject<i32, &'static str>;

  #[rxkit_macro::test]
  fn follows_only_the_latest_inner() {
    let outer = Subject::<usize, &'static str>::new();
    let inners: Vec<Subj> = (0..2).map(|_| Subject::new()).collect();
    let c_inners = inners.clone();

    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    outer
      .to_observable()
      .switch_map(move |i| c_inners[i].to_observable())
      .subscribe(move |v| c_seen.borrow_mut().push(v));

    outer.next(0);
    inners[0].next(1);
    outer.next(1);
    inners[0].next(2);
    inners[1].next(3);

    assert_eq!(*seen.borrow(), [1, 3]);
    assert_eq!(inners[0].observer_count(), 0);
    assert_eq!(inners[1].observer_count(), 1);
  }

  #[rxkit_macro::test]
  fn completes_after_outer_and_current_inner() {
    let outer = Subject::<Observable<i32, &'static str>, &'static str>::new();
    let inner = Subj::new();
    let completed = Rc::new(Cell::new(false));
    let c_completed = completed.clone();
    outer
      .to_observable()
      .switch_all()
      .subscribe_complete(|_| {}, move || c_completed.set(true));

    outer.next(inner.to_observable());
    outer.complete();
    assert!(!completed.get());
    inner.complete();
    assert!(completed.get());
  }

  #[rxkit_macro::test]
  fn replaced_inner_completion_is_ignored() {
    let outer = Subject::<Observable<i32, &'static str>, &'static str>::new();
    let (first, second) = (Subj::new(), Subj::new());
    let completed = Rc::new(Cell::new(false));
    let c_completed = completed.clone();
    outer
      .to_observable()
      .switch_all()
      .subscribe_complete(|_| {}, move || c_completed.set(true));

    outer.next(first.to_observable());
    outer.next(second.to_observable());
    outer.complete();
    first.complete();
    assert!(!completed.get());
    second.complete();
    assert!(completed.get());
  }

  #[rxkit_macro::test]
  fn inner_error_fails_the_result() {
    let err = Rc::new(Cell::new(None));
    let c_err = err.clone();
    observable::of::<_, &'static str>(1)
      .switch_map(|_| observable::throw_err::<i32, _>("inner"))
      .subscribe_err(|_| {}, move |e| c_err.set(Some(e)));
    assert_eq!(err.get(), Some("inner"));
  }
}
