//! Subjects: values pushed in once, fanned out to every current observer.
//!
//! A subject is both an [`Observer`] (it can be driven by hand or subscribed
//! to an upstream source) and a source of [`Observable`]s. All three flavors
//! share one fan-out core:
//!
//! - fan-out iterates over a snapshot of the observer list, so observers may
//!   subscribe or unsubscribe from inside their own callbacks;
//! - after `error` or `complete`, the observer list is released and every
//!   later subscriber receives the terminal notification immediately.

use std::mem;

use smallvec::SmallVec;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
  subscription::Teardown,
};

mod behavior_subject;
mod publish_subject;
mod replay_subject;
pub use behavior_subject::BehaviorSubject;
pub use publish_subject::Subject;
pub use replay_subject::ReplaySubject;

/// Common surface of every subject flavor.
pub trait SubjectLike<Item, Err>: Observer<Item, Err> + Clone + 'static {
  /// An observable whose subscribers join this subject's observer list.
  fn to_observable(&self) -> Observable<Item, Err>;

  /// Whether a terminal notification has been received.
  fn is_stopped(&self) -> bool;

  /// Number of observers currently registered.
  fn observer_count(&self) -> usize;
}

#[derive(Clone)]
enum Terminal<Err> {
  Error(Err),
  Complete,
}

impl<Err> Terminal<Err> {
  fn deliver<Item>(self, subscriber: &Subscriber<Item, Err>) {
    match self {
      Terminal::Error(err) => subscriber.error(err),
      Terminal::Complete => subscriber.complete(),
    }
  }
}

struct CoreState<Item, Err> {
  observers: Vec<(usize, Subscriber<Item, Err>)>,
  next_id: usize,
  terminal: Option<Terminal<Err>>,
}

type Snapshot<Item, Err> = SmallVec<[Subscriber<Item, Err>; 2]>;

pub(crate) struct SubjectCore<Item, Err> {
  state: MutRc<CoreState<Item, Err>>,
}

impl<Item, Err> Clone for SubjectCore<Item, Err> {
  fn clone(&self) -> Self { SubjectCore { state: self.state.clone() } }
}

impl<Item, Err> Default for SubjectCore<Item, Err> {
  fn default() -> Self {
    let state = CoreState { observers: vec![], next_id: 0, terminal: None };
    SubjectCore { state: MutRc::own(state) }
  }
}

impl<Item: 'static, Err: Clone + 'static> SubjectCore<Item, Err> {
  pub(crate) fn next(&self, value: Item)
  where
    Item: Clone,
  {
    let observers: Snapshot<Item, Err> = {
      let mut state = self.state.rc_deref_mut();
      if state.terminal.is_some() {
        return;
      }
      state.observers.retain(|(_, o)| !o.is_closed());
      state.observers.iter().map(|(_, o)| o.clone()).collect()
    };
    for observer in observers {
      observer.next(value.clone());
    }
  }

  pub(crate) fn error(&self, err: Err) { self.terminate(Terminal::Error(err)) }

  pub(crate) fn complete(&self) { self.terminate(Terminal::Complete) }

  fn terminate(&self, terminal: Terminal<Err>) {
    let observers = {
      let mut state = self.state.rc_deref_mut();
      if state.terminal.is_some() {
        return;
      }
      state.terminal = Some(terminal.clone());
      mem::take(&mut state.observers)
    };
    for (_, observer) in observers {
      terminal.clone().deliver(&observer);
    }
  }

  /// Register `subscriber`, or hand it the terminal notification if this
  /// subject already stopped. The returned teardown deregisters it.
  pub(crate) fn add(&self, subscriber: Subscriber<Item, Err>) -> Teardown {
    let mut state = self.state.rc_deref_mut();
    if let Some(terminal) = state.terminal.clone() {
      drop(state);
      terminal.deliver(&subscriber);
      return Teardown::Empty;
    }
    let id = state.next_id;
    state.next_id += 1;
    state.observers.push((id, subscriber));
    drop(state);

    let weak = self.state.downgrade();
    Teardown::action(move || {
      let Some(state) = weak.upgrade() else { return };
      // A busy list is pruned lazily on the next fan-out.
      if let Some(mut state) = state.try_rc_deref_mut() {
        state.observers.retain(|(i, _)| *i != id);
      };
    })
  }

  pub(crate) fn is_stopped(&self) -> bool { self.state.rc_deref().terminal.is_some() }

  pub(crate) fn observer_count(&self) -> usize {
    self
      .state
      .rc_deref()
      .observers
      .iter()
      .filter(|(_, o)| !o.is_closed())
      .count()
  }
}

/// Implements [`Observer`] and [`SubjectLike`] for a subject type by
/// forwarding to its inherent methods.
macro_rules! impl_subject_like {
  ($ty:ident) => {
    impl<Item, Err> $crate::observer::Observer<Item, Err> for $ty<Item, Err>
    where
      Item: Clone + 'static,
      Err: Clone + 'static,
    {
      #[inline]
      fn next(&mut self, value: Item) { $ty::next(self, value) }

      #[inline]
      fn error(&mut self, err: Err) { $ty::error(self, err) }

      #[inline]
      fn complete(&mut self) { $ty::complete(self) }

      #[inline]
      fn is_closed(&self) -> bool { self.is_stopped() }
    }

    impl<Item, Err> $crate::subject::SubjectLike<Item, Err> for $ty<Item, Err>
    where
      Item: Clone + 'static,
      Err: Clone + 'static,
    {
      #[inline]
      fn to_observable(&self) -> $crate::observable::Observable<Item, Err> { $ty::to_observable(self) }

      #[inline]
      fn is_stopped(&self) -> bool { $ty::is_stopped(self) }

      #[inline]
      fn observer_count(&self) -> usize { $ty::observer_count(self) }
    }
  };
}
use impl_subject_like;
