use super::{SubjectCore, impl_subject_like};
use crate::{
  observable::Observable,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
};

/// A subject that holds a current value. Every new subscriber receives the
/// current value first, then everything emitted after it joined.
pub struct BehaviorSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
  value: MutRc<Item>,
}

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self { BehaviorSubject { core: self.core.clone(), value: self.value.clone() } }
}

impl<Item: Clone + 'static, Err: Clone + 'static> BehaviorSubject<Item, Err> {
  pub fn new(initial: Item) -> Self {
    BehaviorSubject { core: SubjectCore::default(), value: MutRc::own(initial) }
  }

  /// The most recent value.
  pub fn value(&self) -> Item { self.value.rc_deref().clone() }

  pub fn next(&self, value: Item) {
    if self.core.is_stopped() {
      return;
    }
    *self.value.rc_deref_mut() = value.clone();
    self.core.next(value)
  }

  pub fn error(&self, err: Err) { self.core.error(err) }

  pub fn complete(&self) { self.core.complete() }

  pub fn to_observable(&self) -> Observable<Item, Err> {
    let (core, value) = (self.core.clone(), self.value.clone());
    Observable::new(move |subscriber: Subscriber<Item, Err>| {
      let teardown = core.add(subscriber.clone());
      if !subscriber.is_closed() {
        let current = value.rc_deref().clone();
        subscriber.next(current);
      }
      teardown
    })
  }

  pub fn is_stopped(&self) -> bool { self.core.is_stopped() }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }
}

impl_subject_like!(BehaviorSubject);
