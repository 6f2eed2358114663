use std::collections::VecDeque;

use super::{SubjectCore, impl_subject_like};
use crate::{
  observable::Observable,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
};

/// A subject that records up to `capacity` of the most recent values and
/// replays them to every new subscriber, including subscribers that arrive
/// after it terminated.
pub struct ReplaySubject<Item, Err> {
  core: SubjectCore<Item, Err>,
  buffer: MutRc<VecDeque<Item>>,
  capacity: usize,
}

impl<Item, Err> Clone for ReplaySubject<Item, Err> {
  fn clone(&self) -> Self {
    ReplaySubject { core: self.core.clone(), buffer: self.buffer.clone(), capacity: self.capacity }
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> ReplaySubject<Item, Err> {
  /// # Panics
  ///
  /// Panics if `capacity` is zero.
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "replay capacity must be at least 1");
    ReplaySubject { core: SubjectCore::default(), buffer: MutRc::default(), capacity }
  }

  /// A subject that replays everything it has seen.
  pub fn unbounded() -> Self { Self::new(usize::MAX) }

  pub fn next(&self, value: Item) {
    if self.core.is_stopped() {
      return;
    }
    {
      let mut buffer = self.buffer.rc_deref_mut();
      if buffer.len() == self.capacity {
        buffer.pop_front();
      }
      buffer.push_back(value.clone());
    }
    self.core.next(value)
  }

  pub fn error(&self, err: Err) { self.core.error(err) }

  pub fn complete(&self) { self.core.complete() }

  pub fn to_observable(&self) -> Observable<Item, Err> {
    let (core, buffer) = (self.core.clone(), self.buffer.clone());
    Observable::new(move |subscriber: Subscriber<Item, Err>| {
      let replay = || {
        let values: Vec<Item> = buffer.rc_deref().iter().cloned().collect();
        for value in values {
          if subscriber.is_closed() {
            break;
          }
          subscriber.next(value);
        }
      };
      if core.is_stopped() {
        replay();
        core.add(subscriber.clone())
      } else {
        let teardown = core.add(subscriber.clone());
        replay();
        teardown
      }
    })
  }

  pub fn is_stopped(&self) -> bool { self.core.is_stopped() }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }
}

impl_subject_like!(ReplaySubject);

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  fn collect(subject: &ReplaySubject<i32, &'static str>) -> Rc<RefCell<Vec<Result<i32, &'static str>>>> {
    let seen = Rc::new(RefCell::new(vec![]));
    let (n, e) = (seen.clone(), seen.clone());
    subject
      .to_observable()
      .subscribe_err(move |v| n.borrow_mut().push(Ok(v)), move |err| e.borrow_mut().push(Err(err)));
    seen
  }

  #[rxkit_macro::test]
  fn replays_bounded_history() {
    let subject = ReplaySubject::new(2);
    for v in 1..=4 {
      subject.next(v);
    }
    let seen = collect(&subject);
    subject.next(5);
    assert_eq!(*seen.borrow(), [Ok(3), Ok(4), Ok(5)]);
  }

  #[rxkit_macro::test]
  fn replays_then_terminates_after_stop() {
    let subject = ReplaySubject::unbounded();
    subject.next(1);
    subject.next(2);
    subject.error("closed");
    let seen = collect(&subject);
    assert_eq!(*seen.borrow(), [Ok(1), Ok(2), Err("closed")]);
  }
}
