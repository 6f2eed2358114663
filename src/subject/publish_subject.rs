use super::{SubjectCore, impl_subject_like};
use crate::{observable::Observable, subscriber::Subscriber};

/// A plain multicast subject: values are delivered to the observers
/// registered at the moment of emission, with no replay.
pub struct Subject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject { core: self.core.clone() } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Subject { core: SubjectCore::default() } }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  pub fn next(&self, value: Item) { self.core.next(value) }

  pub fn error(&self, err: Err) { self.core.error(err) }

  pub fn complete(&self) { self.core.complete() }

  pub fn to_observable(&self) -> Observable<Item, Err> {
    let core = self.core.clone();
    Observable::new(move |subscriber: Subscriber<Item, Err>| core.add(subscriber))
  }

  pub fn is_stopped(&self) -> bool { self.core.is_stopped() }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }
}

impl_subject_like!(Subject);

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use super::*;
  use crate::subscription::Subscription;

  type Subj = Subject<i32, &'static str>;

  #[rxkit_macro::test]
  fn fans_out_to_current_observers_only() {
    let subject = Subj::new();
    let (a, b) = (Rc::new(RefCell::new(vec![])), Rc::new(RefCell::new(vec![])));
    let c_a = a.clone();
    subject.to_observable().subscribe(move |v| c_a.borrow_mut().push(v));
    subject.next(1);
    let c_b = b.clone();
    subject.to_observable().subscribe(move |v| c_b.borrow_mut().push(v));
    subject.next(2);

    assert_eq!(*a.borrow(), [1, 2]);
    assert_eq!(*b.borrow(), [2]);
    assert_eq!(subject.observer_count(), 2);
  }

  #[rxkit_macro::test]
  fn unsubscribed_observer_is_removed() {
    let subject = Subj::new();
    let hits = Rc::new(Cell::new(0));
    let c_hits = hits.clone();
    let subscription = subject.to_observable().subscribe(move |_| c_hits.set(c_hits.get() + 1));
    subject.next(1);
    subscription.unsubscribe().unwrap();
    subject.next(2);
    assert_eq!(hits.get(), 1);
    assert_eq!(subject.observer_count(), 0);
  }

  #[rxkit_macro::test]
  fn late_subscriber_gets_terminal_immediately() {
    let subject = Subj::new();
    subject.error("gone");
    subject.next(1);

    let err = Rc::new(Cell::new(None));
    let c_err = err.clone();
    let subscription = subject
      .to_observable()
      .subscribe_err(|_| unreachable!(), move |e| c_err.set(Some(e)));
    assert_eq!(err.get(), Some("gone"));
    assert!(subscription.is_closed());
    assert_eq!(subject.observer_count(), 0);
  }

  #[rxkit_macro::test]
  fn terminal_reaches_every_observer_once() {
    let subject = Subj::new();
    let completions = Rc::new(Cell::new(0));
    for _ in 0..3 {
      let c = completions.clone();
      subject
        .to_observable()
        .subscribe_complete(|_| {}, move || c.set(c.get() + 1));
    }
    subject.complete();
    subject.complete();
    subject.error("late");
    assert_eq!(completions.get(), 3);
    assert!(subject.is_stopped());
  }

  #[rxkit_macro::test]
  fn observer_may_unsubscribe_itself_during_fan_out() {
    let subject = Subj::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let slot: Rc<RefCell<Option<Subscription>>> = Rc::default();

    let (c_seen, c_slot) = (seen.clone(), slot.clone());
    let first = subject.to_observable().subscribe(move |v| {
      c_seen.borrow_mut().push(("first", v));
      if let Some(s) = c_slot.borrow().as_ref() {
        s.unsubscribe().unwrap();
      }
    });
    *slot.borrow_mut() = Some(first);
    let c_seen = seen.clone();
    subject.to_observable().subscribe(move |v| c_seen.borrow_mut().push(("second", v)));

    subject.next(1);
    subject.next(2);
    assert_eq!(*seen.borrow(), [("first", 1), ("second", 1), ("second", 2)]);
  }

  #[rxkit_macro::test]
  fn observer_subscribing_during_fan_out_misses_current_value() {
    let subject = Subj::new();
    let late = Rc::new(RefCell::new(vec![]));
    let (c_subject, c_late) = (subject.clone(), late.clone());
    let subscribed = Rc::new(Cell::new(false));
    let c_subscribed = subscribed.clone();
    subject.to_observable().subscribe(move |_| {
      if !c_subscribed.replace(true) {
        let c_late = c_late.clone();
        c_subject.to_observable().subscribe(move |v| c_late.borrow_mut().push(v));
      }
    });

    subject.next(1);
    subject.next(2);
    assert_eq!(*late.borrow(), [2]);
  }

  #[rxkit_macro::test]
  fn feeding_back_into_the_subject_is_queued() {
    let subject = Subj::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let (c_subject, c_seen) = (subject.clone(), seen.clone());
    subject.to_observable().subscribe(move |v| {
      c_seen.borrow_mut().push(v);
      if v < 3 {
        c_subject.next(v + 1);
      }
    });
    subject.next(1);
    assert_eq!(*seen.borrow(), [1, 2, 3]);
  }
}
