//! The notification gate between a producer and an observer.
//!
//! Every observer reached by a producer sits behind a [`Subscriber`]. It
//! enforces the observer grammar (`next*` followed by at most one terminal
//! notification), unsubscribes its own [`Subscription`] after a terminal
//! notification, and turns a failing `try_next` into an `error`.
//!
//! A notification that arrives while the observer is still handling the
//! previous one (for example, a subject feeding back into itself from a
//! `next` callback) is queued and delivered once the running callback
//! returns.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  fmt::{Debug, Formatter},
  rc::{Rc, Weak},
};

use crate::{
  observer::{Notification, Observer},
  subscription::{Subscription, Teardown},
};

type Destination<Item, Err> = Box<dyn Observer<Item, Err>>;

struct SubscriberState<Item, Err> {
  destination: RefCell<Option<Destination<Item, Err>>>,
  pending: RefCell<VecDeque<Notification<Item, Err>>>,
  stopped: Cell<bool>,
  subscription: Subscription,
}

impl<Item, Err> SubscriberState<Item, Err> {
  fn stop(&self) {
    self.stopped.set(true);
    if let Ok(mut pending) = self.pending.try_borrow_mut() {
      pending.clear();
    }
    // A busy destination is released by the dispatch loop that holds it.
    let released = self
      .destination
      .try_borrow_mut()
      .ok()
      .and_then(|mut d| d.take());
    drop(released);
  }
}

/// Stop-gated handle to an observer, shared by the producer and whoever
/// holds the subscription.
pub struct Subscriber<Item, Err>(Rc<SubscriberState<Item, Err>>);

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> {
  pub fn new(observer: impl Observer<Item, Err> + 'static) -> Self {
    let state = Rc::new_cyclic(|weak: &Weak<SubscriberState<Item, Err>>| {
      let weak = weak.clone();
      SubscriberState {
        destination: RefCell::new(Some(Box::new(observer))),
        pending: RefCell::default(),
        stopped: Cell::new(false),
        subscription: Subscription::with_teardown(Teardown::action(move || {
          if let Some(state) = weak.upgrade() {
            state.stop();
          }
        })),
      }
    });
    Subscriber(state)
  }

  /// A subscriber whose subscription is registered as a child of `parent`,
  /// so that closing `parent` also stops this subscriber.
  pub fn child_of(parent: &Subscription, observer: impl Observer<Item, Err> + 'static) -> Self {
    let subscriber = Self::new(observer);
    parent.add(subscriber.subscription().clone());
    subscriber
  }
}

impl<Item, Err> Subscriber<Item, Err> {
  #[inline]
  pub fn next(&self, value: Item) { self.dispatch(Notification::Next(value)) }

  #[inline]
  pub fn error(&self, err: Err) { self.dispatch(Notification::Error(err)) }

  #[inline]
  pub fn complete(&self) { self.dispatch(Notification::Complete) }

  /// True once a terminal notification was delivered, the subscription was
  /// unsubscribed, or the observer itself reports that it takes no more
  /// values. A destination busy handling a notification is not asked.
  pub fn is_closed(&self) -> bool {
    let state = &*self.0;
    state.stopped.get()
      || state.subscription.is_closed()
      || state
        .destination
        .try_borrow()
        .is_ok_and(|d| d.as_ref().is_some_and(|d| d.is_closed()))
  }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.0.subscription }

  /// Attach a teardown to this subscriber's subscription.
  #[inline]
  pub fn add(&self, teardown: impl Into<Teardown>) { self.0.subscription.add(teardown) }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }

  fn dispatch(&self, notification: Notification<Item, Err>) {
    let state = &*self.0;
    if state.stopped.get() {
      return;
    }
    let Ok(mut destination) = state.destination.try_borrow_mut() else {
      state.pending.borrow_mut().push_back(notification);
      return;
    };

    let mut terminated = false;
    let mut current = Some(notification);
    while let Some(notification) = current.take() {
      if state.stopped.get() {
        break;
      }
      match notification {
        Notification::Next(value) => {
          let failed = destination.as_mut().and_then(|d| d.try_next(value).err());
          if let Some(err) = failed {
            current = Some(Notification::Error(err));
            continue;
          }
        }
        terminal => {
          state.stopped.set(true);
          terminated = true;
          if let Some(mut observer) = destination.take() {
            terminal.accept(&mut observer);
          }
          break;
        }
      }
      current = state.pending.borrow_mut().pop_front();
    }

    let released = if state.stopped.get() { destination.take() } else { None };
    drop(destination);
    drop(released);

    if state.stopped.get() {
      state.pending.borrow_mut().clear();
    }
    if terminated {
      state.subscription.unsubscribe_or_report();
    }
  }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Subscriber::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { Subscriber::is_closed(self) }
}

impl<Item, Err> Clone for Subscriber<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Subscriber(self.0.clone()) }
}

impl<Item, Err> Debug for Subscriber<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscriber")
      .field("stopped", &self.0.stopped.get())
      .field("subscription", &self.0.subscription)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use super::*;
  use crate::observer::FnObserver;

  type Log = Rc<RefCell<Vec<Notification<i32, &'static str>>>>;

  fn recording() -> (Log, Subscriber<i32, &'static str>) {
    let log: Log = Rc::default();
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    let observer =
      FnObserver::with_error(move |v| n.borrow_mut().push(Notification::Next(v)), move |err| {
        e.borrow_mut().push(Notification::Error(err))
      })
      .on_complete(move || c.borrow_mut().push(Notification::Complete));
    (log, Subscriber::new(observer))
  }

  #[rxkit_macro::test]
  fn nothing_after_terminal() {
    let (log, subscriber) = recording();
    subscriber.next(1);
    subscriber.complete();
    subscriber.next(2);
    subscriber.error("late");
    subscriber.complete();

    assert_eq!(*log.borrow(), [Notification::Next(1), Notification::Complete]);
    assert!(subscriber.is_closed());
    assert!(subscriber.subscription().is_closed());
  }

  #[rxkit_macro::test]
  fn error_is_terminal() {
    let (log, subscriber) = recording();
    subscriber.error("boom");
    subscriber.next(1);
    subscriber.complete();
    assert_eq!(*log.borrow(), [Notification::Error("boom")]);
  }

  #[rxkit_macro::test]
  fn unsubscribe_silences_the_observer() {
    let (log, subscriber) = recording();
    subscriber.next(1);
    subscriber.subscription().unsubscribe().unwrap();
    subscriber.next(2);
    subscriber.complete();
    assert_eq!(*log.borrow(), [Notification::Next(1)]);
  }

  #[rxkit_macro::test]
  fn failing_next_terminates_with_error() {
    let log: Log = Rc::default();
    let (n, e) = (log.clone(), log.clone());
    let subscriber = Subscriber::new(FnObserver::try_new(
      move |v| {
        if v == 2 {
          return Err("rejected");
        }
        n.borrow_mut().push(Notification::Next(v));
        Ok(())
      },
      move |err| e.borrow_mut().push(Notification::Error(err)),
    ));

    for v in 1..=3 {
      subscriber.next(v);
    }
    assert_eq!(*log.borrow(), [Notification::Next(1), Notification::Error("rejected")]);
    assert!(subscriber.subscription().is_closed());
  }

  #[rxkit_macro::test]
  fn reentrant_notifications_are_queued_in_order() {
    let seen = Rc::new(RefCell::new(vec![]));
    let slot: Rc<RefCell<Option<Subscriber<i32, &'static str>>>> = Rc::default();
    let (c_seen, c_slot) = (seen.clone(), slot.clone());
    let subscriber = Subscriber::new(FnObserver::new(move |v| {
      c_seen.borrow_mut().push(v);
      if v < 3 {
        let me = c_slot.borrow().clone().unwrap();
        me.next(v + 1);
        // Still inside the handler: the value above has not been seen yet.
        assert_eq!(c_seen.borrow().last(), Some(&v));
      }
    }));
    *slot.borrow_mut() = Some(subscriber.clone());

    subscriber.next(1);
    assert_eq!(*seen.borrow(), [1, 2, 3]);
    slot.borrow_mut().take();
  }

  #[rxkit_macro::test]
  fn unsubscribe_inside_next_drops_queued_values() {
    let seen = Rc::new(RefCell::new(vec![]));
    let slot: Rc<RefCell<Option<Subscriber<i32, &'static str>>>> = Rc::default();
    let (c_seen, c_slot) = (seen.clone(), slot.clone());
    let subscriber = Subscriber::new(FnObserver::new(move |v| {
      c_seen.borrow_mut().push(v);
      let me = c_slot.borrow().clone().unwrap();
      me.next(v + 10);
      me.subscription().unsubscribe().unwrap();
    }));
    *slot.borrow_mut() = Some(subscriber.clone());

    subscriber.next(1);
    subscriber.next(2);
    assert_eq!(*seen.borrow(), [1]);
    slot.borrow_mut().take();
  }

  struct Gate(Rc<Cell<bool>>);

  impl Observer<i32, &'static str> for Gate {
    fn next(&mut self, _: i32) {}

    fn error(&mut self, _: &'static str) {}

    fn complete(&mut self) {}

    fn is_closed(&self) -> bool { self.0.get() }
  }

  #[rxkit_macro::test]
  fn closed_destination_closes_the_gate() {
    let shut = Rc::new(Cell::new(false));
    let subscriber = Subscriber::new(Gate(shut.clone()));
    assert!(!subscriber.is_closed());

    shut.set(true);
    assert!(subscriber.is_closed());
    assert!(!subscriber.subscription().is_closed());
  }

  #[rxkit_macro::test]
  fn child_closes_with_parent() {
    let parent = Subscription::new();
    let log: Log = Rc::default();
    let c_log = log.clone();
    let subscriber: Subscriber<i32, &'static str> = Subscriber::child_of(
      &parent,
      FnObserver::new(move |v| c_log.borrow_mut().push(Notification::Next(v))),
    );

    parent.unsubscribe().unwrap();
    subscriber.next(1);
    assert!(log.borrow().is_empty());
    assert!(subscriber.is_closed());
  }
}
