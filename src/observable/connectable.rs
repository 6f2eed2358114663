use std::{
  cell::{Cell, RefCell},
  rc::{Rc, Weak},
};

use super::Observable;
use crate::{
  subject::SubjectLike,
  subscriber::Subscriber,
  subscription::{Subscription, Teardown},
};

struct ConnectState<S> {
  factory: Box<dyn Fn() -> S>,
  subject: RefCell<S>,
  connection: RefCell<Option<Subscription>>,
  ref_count: Cell<usize>,
}

impl<S> ConnectState<S> {
  fn open_connection(&self) -> Option<Subscription> {
    self
      .connection
      .borrow()
      .as_ref()
      .filter(|c| !c.is_closed())
      .cloned()
  }

  fn release(&self) {
    let count = self.ref_count.get().saturating_sub(1);
    self.ref_count.set(count);
    tracing::debug!(count, "ref-counted subscriber released");
    if count == 0 {
      let connection = self.connection.borrow_mut().take();
      if let Some(connection) = connection {
        tracing::debug!("multicast disconnected");
        connection.unsubscribe_or_report();
      }
    }
  }
}

/// A multicast source whose upstream subscription is started explicitly.
///
/// Subscribers registered through [`to_observable`](Self::to_observable)
/// receive nothing until [`connect`](Self::connect) subscribes the shared
/// subject to the source.
pub struct ConnectableObservable<Item, Err, S> {
  source: Observable<Item, Err>,
  state: Rc<ConnectState<S>>,
}

impl<Item, Err, S> Clone for ConnectableObservable<Item, Err, S> {
  fn clone(&self) -> Self { ConnectableObservable { source: self.source.clone(), state: self.state.clone() } }
}

impl<Item, Err, S> ConnectableObservable<Item, Err, S>
where
  Item: 'static,
  Err: 'static,
  S: SubjectLike<Item, Err>,
{
  pub fn new(source: Observable<Item, Err>, factory: impl Fn() -> S + 'static) -> Self {
    let subject = factory();
    let state = ConnectState {
      factory: Box::new(factory),
      subject: RefCell::new(subject),
      connection: RefCell::new(None),
      ref_count: Cell::new(0),
    };
    ConnectableObservable { source, state: Rc::new(state) }
  }

  /// The subject currently fanning out values.
  pub fn subject(&self) -> S { self.state.subject.borrow().clone() }

  pub fn is_connected(&self) -> bool { self.state.open_connection().is_some() }

  /// Subscribe the shared subject to the source. While a connection is
  /// open, further calls return it instead of connecting again.
  ///
  /// A subject that already terminated is replaced by a fresh one from the
  /// factory first, so a finished multicast can be connected again.
  pub fn connect(&self) -> Subscription {
    if let Some(connection) = self.state.open_connection() {
      return connection;
    }
    self.refresh_subject();
    let subscriber = Subscriber::new(self.subject());
    let connection = subscriber.subscription().clone();
    *self.state.connection.borrow_mut() = Some(connection.clone());
    tracing::debug!("multicast connected");
    self.source.actual_subscribe(subscriber);
    connection
  }

  /// An observable that subscribes to the shared subject. It does not
  /// connect.
  pub fn to_observable(&self) -> Observable<Item, Err> {
    let state = self.state.clone();
    Observable::new(move |subscriber: Subscriber<Item, Err>| {
      let subject = state.subject.borrow().clone();
      subject.to_observable().actual_subscribe(subscriber);
    })
  }

  /// An observable that connects when its subscriber count goes from 0 to 1
  /// and disconnects when it drops back to 0. A later 0 to 1 transition
  /// connects to the source again.
  pub fn ref_count(&self) -> Observable<Item, Err> {
    let this = self.clone();
    Observable::new(move |subscriber: Subscriber<Item, Err>| {
      let state = &this.state;
      if state.ref_count.get() == 0 && !this.is_connected() {
        this.refresh_subject();
      }
      let count = state.ref_count.get() + 1;
      state.ref_count.set(count);
      tracing::debug!(count, "ref-counted subscriber added");

      // Registered before connecting: a subscriber that leaves while a
      // synchronous source is still emitting must release the connection.
      let weak: Weak<ConnectState<S>> = Rc::downgrade(state);
      subscriber.add(Teardown::action(move || {
        if let Some(state) = weak.upgrade() {
          state.release();
        }
      }));

      let subject = this.subject();
      subject.to_observable().actual_subscribe(subscriber.clone());
      if count == 1 && !subscriber.is_closed() {
        this.connect();
      }
    })
  }

  fn refresh_subject(&self) {
    let stopped = self.state.subject.borrow().is_stopped();
    if stopped {
      let fresh = (self.state.factory)();
      *self.state.subject.borrow_mut() = fresh;
    }
  }
}
