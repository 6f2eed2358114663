//! The observable core: a lazy producer plus the subscribe contract.
//!
//! An [`Observable`] is nothing more than a shared producer function. Each
//! subscription creates a fresh [`Subscriber`], runs the producer against it
//! and returns the subscriber's [`Subscription`] as the cancellation handle.
//! Subscribing twice runs the producer twice.

use std::{fmt::Debug, rc::Rc};

use crate::{
  observer::{FnObserver, Observer},
  subscriber::Subscriber,
  subscription::{Subscription, Teardown},
};

mod connectable;
mod defer;
mod from_future;
mod from_iter;
mod input;
mod timer;
pub use connectable::*;
pub use defer::*;
pub use from_future::*;
pub use from_iter::*;
pub use input::*;
pub use timer::*;

type Producer<Item, Err> = dyn Fn(Subscriber<Item, Err>) -> Result<Teardown, Err>;

/// A representation of any set of values over any amount of time. This is
/// the most basic building block of rxkit.
pub struct Observable<Item, Err> {
  producer: Rc<Producer<Item, Err>>,
}

impl<Item, Err> Clone for Observable<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Observable { producer: self.producer.clone() } }
}

/// Creates an observable from a producer function.
///
/// `producer` is called once per subscription with the subscriber to emit
/// to. Its return value (`()`, a [`Subscription`], a [`Teardown`], ...) is
/// registered as a teardown of that subscription.
///
/// ```
/// use rxkit::prelude::*;
///
/// let numbers = observable::create(|subscriber: Subscriber<i32, ()>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// });
/// numbers.subscribe(|v| println!("{v}"));
/// ```
pub fn create<Item, Err, F, T>(producer: F) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  F: Fn(Subscriber<Item, Err>) -> T + 'static,
  T: Into<Teardown>,
{
  Observable::new(producer)
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  pub fn new<F, T>(producer: F) -> Self
  where
    F: Fn(Subscriber<Item, Err>) -> T + 'static,
    T: Into<Teardown>,
  {
    Observable { producer: Rc::new(move |subscriber| Ok(producer(subscriber).into())) }
  }

  /// Like [`Observable::new`], but the producer may fail while starting. A
  /// returned `Err` is delivered as the subscriber's `error` notification.
  pub fn try_new<F, T>(producer: F) -> Self
  where
    F: Fn(Subscriber<Item, Err>) -> Result<T, Err> + 'static,
    T: Into<Teardown>,
  {
    Observable { producer: Rc::new(move |subscriber| producer(subscriber).map(Into::into)) }
  }

  /// Run the producer against `subscriber` and return its subscription.
  ///
  /// This is the single entry point every subscribe method and operator goes
  /// through.
  pub fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) -> Subscription {
    let subscription = subscriber.subscription().clone();
    match (self.producer)(subscriber.clone()) {
      Ok(teardown) => subscription.add(teardown),
      Err(err) => subscriber.error(err),
    }
    subscription
  }

  /// Subscribe an arbitrary observer.
  pub fn subscribe_with(&self, observer: impl Observer<Item, Err> + 'static) -> Subscription {
    self.actual_subscribe(Subscriber::new(observer))
  }

  /// Subscribe with a `next` callback only. An error notification is handed
  /// to the unhandled-error reporter in [`crate::config`].
  pub fn subscribe(&self, next: impl FnMut(Item) + 'static) -> Subscription
  where
    Err: Debug,
  {
    self.subscribe_with(FnObserver::new(next))
  }

  pub fn subscribe_err(
    &self, next: impl FnMut(Item) + 'static, error: impl FnOnce(Err) + 'static,
  ) -> Subscription {
    self.subscribe_with(FnObserver::with_error(next, error))
  }

  pub fn subscribe_complete(
    &self, next: impl FnMut(Item) + 'static, complete: impl FnOnce() + 'static,
  ) -> Subscription
  where
    Err: Debug,
  {
    self.subscribe_with(FnObserver::new(next).on_complete(complete))
  }

  pub fn subscribe_all(
    &self, next: impl FnMut(Item) + 'static, error: impl FnOnce(Err) + 'static,
    complete: impl FnOnce() + 'static,
  ) -> Subscription {
    self.subscribe_with(FnObserver::with_error(next, error).on_complete(complete))
  }

  /// Subscribe with a `next` callback that may fail. The first `Err` it
  /// returns terminates the subscription and is passed to `error`.
  pub fn try_subscribe(
    &self, next: impl FnMut(Item) -> Result<(), Err> + 'static, error: impl FnOnce(Err) + 'static,
  ) -> Subscription {
    self.subscribe_with(FnObserver::try_new(next, error))
  }

  /// Apply one operator. Operators are plain functions from observable to
  /// observable, so this is left-to-right function application.
  #[inline]
  pub fn pipe<R>(self, op: impl FnOnce(Self) -> R) -> R { op(self) }

  /// Build an operator observable: each subscription wraps the downstream
  /// subscriber with `wrap` and subscribes the result to `self`.
  ///
  /// The upstream subscription is registered as a child of the downstream
  /// one before the source starts, so cancelling downstream always reaches
  /// upstream.
  pub(crate) fn lift<Out, OutErr, O>(
    self, wrap: impl Fn(Subscriber<Out, OutErr>) -> O + 'static,
  ) -> Observable<Out, OutErr>
  where
    Out: 'static,
    OutErr: 'static,
    O: Observer<Item, Err> + 'static,
  {
    Observable::new(move |downstream: Subscriber<Out, OutErr>| {
      let upstream = Subscriber::child_of(downstream.subscription(), wrap(downstream.clone()));
      self.actual_subscribe(upstream);
    })
  }
}

/// Left-to-right operator composition.
///
/// `pipe!(source)` is the source itself; `pipe!(source, a, b)` is
/// `b(a(source))`.
///
/// ```
/// use rxkit::{ops, pipe, prelude::*};
///
/// let doubled = pipe!(
///   observable::from_iter::<_, ()>([1, 2, 3]),
///   ops::map(|v: i32| v * 2),
///   ops::filter(|v: &i32| *v > 2)
/// );
/// doubled.subscribe(|v| println!("{v}"));
/// ```
#[macro_export]
macro_rules! pipe {
  ($source:expr $(,)?) => { $source };
  ($source:expr, $($op:expr),+ $(,)?) => {{
    let source = $source;
    $(let source = ($op)(source);)+
    source
  }};
}
