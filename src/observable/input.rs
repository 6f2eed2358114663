//! One explicit sum type for everything that can become an observable.
//!
//! Callers say which kind of source they hold; [`from_input`] resolves it to
//! an [`Observable`] once, at construction time.

use std::rc::Rc;

use futures::{future::LocalBoxFuture, task::LocalSpawn};

use super::{Observable, from_future_result, from_iter};
use crate::{subscriber::Subscriber, subscription::Teardown};

type IterFactory<Item> = Rc<dyn Fn() -> Box<dyn Iterator<Item = Item>>>;
type ProducerFn<Item, Err> = Rc<dyn Fn(Subscriber<Item, Err>) -> Teardown>;

/// A source of values, tagged by kind.
pub enum ObservableInput<Item, Err> {
  /// A fixed list, replayed to every subscriber.
  Values(Vec<Item>),
  /// A factory producing a fresh iterator per subscription.
  Iterable(IterFactory<Item>),
  /// A single asynchronous result, spawned on the given executor.
  Future(LocalBoxFuture<'static, Result<Item, Err>>, Rc<dyn LocalSpawn>),
  /// A callback producer, as accepted by [`Observable::new`].
  Producer(ProducerFn<Item, Err>),
  Observable(Observable<Item, Err>),
}

/// The kind tag of an [`ObservableInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
  Values,
  Iterable,
  Future,
  Producer,
  Observable,
}

impl InputKind {
  /// Whether every subscription to a source of this kind emits all of its
  /// values and terminates before `subscribe` returns.
  pub fn is_synchronous(self) -> bool { matches!(self, InputKind::Values | InputKind::Iterable) }

  /// Whether a source of this kind emits at most one value.
  pub fn is_single_value(self) -> bool { matches!(self, InputKind::Future) }
}

impl<Item, Err> ObservableInput<Item, Err> {
  pub fn kind(&self) -> InputKind {
    match self {
      ObservableInput::Values(_) => InputKind::Values,
      ObservableInput::Iterable(_) => InputKind::Iterable,
      ObservableInput::Future(..) => InputKind::Future,
      ObservableInput::Producer(_) => InputKind::Producer,
      ObservableInput::Observable(_) => InputKind::Observable,
    }
  }

  pub fn iterable<I>(iter: I) -> Self
  where
    Item: 'static,
    I: IntoIterator<Item = Item> + Clone + 'static,
    I::IntoIter: 'static,
  {
    ObservableInput::Iterable(Rc::new(move || -> Box<dyn Iterator<Item = Item>> {
      Box::new(iter.clone().into_iter())
    }))
  }

  pub fn producer<T: Into<Teardown>>(f: impl Fn(Subscriber<Item, Err>) -> T + 'static) -> Self {
    ObservableInput::Producer(Rc::new(move |subscriber| f(subscriber).into()))
  }
}

impl<Item, Err> From<Observable<Item, Err>> for ObservableInput<Item, Err> {
  fn from(observable: Observable<Item, Err>) -> Self { ObservableInput::Observable(observable) }
}

impl<Item, Err> From<Vec<Item>> for ObservableInput<Item, Err> {
  fn from(values: Vec<Item>) -> Self { ObservableInput::Values(values) }
}

/// Resolve `input` into an observable.
pub fn from_input<Item, Err>(input: ObservableInput<Item, Err>) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  match input {
    ObservableInput::Values(values) => from_iter(values),
    ObservableInput::Iterable(factory) => {
      Observable::new(move |subscriber: Subscriber<Item, Err>| {
        for value in factory() {
          if subscriber.is_closed() {
            return;
          }
          subscriber.next(value);
        }
        subscriber.complete();
      })
    }
    ObservableInput::Future(future, spawner) => from_future_result(future, spawner),
    ObservableInput::Producer(producer) => Observable::new(move |subscriber| producer(subscriber)),
    ObservableInput::Observable(observable) => observable,
  }
}
