//! Observer trait and the callback observers behind the `subscribe` family.
//!
//! An [`Observer`] is the raw three-channel sink. It carries no stop logic of
//! its own: every observer handed to a producer is wrapped in a
//! [`Subscriber`](crate::subscriber::Subscriber), which owns the "nothing
//! after a terminal notification" gate.

use crate::{config::report_unhandled_error, error::UnhandledError};

/// The consumer of an observable's notifications.
pub trait Observer<Item, Err> {
  fn next(&mut self, value: Item);

  fn error(&mut self, err: Err);

  fn complete(&mut self);

  /// Whether this observer will ignore further values. Sources use it to stop
  /// producing early.
  fn is_closed(&self) -> bool { false }

  /// Deliver a value through a callback that may fail.
  ///
  /// A returned `Err` is turned into this observer's own `error`
  /// notification by the subscriber driving it.
  fn try_next(&mut self, value: Item) -> Result<(), Err> {
    self.next(value);
    Ok(())
  }
}

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }

  #[inline]
  fn try_next(&mut self, value: Item) -> Result<(), Err> { (**self).try_next(value) }
}

/// One notification, reified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Notification<Item, Err> {
  /// Deliver this notification to `observer`.
  pub fn accept<O: Observer<Item, Err> + ?Sized>(self, observer: &mut O) {
    match self {
      Notification::Next(v) => observer.next(v),
      Notification::Error(err) => observer.error(err),
      Notification::Complete => observer.complete(),
    }
  }

  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }
}

type NextFn<Item, Err> = Box<dyn FnMut(Item) -> Result<(), Err>>;

/// Observer assembled from callbacks.
///
/// The `next` callback is required. Without an `error` callback, an error
/// notification is handed to the host-level reporter in
/// [`crate::config`]. Without a `complete` callback, completion is ignored.
pub struct FnObserver<Item, Err> {
  next: NextFn<Item, Err>,
  error: Option<Box<dyn FnOnce(Err)>>,
  complete: Option<Box<dyn FnOnce()>>,
}

impl<Item, Err> FnObserver<Item, Err> {
  /// Observer whose `next` may fail; an `Err` terminates it through `error`.
  pub fn try_new(
    next: impl FnMut(Item) -> Result<(), Err> + 'static, error: impl FnOnce(Err) + 'static,
  ) -> Self {
    FnObserver { next: Box::new(next), error: Some(Box::new(error)), complete: None }
  }

  pub fn with_error(next: impl FnMut(Item) + 'static, error: impl FnOnce(Err) + 'static) -> Self {
    let mut next = next;
    FnObserver {
      next: Box::new(move |v| {
        next(v);
        Ok(())
      }),
      error: Some(Box::new(error)),
      complete: None,
    }
  }

  pub fn on_complete(mut self, complete: impl FnOnce() + 'static) -> Self {
    self.complete = Some(Box::new(complete));
    self
  }
}

impl<Item, Err: std::fmt::Debug + 'static> FnObserver<Item, Err> {
  pub fn new(next: impl FnMut(Item) + 'static) -> Self {
    Self::with_error(next, |err: Err| {
      report_unhandled_error(UnhandledError::notification(&err));
    })
  }
}

impl<Item, Err> Observer<Item, Err> for FnObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    // Infallible entry point: a failure still has to terminate the observer.
    if let Err(err) = (self.next)(value) {
      self.error(err);
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(error) = self.error.take() {
      error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(complete) = self.complete.take() {
      complete();
    }
  }

  #[inline]
  fn try_next(&mut self, value: Item) -> Result<(), Err> { (self.next)(value) }
}

/// Implements `error`, `complete` and `is_closed` by forwarding to the
/// downstream field of an operator's observer.
macro_rules! forward_terminals {
  ($field:ident) => {
    #[inline]
    fn error(&mut self, err: Err) { self.$field.error(err) }

    #[inline]
    fn complete(&mut self) { self.$field.complete() }

    #[inline]
    fn is_closed(&self) -> bool { self.$field.is_closed() }
  };
}
pub(crate) use forward_terminals;

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[derive(Default)]
  struct Recorder(Vec<Notification<i32, &'static str>>);

  impl Observer<i32, &'static str> for Recorder {
    fn next(&mut self, value: i32) { self.0.push(Notification::Next(value)) }
    fn error(&mut self, err: &'static str) { self.0.push(Notification::Error(err)) }
    fn complete(&mut self) { self.0.push(Notification::Complete) }
  }

  #[rxkit_macro::test]
  fn notification_accept_routes_channels() {
    let mut recorder = Recorder::default();
    Notification::Next(1).accept(&mut recorder);
    Notification::Error("e").accept(&mut recorder);
    Notification::<i32, _>::Complete.accept(&mut recorder);
    assert_eq!(
      recorder.0,
      [Notification::Next(1), Notification::Error("e"), Notification::Complete]
    );
    assert!(Notification::<i32, ()>::Complete.is_terminal());
  }

  #[rxkit_macro::test]
  fn failing_next_routes_to_error() {
    let errors = Rc::new(RefCell::new(vec![]));
    let c_errors = errors.clone();
    let mut observer = FnObserver::try_new(
      |v: i32| if v > 1 { Err("too big") } else { Ok(()) },
      move |err| c_errors.borrow_mut().push(err),
    );

    observer.next(1);
    observer.next(2);
    assert_eq!(*errors.borrow(), ["too big"]);
  }

  #[rxkit_macro::test]
  fn boxed_observer_forwards() {
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    let mut boxed: Box<dyn Observer<i32, &'static str>> =
      Box::new(FnObserver::new(move |v| c_seen.borrow_mut().push(v)));
    boxed.next(7);
    boxed.complete();
    assert_eq!(*seen.borrow(), [7]);
  }
}
