//! Subscriptions and their teardown graph.
//!
//! A [`Subscription`] owns an ordered list of teardowns: plain actions,
//! nested subscriptions, or any other [`SubscriptionLike`] handle. Nested
//! subscriptions keep weak back-references to every parent they were added
//! to, so a child that closes on its own detaches itself and long-lived
//! composites (such as `merge_all`) do not grow without bound.

use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  mem,
  rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::{
  config::report_unhandled_error,
  error::{BoxError, UnsubscriptionError},
};

/// Anything that can be cancelled.
pub trait SubscriptionLike {
  /// Release the resources held by this handle. Calling it again after the
  /// first time has no effect.
  fn unsubscribe(&self) -> Result<(), UnsubscriptionError>;

  fn is_closed(&self) -> bool;
}

/// One entry of a subscription's teardown list.
pub enum Teardown {
  Empty,
  Action(Box<dyn FnOnce() -> Result<(), BoxError>>),
  Subscription(Subscription),
  Handle(Box<dyn SubscriptionLike>),
}

impl Teardown {
  /// A teardown action that cannot fail.
  pub fn action(f: impl FnOnce() + 'static) -> Self {
    Teardown::Action(Box::new(move || {
      f();
      Ok(())
    }))
  }

  /// A teardown action whose failure is collected into the
  /// [`UnsubscriptionError`] of the owning subscription.
  pub fn try_action(f: impl FnOnce() -> Result<(), BoxError> + 'static) -> Self {
    Teardown::Action(Box::new(f))
  }

  pub fn handle(handle: impl SubscriptionLike + 'static) -> Self { Teardown::Handle(Box::new(handle)) }

  fn is_closed(&self) -> bool {
    match self {
      Teardown::Empty => true,
      Teardown::Action(_) => false,
      Teardown::Subscription(s) => s.is_closed(),
      Teardown::Handle(h) => h.is_closed(),
    }
  }

  fn execute(self, errors: &mut Vec<BoxError>) {
    let result = match self {
      Teardown::Empty => return,
      Teardown::Action(f) => return f().unwrap_or_else(|err| errors.push(err)),
      Teardown::Subscription(s) => s.unsubscribe(),
      Teardown::Handle(h) => h.unsubscribe(),
    };
    if let Err(err) = result {
      errors.extend(err.errors);
    }
  }
}

impl From<()> for Teardown {
  #[inline]
  fn from(_: ()) -> Self { Teardown::Empty }
}

impl From<Subscription> for Teardown {
  #[inline]
  fn from(s: Subscription) -> Self { Teardown::Subscription(s) }
}

impl From<Option<Teardown>> for Teardown {
  #[inline]
  fn from(t: Option<Teardown>) -> Self { t.unwrap_or(Teardown::Empty) }
}

#[derive(Default)]
struct Inner {
  closed: bool,
  initial: Option<Teardown>,
  teardowns: SmallVec<[Teardown; 1]>,
  parents: SmallVec<[Weak<RefCell<Inner>>; 1]>,
}

/// Handle to an active execution and its cleanup.
///
/// Cloning yields another handle to the same subscription.
#[derive(Clone, Default)]
pub struct Subscription(Rc<RefCell<Inner>>);

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// A subscription that runs `teardown` first when it is unsubscribed.
  pub fn with_teardown(teardown: impl Into<Teardown>) -> Self {
    let inner = Inner { initial: Some(teardown.into()), ..Inner::default() };
    Subscription(Rc::new(RefCell::new(inner)))
  }

  /// A subscription that is already closed.
  pub fn closed() -> Self {
    let inner = Inner { closed: true, ..Inner::default() };
    Subscription(Rc::new(RefCell::new(inner)))
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.borrow().closed }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }

  /// Number of teardowns currently held.
  pub fn teardown_size(&self) -> usize { self.0.borrow().teardowns.len() }

  /// Register `teardown` to run when this subscription is unsubscribed.
  ///
  /// If this subscription is already closed the teardown runs immediately.
  /// Adding a subscription to itself, or adding a child that is already
  /// closed or already attached here, does nothing.
  pub fn add(&self, teardown: impl Into<Teardown>) {
    let teardown = teardown.into();
    if let Teardown::Subscription(child) = &teardown {
      if child.ptr_eq(self) || child.is_closed() || child.has_parent(self) {
        return;
      }
    }
    if matches!(teardown, Teardown::Empty) {
      return;
    }

    let rejected = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        Some(teardown)
      } else {
        if let Teardown::Subscription(child) = &teardown {
          child.0.borrow_mut().parents.push(Rc::downgrade(&self.0));
        }
        inner.teardowns.retain(|t| !t.is_closed());
        inner.teardowns.push(teardown);
        None
      }
    };

    if let Some(teardown) = rejected {
      let mut errors = vec![];
      teardown.execute(&mut errors);
      if !errors.is_empty() {
        report_unhandled_error(UnsubscriptionError::new(errors).into());
      }
    }
  }

  /// Detach `child` without unsubscribing it.
  pub fn remove(&self, child: &Subscription) {
    if let Ok(mut inner) = self.0.try_borrow_mut() {
      inner
        .teardowns
        .retain(|t| !matches!(t, Teardown::Subscription(s) if s.ptr_eq(child)));
    }
    if let Ok(mut child) = child.0.try_borrow_mut() {
      child
        .parents
        .retain(|p| p.upgrade().is_some_and(|p| !Rc::ptr_eq(&p, &self.0)));
    }
  }

  /// Close this subscription: detach from its parents, then run the initial
  /// teardown followed by every added teardown in insertion order.
  ///
  /// Every teardown is attempted even if some fail; the failures are
  /// returned together. Calls after the first return `Ok(())` without doing
  /// anything.
  pub fn unsubscribe(&self) -> Result<(), UnsubscriptionError> {
    let (initial, teardowns, parents) = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return Ok(());
      }
      inner.closed = true;
      (inner.initial.take(), mem::take(&mut inner.teardowns), mem::take(&mut inner.parents))
    };

    for parent in parents.iter().filter_map(Weak::upgrade) {
      Subscription(parent).remove(self);
    }

    let mut errors = vec![];
    for teardown in initial.into_iter().chain(teardowns) {
      teardown.execute(&mut errors);
    }
    if errors.is_empty() { Ok(()) } else { Err(UnsubscriptionError::new(errors)) }
  }

  /// Unsubscribe and hand any teardown failure to the unhandled-error
  /// reporter.
  pub(crate) fn unsubscribe_or_report(&self) {
    if let Err(err) = self.unsubscribe() {
      report_unhandled_error(err.into());
    }
  }

  /// Activates "RAII" behavior for this subscription: `unsubscribe()` is
  /// called as soon as the returned guard goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }

  fn has_parent(&self, parent: &Subscription) -> bool {
    self
      .0
      .borrow()
      .parents
      .iter()
      .any(|p| p.upgrade().is_some_and(|p| Rc::ptr_eq(&p, &parent.0)))
  }
}

impl SubscriptionLike for Subscription {
  #[inline]
  fn unsubscribe(&self) -> Result<(), UnsubscriptionError> { Subscription::unsubscribe(self) }

  #[inline]
  fn is_closed(&self) -> bool { Subscription::is_closed(self) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.borrow();
    f.debug_struct("Subscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardowns.len())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> Self { SubscriptionGuard(subscription) }

  pub fn subscription(&self) -> &Subscription { &self.0 }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe_or_report() }
}
