//! Host-level hooks.
//!
//! An error that reaches an observer with no error handler, or a teardown
//! failure raised where no caller can observe it, is reported here instead of
//! being dropped. By default the report is logged through `tracing`; hosts
//! (and tests) can install their own handler.
//!
//! The hook is per thread, matching the single-threaded execution model of
//! the rest of the crate.

use std::{cell::RefCell, rc::Rc};

use crate::error::UnhandledError;

type UnhandledErrorHandler = Rc<dyn Fn(&UnhandledError)>;

thread_local! {
  static UNHANDLED_ERROR_HANDLER: RefCell<Option<UnhandledErrorHandler>> =
    const { RefCell::new(None) };
}

/// Install `handler` as this thread's reporter for unhandled errors,
/// replacing any previous one.
pub fn set_unhandled_error_handler(handler: impl Fn(&UnhandledError) + 'static) {
  UNHANDLED_ERROR_HANDLER.with(|slot| *slot.borrow_mut() = Some(Rc::new(handler)));
}

/// Restore the default reporter, which logs through `tracing`.
pub fn reset_unhandled_error_handler() {
  UNHANDLED_ERROR_HANDLER.with(|slot| slot.borrow_mut().take());
}

pub fn report_unhandled_error(err: UnhandledError) {
  // Clone the handler out so it may replace itself while running.
  let handler = UNHANDLED_ERROR_HANDLER.with(|slot| slot.borrow().clone());
  match handler {
    Some(handler) => handler(&err),
    None => tracing::error!(error = %err, "unhandled error"),
  }
}
