//! Error types shared across the crate.
//!
//! Data-path errors travel as `error` notifications on a caller-chosen `Err`
//! type and never appear here. The types below cover the failures that
//! happen outside the notification channel: teardown failures during
//! unsubscription, and errors that reach the host because nobody handles
//! them.

use std::fmt::Debug;

/// Boxed error returned by a fallible teardown action.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Every teardown failure collected while unsubscribing a subscription tree.
///
/// A failing teardown never prevents its siblings from running; all failures
/// are gathered and raised together once every teardown has been attempted.
/// Failures from nested subscriptions are flattened into this list.
#[derive(Debug, thiserror::Error)]
#[error("{} error(s) occurred during unsubscription", .errors.len())]
pub struct UnsubscriptionError {
  pub errors: Vec<BoxError>,
}

impl UnsubscriptionError {
  pub fn new(errors: Vec<BoxError>) -> Self { Self { errors } }

  #[inline]
  pub fn errors(&self) -> &[BoxError] { &self.errors }

  #[inline]
  pub fn len(&self) -> usize { self.errors.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.errors.is_empty() }
}

/// An error with nowhere left to go, handed to the host-level reporter in
/// [`crate::config`].
#[derive(Debug, thiserror::Error)]
pub enum UnhandledError {
  /// An `error` notification reached an observer without an error handler.
  #[error("unhandled error notification: {0}")]
  Notification(String),

  /// Unsubscription failed where no caller could receive the result, such
  /// as the automatic unsubscription after a terminal notification.
  #[error(transparent)]
  Unsubscription(#[from] UnsubscriptionError),

  /// An executor refused a scheduled task.
  #[error("failed to spawn scheduled task: {0}")]
  Spawn(String),
}

impl UnhandledError {
  pub fn notification<Err: Debug>(err: &Err) -> Self { Self::Notification(format!("{err:?}")) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("teardown failed: {0}")]
  struct TeardownFailed(&'static str);

  #[rxkit_macro::test]
  fn unsubscription_error_counts_members() {
    let err = UnsubscriptionError::new(vec![
      Box::new(TeardownFailed("a")),
      Box::new(TeardownFailed("b")),
    ]);
    assert_eq!(err.len(), 2);
    assert_eq!(err.to_string(), "2 error(s) occurred during unsubscription");
    assert_eq!(err.errors()[1].to_string(), "teardown failed: b");
  }

  #[rxkit_macro::test]
  fn notification_uses_debug_rendering() {
    let err = UnhandledError::notification(&"boom");
    assert_eq!(err.to_string(), "unhandled error notification: \"boom\"");
  }
}
