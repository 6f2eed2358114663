//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Factories live behind the module name: `observable::of(1)`
pub use crate::observable::{self, ConnectableObservable, InputKind, Observable, ObservableInput};
// Observer side
pub use crate::observer::{FnObserver, Notification, Observer};
// Scheduler core types
pub use crate::scheduler::{QueueScheduler, Scheduler, Task, TaskHandle, TaskState, TestScheduler};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioLocalScheduler;
// Subject
pub use crate::subject::*;
pub use crate::subscriber::Subscriber;
// Subscription
pub use crate::subscription::{Subscription, SubscriptionGuard, SubscriptionLike, Teardown};
pub use crate::{
  error::{UnhandledError, UnsubscriptionError},
  ops,
  pipe,
};
