//! # rxkit: a single-threaded Reactive Extensions core
//!
//! Push-based streams composed from operators, with deterministic teardown,
//! cancellation that reaches every live resource, and multicast fan-out.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxkit::prelude::*;
//!
//! observable::from_iter::<_, ()>(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy producer; every subscribe runs it afresh |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscriber`] | The stop gate every observer sits behind |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Subject`] | Observer and observable at once, fans out to many |
//! | [`Scheduler`] | Decides when scheduled work runs |
//!
//! Everything runs on one thread: shared state is `Rc`/`RefCell`, and the
//! only suspension points are schedulers that defer work.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `futures::executor::LocalSpawner`
//!   implements [`Scheduler`], with timers from `futures-time`
//! - **`tokio-scheduler`**: [`TokioLocalScheduler`](scheduler::TokioLocalScheduler)
//!   for tokio `LocalSet`s
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler

pub mod config;
pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
