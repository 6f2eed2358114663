use std::future::Future;

use futures::{
  future::{FutureExt, abortable},
  task::{LocalSpawn, LocalSpawnExt},
};

use super::Observable;
use crate::{
  config::report_unhandled_error, error::UnhandledError, subscriber::Subscriber,
  subscription::Teardown,
};

/// Converts a `Future` into an observable that emits its output once and
/// completes.
///
/// The future is polled at most once across all subscriptions: every
/// subscriber waits on the same shared result, spawned on `spawner`.
/// Unsubscribing before it resolves aborts that subscriber's wait.
pub fn from_future<F, Err, S>(future: F, spawner: S) -> Observable<F::Output, Err>
where
  F: Future + 'static,
  F::Output: Clone + 'static,
  Err: Clone + 'static,
  S: LocalSpawn + 'static,
{
  from_future_result(future.map(Ok), spawner)
}

/// Like [`from_future`], for futures that can fail: `Ok` is emitted and
/// followed by completion, `Err` becomes the error notification.
pub fn from_future_result<F, Item, Err, S>(future: F, spawner: S) -> Observable<Item, Err>
where
  F: Future<Output = Result<Item, Err>> + 'static,
  Item: Clone + 'static,
  Err: Clone + 'static,
  S: LocalSpawn + 'static,
{
  let shared = future.boxed_local().shared();
  Observable::new(move |subscriber: Subscriber<Item, Err>| {
    let deliver = shared.clone().map(move |result| match result {
      Ok(value) => {
        subscriber.next(value);
        subscriber.complete();
      }
      Err(err) => subscriber.error(err),
    });
    let (task, abort) = abortable(deliver);
    if let Err(err) = spawner.spawn_local(task.map(|_| ())) {
      report_unhandled_error(UnhandledError::Spawn(err.to_string()));
    }
    Teardown::action(move || abort.abort())
  })
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use futures::{executor::LocalPool, future};

  use super::*;

  #[rxkit_macro::test]
  fn emits_output_then_completes() {
    let mut pool = LocalPool::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(Cell::new(false));
    let (c_seen, c_completed) = (seen.clone(), completed.clone());

    from_future::<_, (), _>(future::ready(7), pool.spawner())
      .subscribe_complete(move |v| c_seen.borrow_mut().push(v), move || c_completed.set(true));
    assert!(seen.borrow().is_empty());

    pool.run();
    assert_eq!(*seen.borrow(), [7]);
    assert!(completed.get());
  }

  #[rxkit_macro::test]
  fn shares_one_poll_across_subscribers() {
    let mut pool = LocalPool::new();
    let polls = Rc::new(Cell::new(0));
    let c_polls = polls.clone();
    let source = from_future::<_, (), _>(
      future::lazy(move |_| {
        c_polls.set(c_polls.get() + 1);
        "done"
      }),
      pool.spawner(),
    );

    let hits = Rc::new(Cell::new(0));
    for _ in 0..3 {
      let c_hits = hits.clone();
      source.subscribe(move |_| c_hits.set(c_hits.get() + 1));
    }
    pool.run();
    assert_eq!(polls.get(), 1);
    assert_eq!(hits.get(), 3);
  }

  #[rxkit_macro::test]
  fn failure_becomes_error_notification() {
    let mut pool = LocalPool::new();
    let err = Rc::new(Cell::new(None));
    let c_err = err.clone();
    from_future_result(future::ready(Err::<i32, _>("offline")), pool.spawner())
      .subscribe_err(|_| unreachable!(), move |e| c_err.set(Some(e)));
    pool.run();
    assert_eq!(err.get(), Some("offline"));
  }

  #[rxkit_macro::test]
  fn unsubscribe_before_resolution_aborts() {
    let mut pool = LocalPool::new();
    let hit = Rc::new(Cell::new(false));
    let c_hit = hit.clone();
    let subscription =
      from_future::<_, (), _>(future::ready(1), pool.spawner()).subscribe(move |_| c_hit.set(true));
    subscription.unsubscribe().unwrap();
    pool.run();
    assert!(!hit.get());
  }
}
