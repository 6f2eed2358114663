use std::time::Duration;

use super::Observable;
use crate::{
  scheduler::{Scheduler, Task, TaskState},
  subscriber::Subscriber,
};

/// Creates an observable that emits `value` once after `delay` on
/// `scheduler`, then completes.
pub fn timer<Item, Err, S>(value: Item, delay: Duration, scheduler: S) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: 'static,
  S: Scheduler,
{
  Observable::new(move |subscriber: Subscriber<Item, Err>| {
    let value = value.clone();
    scheduler.schedule_once(
      move || {
        subscriber.next(value);
        subscriber.complete();
      },
      Some(delay),
    )
  })
}

/// Creates an observable that emits `0, 1, 2, ...` every `period` on
/// `scheduler`. It never completes on its own.
pub fn interval<Err, S>(period: Duration, scheduler: S) -> Observable<usize, Err>
where
  Err: 'static,
  S: Scheduler,
{
  Observable::new(move |subscriber: Subscriber<usize, Err>| {
    let task = Task::new((subscriber, 0), move |(subscriber, count): &mut (Subscriber<usize, Err>, usize)| {
      if subscriber.is_closed() {
        return TaskState::Finished;
      }
      subscriber.next(*count);
      *count += 1;
      TaskState::Sleeping(period)
    });
    scheduler.schedule(task, Some(period))
  })
}
