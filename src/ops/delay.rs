use std::time::Duration;

use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::Scheduler,
  subscriber::Subscriber,
};

struct DelayObserver<Item, Err, S> {
  observer: Subscriber<Item, Err>,
  delay: Duration,
  scheduler: S,
}

impl<Item: 'static, Err: 'static, S: Scheduler> DelayObserver<Item, Err, S> {
  fn later(&self, f: impl FnOnce(&Subscriber<Item, Err>) + 'static) {
    let observer = self.observer.clone();
    let handle = self.scheduler.schedule_once(move || f(&observer), Some(self.delay));
    self.observer.add(handle);
  }
}

impl<Item: 'static, Err: 'static, S: Scheduler> Observer<Item, Err> for DelayObserver<Item, Err, S> {
  fn next(&mut self, value: Item) { self.later(move |observer| observer.next(value)) }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.later(|observer| observer.complete()) }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Shift every value and the completion later by `delay` on `scheduler`.
  /// Errors are forwarded at once and drop values still in flight.
  pub fn delay<S: Scheduler>(self, delay: Duration, scheduler: S) -> Observable<Item, Err> {
    self.lift(move |observer| DelayObserver { observer, delay, scheduler: scheduler.clone() })
  }
}

pub fn delay<Item, Err, S>(
  delay: Duration, scheduler: S,
) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  S: Scheduler,
{
  move |source| source.delay(delay, scheduler)
}
