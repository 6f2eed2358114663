use crate::{
  observable::Observable,
  observer::{Notification, Observer},
  scheduler::Scheduler,
  subscriber::Subscriber,
};

struct ObserveOnObserver<Item, Err, S> {
  observer: Subscriber<Item, Err>,
  scheduler: S,
}

impl<Item: 'static, Err: 'static, S: Scheduler> ObserveOnObserver<Item, Err, S> {
  fn forward(&self, notification: Notification<Item, Err>) {
    let observer = self.observer.clone();
    let handle = self.scheduler.schedule_once(
      move || {
        let mut observer = observer;
        notification.accept(&mut observer);
      },
      None,
    );
    self.observer.add(handle);
  }
}

impl<Item: 'static, Err: 'static, S: Scheduler> Observer<Item, Err> for ObserveOnObserver<Item, Err, S> {
  fn next(&mut self, value: Item) { self.forward(Notification::Next(value)) }

  fn error(&mut self, err: Err) { self.forward(Notification::Error(err)) }

  fn complete(&mut self) { self.forward(Notification::Complete) }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Re-emit every notification from a task on `scheduler`.
  ///
  /// Order is preserved. Unsubscribing cancels notifications that were
  /// scheduled but have not run yet.
  pub fn observe_on<S: Scheduler>(self, scheduler: S) -> Observable<Item, Err> {
    self.lift(move |observer| ObserveOnObserver { observer, scheduler: scheduler.clone() })
  }
}

pub fn observe_on<Item, Err, S>(scheduler: S) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  S: Scheduler,
{
  move |source| source.observe_on(scheduler)
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  #[rxkit_macro::test]
  fn delivers_on_the_scheduler_in_order() {
    let scheduler = TestScheduler::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(Cell::new(false));
    let (c_seen, c_completed) = (seen.clone(), completed.clone());
    observable::from_iter::<_, ()>([1, 2, 3])
      .observe_on(scheduler.clone())
      .subscribe_complete(move |v| c_seen.borrow_mut().push(v), move || c_completed.set(true));

    assert!(seen.borrow().is_empty());
    assert_eq!(scheduler.pending_count(), 4);
    scheduler.flush();
    assert_eq!(*seen.borrow(), [1, 2, 3]);
    assert!(completed.get());
  }

  #[rxkit_macro::test]
  fn unsubscribe_cancels_pending_deliveries() {
    let scheduler = TestScheduler::new();
    let hits = Rc::new(Cell::new(0));
    let c_hits = hits.clone();
    let subscription = observable::from_iter::<_, ()>([1, 2])
      .observe_on(scheduler.clone())
      .subscribe(move |_| c_hits.set(c_hits.get() + 1));
    subscription.unsubscribe().unwrap();
    scheduler.flush();
    assert_eq!(hits.get(), 0);
    assert!(scheduler.is_empty());
  }

  #[rxkit_macro::test]
  fn queue_scheduler_delivers_synchronously() {
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter::<_, ()>([1, 2])
      .observe_on(QueueScheduler::new())
      .subscribe(move |v| c_seen.borrow_mut().push(v));
    assert_eq!(*seen.borrow(), [1, 2]);
  }
}
