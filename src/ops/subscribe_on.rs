use crate::{observable::Observable, scheduler::Scheduler, subscriber::Subscriber};

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Subscribe to the source from a task on `scheduler` instead of
  /// immediately. Unsubscribing before the task ran means the source is
  /// never subscribed.
  pub fn subscribe_on<S: Scheduler>(self, scheduler: S) -> Observable<Item, Err> {
    Observable::new(move |downstream: Subscriber<Item, Err>| {
      let source = self.clone();
      let parent = downstream.subscription().clone();
      let upstream = Subscriber::child_of(&parent, downstream);
      scheduler.schedule_once(
        move || {
          source.actual_subscribe(upstream);
        },
        None,
      )
    })
  }
}

pub fn subscribe_on<Item, Err, S>(scheduler: S) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  S: Scheduler,
{
  move |source| source.subscribe_on(scheduler)
}
