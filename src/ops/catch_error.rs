use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

struct CatchErrorObserver<Item, OutErr, F> {
  observer: Subscriber<Item, OutErr>,
  handler: Option<F>,
}

impl<Item, Err, OutErr, F> Observer<Item, Err> for CatchErrorObserver<Item, OutErr, F>
where
  Item: 'static,
  OutErr: 'static,
  F: FnOnce(Err) -> Observable<Item, OutErr>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) {
    let Some(handler) = self.handler.take() else { return };
    let replacement = handler(err);
    let subscriber = Subscriber::child_of(self.observer.subscription(), self.observer.clone());
    replacement.actual_subscribe(subscriber);
  }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// On error, continue with the observable returned by `handler` instead of
  /// failing. Values already emitted stay emitted.
  pub fn catch_error<OutErr, F>(self, handler: F) -> Observable<Item, OutErr>
  where
    OutErr: 'static,
    F: FnOnce(Err) -> Observable<Item, OutErr> + Clone + 'static,
  {
    self.lift(move |observer| CatchErrorObserver { observer, handler: Some(handler.clone()) })
  }
}

pub fn catch_error<Item, Err, OutErr, F>(
  handler: F,
) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, OutErr>
where
  Item: 'static,
  Err: 'static,
  OutErr: 'static,
  F: FnOnce(Err) -> Observable<Item, OutErr> + Clone + 'static,
{
  move |source| source.catch_error(handler)
}
