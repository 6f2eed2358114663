use crate::{
  observable::{self, Observable},
  observer::{Observer, forward_terminals},
  subscriber::Subscriber,
};

struct TakeObserver<Item, Err> {
  observer: Subscriber<Item, Err>,
  remaining: usize,
}

impl<Item, Err> Observer<Item, Err> for TakeObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      return;
    }
    self.remaining -= 1;
    self.observer.next(value);
    if self.remaining == 0 {
      self.observer.complete();
    }
  }

  forward_terminals!(observer);
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Emit only the first `count` values, then complete and unsubscribe the
  /// source. `take(0)` completes without subscribing to the source at all.
  pub fn take(self, count: usize) -> Observable<Item, Err> {
    if count == 0 {
      return observable::empty();
    }
    self.lift(move |observer| TakeObserver { observer, remaining: count })
  }
}

pub fn take<Item, Err>(count: usize) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  move |source| source.take(count)
}
