use crate::{
  observable::Observable,
  observer::{Observer, forward_terminals},
  subscriber::Subscriber,
};

struct FilterObserver<Item, Err, F> {
  observer: Subscriber<Item, Err>,
  predicate: F,
}

impl<Item, Err, F> Observer<Item, Err> for FilterObserver<Item, Err, F>
where
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.observer.next(value)
    }
  }

  forward_terminals!(observer);
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Emit only the values for which `predicate` returns `true`.
  pub fn filter<F>(self, predicate: F) -> Observable<Item, Err>
  where
    F: FnMut(&Item) -> bool + Clone + 'static,
  {
    self.lift(move |observer| FilterObserver { observer, predicate: predicate.clone() })
  }
}

pub fn filter<Item, Err, F>(predicate: F) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  F: FnMut(&Item) -> bool + Clone + 'static,
{
  move |source| source.filter(predicate)
}
