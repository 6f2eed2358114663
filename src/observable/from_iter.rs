use super::Observable;
use crate::subscriber::Subscriber;

/// Creates an observable that emits each value of `iter` in order and then
/// completes.
///
/// Emission stops early once the subscriber is closed, so infinite
/// iterators are fine behind `take`.
pub fn from_iter<I, Err>(iter: I) -> Observable<I::Item, Err>
where
  I: IntoIterator + Clone + 'static,
  I::Item: 'static,
  Err: 'static,
{
  Observable::new(move |subscriber: Subscriber<I::Item, Err>| {
    for value in iter.clone() {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(value);
    }
    subscriber.complete();
  })
}

/// Creates an observable producing a single value, then completing.
pub fn of<Item, Err>(value: Item) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: 'static,
{
  Observable::new(move |subscriber: Subscriber<Item, Err>| {
    subscriber.next(value.clone());
    subscriber.complete();
  })
}

/// Creates an observable that completes immediately without emitting.
pub fn empty<Item: 'static, Err: 'static>() -> Observable<Item, Err> {
  Observable::new(|subscriber: Subscriber<Item, Err>| subscriber.complete())
}

/// Creates an observable that never emits and never terminates.
pub fn never<Item: 'static, Err: 'static>() -> Observable<Item, Err> {
  Observable::new(|_: Subscriber<Item, Err>| {})
}

/// Creates an observable that fails immediately with `err`.
pub fn throw_err<Item, Err>(err: Err) -> Observable<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
{
  Observable::new(move |subscriber: Subscriber<Item, Err>| subscriber.error(err.clone()))
}
