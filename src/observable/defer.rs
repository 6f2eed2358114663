use super::Observable;
use crate::subscriber::Subscriber;

/// Creates an observable that calls `factory` on every subscription and
/// subscribes to the observable it returns.
pub fn defer<Item, Err, F>(factory: F) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  F: Fn() -> Observable<Item, Err> + 'static,
{
  Observable::new(move |subscriber: Subscriber<Item, Err>| factory().actual_subscribe(subscriber))
}
