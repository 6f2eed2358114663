use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

struct MapErrObserver<Item, OutErr, F> {
  observer: Subscriber<Item, OutErr>,
  map: Option<F>,
}

impl<Item, Err, OutErr, F> Observer<Item, Err> for MapErrObserver<Item, OutErr, F>
where
  F: FnOnce(Err) -> OutErr,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) {
    if let Some(map) = self.map.take() {
      self.observer.error(map(err));
    }
  }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Converts the error type of the stream.
  pub fn map_err<OutErr, F>(self, f: F) -> Observable<Item, OutErr>
  where
    OutErr: 'static,
    F: FnOnce(Err) -> OutErr + Clone + 'static,
  {
    self.lift(move |observer| MapErrObserver { observer, map: Some(f.clone()) })
  }
}

pub fn map_err<Item, Err, OutErr, F>(f: F) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, OutErr>
where
  Item: 'static,
  Err: 'static,
  OutErr: 'static,
  F: FnOnce(Err) -> OutErr + Clone + 'static,
{
  move |source| source.map_err(f)
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[derive(Debug, Clone, PartialEq)]
  enum AppError {
    Upstream(&'static str),
  }

  #[rxkit_macro::test]
  fn wraps_error_and_keeps_values() {
    let seen = Rc::new(RefCell::new(vec![]));
    let (n, e) = (seen.clone(), seen.clone());
    observable::from_iter::<_, &'static str>([1, 2])
      .concat(observable::throw_err("disk"))
      .map_err(AppError::Upstream)
      .subscribe_err(move |v| n.borrow_mut().push(Ok(v)), move |err| e.borrow_mut().push(Err(err)));
    assert_eq!(*seen.borrow(), [Ok(1), Ok(2), Err(AppError::Upstream("disk"))]);
  }
}
