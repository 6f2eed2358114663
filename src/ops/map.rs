use crate::{
  observable::Observable,
  observer::{Observer, forward_terminals},
  subscriber::Subscriber,
};

struct MapObserver<Out, Err, F> {
  observer: Subscriber<Out, Err>,
  map: F,
}

impl<Item, Out, Err, F> Observer<Item, Err> for MapObserver<Out, Err, F>
where
  F: FnMut(Item) -> Out,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }

  forward_terminals!(observer);
}

struct TryMapObserver<Out, Err, F> {
  observer: Subscriber<Out, Err>,
  map: F,
}

impl<Item, Out, Err, F> Observer<Item, Err> for TryMapObserver<Out, Err, F>
where
  F: FnMut(Item) -> Result<Out, Err>,
{
  fn next(&mut self, value: Item) {
    if let Err(err) = self.try_next(value) {
      self.observer.error(err);
    }
  }

  fn try_next(&mut self, value: Item) -> Result<(), Err> {
    let mapped = (self.map)(value)?;
    self.observer.next(mapped);
    Ok(())
  }

  forward_terminals!(observer);
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  ///
  /// Each subscription gets its own clone of `f`.
  pub fn map<Out, F>(self, f: F) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Out + Clone + 'static,
  {
    self.lift(move |observer| MapObserver { observer, map: f.clone() })
  }

  /// Like [`map`](Self::map), but `f` may fail. The first `Err` terminates
  /// the stream with that error and unsubscribes the source.
  pub fn try_map<Out, F>(self, f: F) -> Observable<Out, Err>
  where
    Out: 'static,
    F: FnMut(Item) -> Result<Out, Err> + Clone + 'static,
  {
    self.lift(move |observer| TryMapObserver { observer, map: f.clone() })
  }
}

pub fn map<Item, Out, Err, F>(f: F) -> impl FnOnce(Observable<Item, Err>) -> Observable<Out, Err>
where
  Item: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(Item) -> Out + Clone + 'static,
{
  move |source| source.map(f)
}

pub fn try_map<Item, Out, Err, F>(f: F) -> impl FnOnce(Observable<Item, Err>) -> Observable<Out, Err>
where
  Item: 'static,
  Out: 'static,
  Err: 'static,
  F: FnMut(Item) -> Result<Out, Err> + Clone + 'static,
{
  move |source| source.try_map(f)
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  #[rxkit_macro::test]
  fn doubles_then_completes() {
    let seen: Rc<RefCell<Vec<Notification<i32, ()>>>> = Rc::default();
    let (n, c) = (seen.clone(), seen.clone());
    observable::from_iter::<_, ()>([1, 2, 3])
      .map(|v| v * 2)
      .subscribe_complete(
        move |v| n.borrow_mut().push(Notification::Next(v)),
        move || c.borrow_mut().push(Notification::Complete),
      );
    assert_eq!(
      *seen.borrow(),
      [Notification::Next(2), Notification::Next(4), Notification::Next(6), Notification::Complete]
    );
  }

  #[rxkit_macro::test]
  fn changes_item_type() {
    let out = Rc::new(RefCell::new(String::new()));
    let c_out = out.clone();
    observable::from_iter::<_, ()>(['a', 'b'])
      .map(|c: char| c.to_string())
      .subscribe(move |s| c_out.borrow_mut().push_str(&s));
    assert_eq!(*out.borrow(), "ab");
  }

  #[rxkit_macro::test]
  fn stateful_mapper_is_fresh_per_subscription() {
    let source = observable::from_iter::<_, ()>([10, 20]).map({
      let mut index = 0;
      move |v| {
        index += 1;
        (index, v)
      }
    });
    for _ in 0..2 {
      let seen = Rc::new(RefCell::new(vec![]));
      let c_seen = seen.clone();
      source.clone().subscribe(move |v| c_seen.borrow_mut().push(v));
      assert_eq!(*seen.borrow(), [(1, 10), (2, 20)]);
    }
  }

  #[rxkit_macro::test]
  fn try_map_failure_errors_and_unsubscribes_source() {
    let torn = Rc::new(Cell::new(false));
    let c_torn = torn.clone();
    let subject = Subject::<i32, String>::new();
    let source = subject.to_observable().finalize(move || c_torn.set(true));

    let seen = Rc::new(RefCell::new(vec![]));
    let (n, e) = (seen.clone(), seen.clone());
    source
      .try_map(|v| if v < 0 { Err(format!("negative: {v}")) } else { Ok(v) })
      .subscribe_err(move |v| n.borrow_mut().push(Ok(v)), move |err| e.borrow_mut().push(Err(err)));

    subject.next(1);
    subject.next(-2);
    subject.next(3);
    assert_eq!(*seen.borrow(), [Ok(1), Err("negative: -2".to_owned())]);
    assert!(torn.get());
    assert_eq!(subject.observer_count(), 0);
  }
}
