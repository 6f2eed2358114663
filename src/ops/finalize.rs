use std::rc::Rc;

use crate::{
  observable::Observable,
  subscriber::Subscriber,
  subscription::Teardown,
};

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Call `f` once per subscription when it ends, whether by `complete`,
  /// `error` or `unsubscribe`. `f` runs after the source was torn down.
  pub fn finalize<F>(self, f: F) -> Observable<Item, Err>
  where
    F: Fn() + 'static,
  {
    let f = Rc::new(f);
    Observable::new(move |downstream: Subscriber<Item, Err>| {
      let upstream = Subscriber::child_of(downstream.subscription(), downstream.clone());
      self.actual_subscribe(upstream);
      let f = f.clone();
      Teardown::action(move || f())
    })
  }
}

pub fn finalize<Item, Err, F>(f: F) -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
  F: Fn() + 'static,
{
  move |source| source.finalize(f)
}
