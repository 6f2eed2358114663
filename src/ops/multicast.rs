use crate::{
  observable::{ConnectableObservable, Observable},
  subject::{ReplaySubject, Subject, SubjectLike},
};

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Share one subscription to `self` among many subscribers through a
  /// subject built by `factory`.
  ///
  /// The factory is called again whenever a terminated subject has to be
  /// replaced by a new connection.
  pub fn multicast<S, F>(self, factory: F) -> ConnectableObservable<Item, Err, S>
  where
    S: SubjectLike<Item, Err>,
    F: Fn() -> S + 'static,
  {
    ConnectableObservable::new(self, factory)
  }

  /// [`multicast`](Self::multicast) through a plain [`Subject`].
  pub fn publish(self) -> ConnectableObservable<Item, Err, Subject<Item, Err>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.multicast(Subject::new)
  }

  /// [`multicast`](Self::multicast) through a [`ReplaySubject`] keeping the
  /// last `capacity` values.
  pub fn publish_replay(self, capacity: usize) -> ConnectableObservable<Item, Err, ReplaySubject<Item, Err>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.multicast(move || ReplaySubject::new(capacity))
  }

  /// `publish().ref_count()`: connect on the first subscriber, disconnect
  /// after the last one left.
  pub fn share(self) -> Observable<Item, Err>
  where
    Item: Clone,
    Err: Clone,
  {
    self.publish().ref_count()
  }
}

pub fn multicast<Item, Err, S, F>(factory: F) -> impl FnOnce(Observable<Item, Err>) -> ConnectableObservable<Item, Err, S>
where
  Item: 'static,
  Err: 'static,
  S: SubjectLike<Item, Err>,
  F: Fn() -> S + 'static,
{
  move |source| source.multicast(factory)
}

pub fn publish<Item, Err>() -> impl FnOnce(Observable<Item, Err>) -> ConnectableObservable<Item, Err, Subject<Item, Err>>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  |source| source.publish()
}

pub fn publish_replay<Item, Err>(
  capacity: usize,
) -> impl FnOnce(Observable<Item, Err>) -> ConnectableObservable<Item, Err, ReplaySubject<Item, Err>>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  move |source| source.publish_replay(capacity)
}

pub fn share<Item, Err>() -> impl FnOnce(Observable<Item, Err>) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  |source| source.share()
}
