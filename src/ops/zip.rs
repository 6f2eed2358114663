use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

struct ZipState<A, B> {
  left: VecDeque<A>,
  right: VecDeque<B>,
  left_done: bool,
  right_done: bool,
}

impl<A, B> ZipState<A, B> {
  /// Once one side completed with nothing buffered, no further pair can
  /// ever be formed.
  fn exhausted(&self) -> bool {
    (self.left_done && self.left.is_empty()) || (self.right_done && self.right.is_empty())
  }
}

struct ZipContext<A, B, Err> {
  downstream: Subscriber<(A, B), Err>,
  state: RefCell<ZipState<A, B>>,
}

impl<A, B, Err> ZipContext<A, B, Err> {
  fn emit(&self, pair: Option<(A, B)>) {
    if let Some(pair) = pair {
      self.downstream.next(pair);
    }
    let exhausted = self.state.borrow().exhausted();
    if exhausted {
      self.downstream.complete();
    }
  }
}

struct ZipLeft<A, B, Err>(Rc<ZipContext<A, B, Err>>);

impl<A, B, Err> Observer<A, Err> for ZipLeft<A, B, Err> {
  fn next(&mut self, value: A) {
    let pair = {
      let mut state = self.0.state.borrow_mut();
      match state.right.pop_front() {
        Some(b) => Some((value, b)),
        None => {
          state.left.push_back(value);
          None
        }
      }
    };
    self.0.emit(pair);
  }

  fn error(&mut self, err: Err) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.state.borrow_mut().left_done = true;
    self.0.emit(None);
  }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

struct ZipRight<A, B, Err>(Rc<ZipContext<A, B, Err>>);

impl<A, B, Err> Observer<B, Err> for ZipRight<A, B, Err> {
  fn next(&mut self, value: B) {
    let pair = {
      let mut state = self.0.state.borrow_mut();
      match state.left.pop_front() {
        Some(a) => Some((a, value)),
        None => {
          state.right.push_back(value);
          None
        }
      }
    };
    self.0.emit(pair);
  }

  fn error(&mut self, err: Err) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.state.borrow_mut().right_done = true;
    self.0.emit(None);
  }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Pair the n-th value of `self` with the n-th value of `other`.
  ///
  /// Values wait in a per-side buffer until the other side produced its
  /// counterpart. The result completes as soon as one side completed and
  /// has no buffered values left.
  pub fn zip<Other: 'static>(self, other: Observable<Other, Err>) -> Observable<(Item, Other), Err> {
    Observable::new(move |downstream: Subscriber<(Item, Other), Err>| {
      let state = ZipState { left: VecDeque::new(), right: VecDeque::new(), left_done: false, right_done: false };
      let ctx = Rc::new(ZipContext { downstream: downstream.clone(), state: RefCell::new(state) });
      let left = Subscriber::child_of(downstream.subscription(), ZipLeft(ctx.clone()));
      let right = Subscriber::child_of(downstream.subscription(), ZipRight(ctx));
      self.actual_subscribe(left);
      other.actual_subscribe(right);
    })
  }
}

pub fn zip<Item, Other, Err>(
  other: Observable<Other, Err>,
) -> impl FnOnce(Observable<Item, Err>) -> Observable<(Item, Other), Err>
where
  Item: 'static,
  Other: 'static,
  Err: 'static,
{
  move |source| source.zip(other)
}
