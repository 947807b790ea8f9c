use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle for a registered subscriber, used to detach it again.
///
/// Returned by [`Stream::subscribe`]. Most subscribers live for the whole
/// pipeline and never use it; conditional branches (see
/// [`switch`](crate::view::switch)) unsubscribe superseded branches with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

struct Inner<T> {
    subscribers: RefCell<Vec<(u64, Rc<RefCell<dyn FnMut(&T)>>)>>,
    next_id: Cell<u64>,
    latest: RefCell<Option<T>>,
    replay: bool,
}

/// A push-based stream of values.
///
/// Subscribers are notified synchronously, in emission order. Streams come in
/// two flavours, fixed at construction:
///
/// - **raw** streams (event sinks, merges of them) deliver only occurrences
///   emitted after subscription;
/// - **replaying** streams (state slices produced by [`fold`](Stream::fold),
///   combined values) deliver their latest value to a new subscriber first,
///   so a late joiner always starts from the most recent committed value.
///
/// Operators derive new streams by subscribing to their sources; everything
/// stays on one thread, so handles are cheap `Rc` clones of the same stream.
pub struct Stream<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Stream {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Stream<T> {
    pub(crate) fn new(replay: bool) -> Self {
        Stream {
            inner: Rc::new(Inner {
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                latest: RefCell::new(None),
                replay,
            }),
        }
    }

    /// Stable identity of the underlying allocation, for comparing bindings.
    /// Valid while any handle to this stream is alive.
    pub(crate) fn token(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    /// Push a value to every current subscriber, in registration order.
    ///
    /// The subscriber list is re-read between calls, so a subscriber may
    /// register further subscriptions or emit into *other* streams while
    /// being notified. Re-entrant emission into the same stream from its own
    /// subscriber is not supported.
    pub(crate) fn emit(&self, value: T) {
        if self.inner.replay {
            *self.inner.latest.borrow_mut() = Some(value.clone());
        }
        let mut index = 0;
        loop {
            let callback = {
                let subscribers = self.inner.subscribers.borrow();
                match subscribers.get(index) {
                    Some((_, callback)) => Rc::clone(callback),
                    None => break,
                }
            };
            (&mut *callback.borrow_mut())(&value);
            index += 1;
        }
    }

    /// Register a subscriber.
    ///
    /// On a replaying stream that already holds a value, `f` is invoked with
    /// that value before this call returns.
    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) -> Subscription {
        let mut f = f;
        if self.inner.replay {
            let current = self.inner.latest.borrow().clone();
            if let Some(value) = current {
                f(&value);
            }
        }
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let callback: Rc<RefCell<dyn FnMut(&T)>> = Rc::new(RefCell::new(f));
        self.inner.subscribers.borrow_mut().push((id, callback));
        Subscription(id)
    }

    /// Detach a subscriber. Unknown handles are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|(id, _)| *id != subscription.0);
    }

    /// Derive a stream by applying `f` to every value.
    ///
    /// The output replays if the source does.
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Stream<U> {
        let out = Stream::new(self.inner.replay);
        let target = out.clone();
        self.subscribe(move |value| target.emit(f(value)));
        out
    }

    /// Interleave several streams into one, in arrival order.
    ///
    /// No priority between sources: each occurrence is forwarded the moment
    /// its source emits it. The output replays if any source does.
    pub fn merge(sources: impl IntoIterator<Item = Stream<T>>) -> Stream<T> {
        let sources: Vec<Stream<T>> = sources.into_iter().collect();
        let replay = sources.iter().any(|s| s.inner.replay);
        let out = Stream::new(replay);
        for source in &sources {
            let target = out.clone();
            source.subscribe(move |value| target.emit(value.clone()));
        }
        out
    }

    /// Fold every incoming value over a running state, starting from `seed`.
    ///
    /// This is how state slices are made: the output is a replaying stream
    /// whose latest value is the current state, seeded so that subscribers
    /// see `seed` before any input arrives.
    ///
    /// ```
    /// use foldview::Sink;
    ///
    /// let presses: Sink<()> = Sink::new();
    /// let count = presses.stream().fold(0u32, |n, _| n + 1);
    ///
    /// let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    /// let tap = std::rc::Rc::clone(&seen);
    /// count.subscribe(move |n| tap.borrow_mut().push(*n));
    ///
    /// presses.emit(());
    /// presses.emit(());
    /// assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    /// ```
    pub fn fold<S: Clone + 'static>(&self, seed: S, f: impl Fn(S, &T) -> S + 'static) -> Stream<S> {
        let out = Stream::new(true);
        *out.inner.latest.borrow_mut() = Some(seed.clone());
        let state = Rc::new(RefCell::new(seed));
        let target = out.clone();
        self.subscribe(move |value| {
            let current = state.borrow().clone();
            let next = f(current, value);
            *state.borrow_mut() = next.clone();
            target.emit(next);
        });
        out
    }

    /// Suppress consecutive duplicate values.
    pub fn distinct_until_changed(&self) -> Stream<T>
    where
        T: PartialEq,
    {
        let out = Stream::new(self.inner.replay);
        let previous: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let target = out.clone();
        self.subscribe(move |value| {
            let duplicate = previous.borrow().as_ref() == Some(value);
            if !duplicate {
                *previous.borrow_mut() = Some(value.clone());
                target.emit(value.clone());
            }
        });
        out
    }

    /// Combine the latest values of two streams through `f`.
    ///
    /// Emits once both inputs have produced at least one value, then again
    /// whenever either side updates, always pairing each input's most recent
    /// value — history is never re-combined. The output replays.
    pub fn combine<U: Clone + 'static, R: Clone + 'static>(
        left: &Stream<T>,
        right: &Stream<U>,
        f: impl Fn(&T, &U) -> R + 'static,
    ) -> Stream<R> {
        let out = Stream::new(true);
        let slots: Rc<RefCell<(Option<T>, Option<U>)>> = Rc::new(RefCell::new((None, None)));
        let f = Rc::new(f);

        {
            let target = out.clone();
            let slots = Rc::clone(&slots);
            let f = Rc::clone(&f);
            left.subscribe(move |value| {
                slots.borrow_mut().0 = Some(value.clone());
                let combined = {
                    let slots = slots.borrow();
                    match (&slots.0, &slots.1) {
                        (Some(l), Some(r)) => Some((*f)(l, r)),
                        _ => None,
                    }
                };
                if let Some(combined) = combined {
                    target.emit(combined);
                }
            });
        }
        {
            let target = out.clone();
            let slots = Rc::clone(&slots);
            let f = Rc::clone(&f);
            right.subscribe(move |value| {
                slots.borrow_mut().1 = Some(value.clone());
                let combined = {
                    let slots = slots.borrow();
                    match (&slots.0, &slots.1) {
                        (Some(l), Some(r)) => Some((*f)(l, r)),
                        _ => None,
                    }
                };
                if let Some(combined) = combined {
                    target.emit(combined);
                }
            });
        }

        out
    }
}
