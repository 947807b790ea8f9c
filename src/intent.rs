use crate::convert::{ConverterConfig, ConverterEvents};
use crate::stream::Stream;
use std::fmt;
use std::rc::Rc;

/// A pure state-update function for one state slice.
///
/// The unit of mutation: state is never written directly, only replaced by
/// applying an update to the prior value. Updates close over the operation,
/// not a stale value, so relative updates (increment, decrement) compose
/// correctly with absolute ones (replace) in any arrival order.
///
/// ```
/// use foldview::Update;
///
/// let double = Update::new(|n: u32| n * 2);
/// assert_eq!(double.apply(4), 8);
/// assert_eq!(Update::replace(7).apply(4), 7);
/// ```
pub struct Update<S>(Rc<dyn Fn(S) -> S>);

impl<S> Clone for Update<S> {
    fn clone(&self) -> Self {
        Update(Rc::clone(&self.0))
    }
}

impl<S: 'static> Update<S> {
    /// Wrap an arbitrary `old -> new` function.
    pub fn new(f: impl Fn(S) -> S + 'static) -> Self {
        Update(Rc::new(f))
    }

    /// Replace the state with a fixed value, ignoring the old one.
    pub fn replace(value: S) -> Self
    where
        S: Clone,
    {
        Update::new(move |_| value.clone())
    }

    /// Leave the state unchanged.
    pub fn identity() -> Self {
        Update::new(|state| state)
    }

    /// Apply the update to the prior value, producing the next one.
    pub fn apply(&self, state: S) -> S {
        (*self.0)(state)
    }
}

impl<S> fmt::Debug for Update<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Update")
    }
}

/// One merged update stream per state slice.
pub struct ConverterIntents {
    pub update_amount: Stream<Update<f64>>,
    pub update_currency: Stream<Update<String>>,
}

/// Map raw interaction events to state updates.
///
/// Each slice gets one stream merging every event source that targets it,
/// interleaved in arrival order. Unparseable amount text leaves the amount
/// as-is; decrement clamps at zero.
pub fn intents(events: &ConverterEvents, config: &ConverterConfig) -> ConverterIntents {
    let initial_amount = config.initial_amount;
    let update_amount = Stream::merge([
        events
            .amount_changed
            .stream()
            .map(|text: &String| match text.trim().parse::<f64>() {
                Ok(amount) => Update::replace(amount),
                Err(_) => Update::identity(),
            }),
        events
            .reset_clicked
            .stream()
            .map(move |_| Update::replace(initial_amount)),
        events
            .increment_clicked
            .stream()
            .map(|_| Update::new(|amount: f64| amount + 1.0)),
        events
            .decrement_clicked
            .stream()
            .map(|_| Update::new(|amount: f64| (amount - 1.0).max(0.0))),
    ]);

    let initial_currency = config.initial_currency.clone();
    let update_currency = Stream::merge([
        events
            .currency_changed
            .stream()
            .map(|code: &String| Update::replace(code.clone())),
        events
            .reset_clicked
            .stream()
            .map(move |_| Update::replace(initial_currency.clone())),
    ]);

    ConverterIntents {
        update_amount,
        update_currency,
    }
}
