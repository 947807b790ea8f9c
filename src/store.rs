use crate::convert::ConverterConfig;
use crate::intent::ConverterIntents;
use crate::lookup::RateLookup;
use crate::stream::Stream;
use futures::executor::LocalSpawner;
use futures::task::LocalSpawnExt;
use std::cell::Cell;
use std::rc::Rc;

/// A completed lookup: a rate paired with the currency it was actually
/// fetched for, which may differ from the currently selected currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub currency: String,
    pub rate: f64,
}

/// The live state slices, each a replaying stream of its current value.
pub struct ConverterModel {
    /// Folded amount slice.
    pub amount: Stream<f64>,
    /// Folded currency slice, consecutive duplicates suppressed.
    pub currency: Stream<String>,
    /// Latest fetched rate.
    pub rate: Stream<f64>,
    /// The currency the latest rate was fetched for.
    pub rate_currency: Stream<String>,
    /// True from a currency change until its lookup settles.
    pub loading: Stream<bool>,
    /// `amount * rate` over the latest of each.
    pub converted: Stream<f64>,
}

/// Fold the intent streams into live state.
///
/// Each slice seeds from its configured initial value and folds every
/// subsequent update function over the running value, re-broadcasting the
/// latest result to current and future subscribers. Every currency emission
/// spawns a rate lookup tagged with a sequence number; a completion whose
/// sequence is no longer current is discarded, so a lookup issued for a
/// superseded selection can never overwrite the rate of a later one, however
/// the completions are ordered.
///
/// A failed lookup is logged, settles the loading flag, and leaves the
/// previous rate in place.
pub fn model(
    intents: ConverterIntents,
    lookup: Rc<dyn RateLookup>,
    spawner: &LocalSpawner,
    config: &ConverterConfig,
) -> ConverterModel {
    let amount = intents
        .update_amount
        .fold(config.initial_amount, |state, update| update.apply(state));
    let currency = intents
        .update_currency
        .fold(config.initial_currency.clone(), |state, update| {
            update.apply(state)
        })
        .distinct_until_changed();

    let quotes: Stream<Quote> = Stream::new(true);
    let failures: Stream<String> = Stream::new(false);
    let sequence = Rc::new(Cell::new(0u64));

    {
        let quotes = quotes.clone();
        let failures = failures.clone();
        let sequence = Rc::clone(&sequence);
        let spawner = spawner.clone();
        currency.subscribe(move |code: &String| {
            let issued = sequence.get() + 1;
            sequence.set(issued);
            let pending = lookup.rate(code);
            let code = code.clone();
            let quotes = quotes.clone();
            let failures = failures.clone();
            let sequence = Rc::clone(&sequence);
            let task = async move {
                let result = pending.await;
                if sequence.get() != issued {
                    log::debug!("discarding superseded rate lookup for {code}");
                    return;
                }
                match result {
                    Ok(rate) => quotes.emit(Quote {
                        currency: code,
                        rate,
                    }),
                    Err(error) => {
                        log::warn!("rate lookup for {code} failed: {error}; keeping previous rate");
                        failures.emit(code);
                    }
                }
            };
            if let Err(error) = spawner.spawn_local(task) {
                log::error!("could not spawn rate lookup: {error}");
            }
        });
    }

    let rate = quotes.map(|quote| quote.rate);
    let rate_currency = quotes.map(|quote| quote.currency.clone());
    // loading subscribes to quotes after rate and rate_currency: a quote must
    // reach both before loading settles, so the rate display already holds a
    // consistent pair when the view switches branches.
    let loading = Stream::merge([
        currency.map(|_| true),
        quotes.map(|_| false),
        failures.map(|_| false),
    ]);
    let converted = Stream::combine(&amount, &rate, |amount, rate| amount * rate);

    ConverterModel {
        amount,
        currency,
        rate,
        rate_currency,
        loading,
        converted,
    }
}
