use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use thiserror::Error;

/// The eventual outcome of a rate lookup.
pub type RateFuture = LocalBoxFuture<'static, Result<f64, LookupError>>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("unsupported currency {0:?}")]
    UnsupportedCurrency(String),
    #[error("rate service unavailable")]
    Unavailable,
}

/// Asynchronous exchange-rate collaborator.
///
/// May be slow, may fail, and completions must not be assumed to arrive in
/// call order — the store defends against reordering. A production
/// implementation backed by a real service drops in without changing any
/// core component.
pub trait RateLookup {
    fn rate(&self, currency: &str) -> RateFuture;
}

/// Fixed-table lookup standing in for a real network call.
///
/// The returned future resolves at the first executor turn after the call,
/// which models network latency well enough for the widget: nothing observes
/// the rate within the reaction that requested it.
pub struct FixedRates {
    rates: HashMap<String, f64>,
}

impl FixedRates {
    pub fn new<S: Into<String>>(rates: impl IntoIterator<Item = (S, f64)>) -> Self {
        FixedRates {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.into(), rate))
                .collect(),
        }
    }
}

impl RateLookup for FixedRates {
    fn rate(&self, currency: &str) -> RateFuture {
        let result = self
            .rates
            .get(currency)
            .copied()
            .ok_or_else(|| LookupError::UnsupportedCurrency(currency.to_string()));
        async move { result }.boxed_local()
    }
}
