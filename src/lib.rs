mod bus;
pub mod convert;
mod dom;
mod intent;
mod lookup;
mod store;
mod stream;
mod view;

pub use bus::{Binding, DomEvent, Sink};
pub use convert::{Converter, ConverterConfig, ConverterEvents};
pub use dom::{diff, dispatch, render, Patch, PatchError, Surface};
pub use intent::{intents, ConverterIntents, Update};
pub use lookup::{FixedRates, LookupError, RateFuture, RateLookup};
pub use store::{model, ConverterModel, Quote};
pub use stream::{Stream, Subscription};
pub use view::{container, switch, Child, VElement, VNode};
