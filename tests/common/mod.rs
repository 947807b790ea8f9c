#![allow(dead_code)]

use foldview::{
    Converter, ConverterConfig, LookupError, RateFuture, RateLookup, Stream, Surface, VElement,
    VNode,
};
use futures::channel::oneshot;
use futures::FutureExt;
use std::cell::RefCell;
use std::rc::Rc;

// Node paths within the rendered widget tree.
pub const AMOUNT_INPUT: &[usize] = &[0, 0, 1];
pub const INCREMENT: &[usize] = &[0, 0, 3];
pub const DECREMENT: &[usize] = &[0, 0, 4];
pub const CURRENCY_SELECT: &[usize] = &[0, 1, 1];
pub const RATE_SPAN: &[usize] = &[0, 1, 3];
pub const CONVERTED_VALUE: &[usize] = &[1, 1];
pub const CONVERTED_CURRENCY: &[usize] = &[1, 3];
pub const RESET: &[usize] = &[2];

pub fn host_surface() -> Rc<RefCell<Surface>> {
    Rc::new(RefCell::new(Surface::new(VNode::Element(
        VElement::new("div").attr("id", "out"),
    ))))
}

/// A rate lookup whose completions the test resolves explicitly, in any
/// order — including out of issue order.
#[derive(Clone, Default)]
pub struct ManualLookup {
    pending: Rc<RefCell<Vec<(String, oneshot::Sender<Result<f64, LookupError>>)>>>,
}

impl ManualLookup {
    pub fn new() -> Self {
        ManualLookup::default()
    }

    /// Number of unresolved lookups.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Resolve the oldest outstanding lookup for `currency`.
    pub fn resolve(&self, currency: &str, rate: f64) {
        self.complete(currency, Ok(rate));
    }

    /// Fail the oldest outstanding lookup for `currency`.
    pub fn fail(&self, currency: &str, error: LookupError) {
        self.complete(currency, Err(error));
    }

    fn complete(&self, currency: &str, result: Result<f64, LookupError>) {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .position(|(code, _)| code == currency)
            .unwrap_or_else(|| panic!("no pending lookup for {currency}"));
        let (_, sender) = pending.remove(index);
        let _ = sender.send(result);
    }
}

impl RateLookup for ManualLookup {
    fn rate(&self, currency: &str) -> RateFuture {
        let (sender, receiver) = oneshot::channel();
        self.pending
            .borrow_mut()
            .push((currency.to_string(), sender));
        async move {
            match receiver.await {
                Ok(result) => result,
                Err(_) => Err(LookupError::Unavailable),
            }
        }
        .boxed_local()
    }
}

/// Mount a converter with default config over a fresh host surface.
pub fn mount_manual() -> (Converter, ManualLookup) {
    let lookup = ManualLookup::new();
    let converter = Converter::mount(
        ConverterConfig::default(),
        Rc::new(lookup.clone()),
        host_surface(),
    );
    (converter, lookup)
}

/// Mount with the initial EUR lookup resolved at `rate` and the first frame
/// rendered.
pub fn mount_ready(rate: f64) -> (Converter, ManualLookup) {
    let (mut converter, lookup) = mount_manual();
    lookup.resolve("EUR", rate);
    converter.turn();
    (converter, lookup)
}

/// Record every emission of a stream.
pub fn collect<T: Clone + 'static>(stream: &Stream<T>) -> Rc<RefCell<Vec<T>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let tap = Rc::clone(&seen);
    stream.subscribe(move |value| tap.borrow_mut().push(value.clone()));
    seen
}

/// The current value of a replaying stream, via a fresh subscription.
pub fn latest<T: Clone + 'static>(stream: &Stream<T>) -> Option<T> {
    let cell: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
    let tap = Rc::clone(&cell);
    stream.subscribe(move |value| *tap.borrow_mut() = Some(value.clone()));
    let value = cell.borrow().clone();
    value
}

/// The rendered node at `path`.
pub fn node_at(converter: &Converter, path: &[usize]) -> VNode {
    let surface = converter.surface();
    let borrowed = surface.borrow();
    let mut current = borrowed.root();
    for &index in path {
        current = &current.as_element().expect("element on path").children[index];
    }
    current.clone()
}

/// Concatenated immediate text content of the node at `path`.
pub fn text_at(converter: &Converter, path: &[usize]) -> String {
    match node_at(converter, path) {
        VNode::Text(content) => content,
        VNode::Element(element) => element
            .children
            .iter()
            .filter_map(|child| child.as_text().map(str::to_string))
            .collect(),
    }
}

/// An attribute of the element at `path`.
pub fn attr_at(converter: &Converter, path: &[usize], name: &str) -> Option<String> {
    node_at(converter, path)
        .as_element()
        .and_then(|element| element.attrs.get(name).cloned())
}

/// The currency whose `<option>` carries the selected attribute.
pub fn selected_currency(converter: &Converter) -> Option<String> {
    let select = node_at(converter, CURRENCY_SELECT);
    let select = select.as_element()?;
    select
        .children
        .iter()
        .filter_map(|child| child.as_element())
        .find(|option| option.attrs.contains_key("selected"))
        .and_then(|option| option.children.first())
        .and_then(|text| text.as_text().map(str::to_string))
}
