use crate::stream::Stream;
use std::fmt;
use std::rc::Rc;

/// A raw occurrence as delivered by the displayed surface.
///
/// `value` carries whatever the surface reports for the interaction: the new
/// text of an input, the selected option of a select, or the empty string for
/// plain presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub value: String,
}

/// A typed intake for one kind of user action.
///
/// Each sink exposes [`emit`](Sink::emit) for interface callbacks to feed
/// and a readable [`stream`](Sink::stream) of the emitted values. Sink
/// streams never replay: a subscriber only sees occurrences emitted after it
/// subscribed, which is what distinguishes raw events from derived state.
///
/// ```
/// use foldview::Sink;
///
/// let typed: Sink<String> = Sink::new();
/// let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
/// let tap = std::rc::Rc::clone(&seen);
/// typed.stream().subscribe(move |text: &String| tap.borrow_mut().push(text.clone()));
///
/// typed.emit("12".to_string());
/// assert_eq!(*seen.borrow(), vec!["12".to_string()]);
/// ```
pub struct Sink<T> {
    stream: Stream<T>,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Sink {
            stream: self.stream.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for Sink<T> {
    fn default() -> Self {
        Sink::new()
    }
}

impl<T: Clone + 'static> Sink<T> {
    pub fn new() -> Self {
        Sink {
            stream: Stream::new(false),
        }
    }

    /// Record an occurrence, notifying current subscribers synchronously in
    /// emission order.
    pub fn emit(&self, value: T) {
        self.stream.emit(value);
    }

    /// The readable side of this sink.
    pub fn stream(&self) -> Stream<T> {
        self.stream.clone()
    }

    /// Bind this sink to a surface event, adapting the raw occurrence into
    /// the sink's payload type.
    ///
    /// Bindings from the same sink for the same event name compare equal, so
    /// the reconciler can tell an unchanged binding from a rebinding without
    /// comparing closures.
    pub fn binding_with(&self, event: &str, adapt: impl Fn(&DomEvent) -> T + 'static) -> Binding {
        let stream = self.stream.clone();
        let token = self.stream.token();
        Binding {
            event: event.to_string(),
            token,
            handler: Rc::new(move |raw: &DomEvent| stream.emit(adapt(raw))),
        }
    }
}

impl Sink<String> {
    /// Bind a value-carrying surface event (input edits, select changes).
    pub fn binding(&self, event: &str) -> Binding {
        self.binding_with(event, |raw| raw.value.clone())
    }
}

impl Sink<()> {
    /// Bind a payload-free surface event (button presses).
    pub fn binding(&self, event: &str) -> Binding {
        self.binding_with(event, |_| ())
    }
}

/// An event-sink binding carried inside view-tree snapshots.
///
/// Pairs a surface event name with the sink the occurrence should be fed
/// into. The displayed surface invokes the binding when the event fires on
/// the bound node.
#[derive(Clone)]
pub struct Binding {
    event: String,
    token: usize,
    handler: Rc<dyn Fn(&DomEvent)>,
}

impl Binding {
    /// The surface event name this binding listens for.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Feed a raw occurrence through the binding into its sink.
    pub fn call(&self, raw: &DomEvent) {
        (*self.handler)(raw);
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.event == other.event && self.token == other.token
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("event", &self.event)
            .field("token", &self.token)
            .finish()
    }
}
