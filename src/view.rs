use crate::bus::Binding;
use crate::stream::{Stream, Subscription};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// An immutable view-tree snapshot node: the declarative description of one
/// piece of the desired rendered surface at an instant.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Text(String),
    Element(VElement),
}

impl VNode {
    /// A text node.
    pub fn text(content: impl Into<String>) -> VNode {
        VNode::Text(content.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(content) => Some(content),
            VNode::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Element(element) => Some(element),
            VNode::Text(_) => None,
        }
    }
}

/// An element node: tag, attributes, event-sink bindings, ordered children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VElement {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub bindings: Vec<Binding>,
    pub children: Vec<VNode>,
}

impl VElement {
    pub fn new(tag: impl Into<String>) -> VElement {
        VElement {
            tag: tag.into(),
            ..VElement::default()
        }
    }

    /// Set an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Attach an event-sink binding.
    pub fn on(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<VElement> for VNode {
    fn from(element: VElement) -> VNode {
        VNode::Element(element)
    }
}

impl From<&str> for VNode {
    fn from(content: &str) -> VNode {
        VNode::Text(content.to_string())
    }
}

impl fmt::Display for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VNode::Text(content) => f.write_str(content),
            VNode::Element(element) => {
                write!(f, "<{}", element.tag)?;
                for (name, value) in &element.attrs {
                    write!(f, " {name}=\"{value}\"")?;
                }
                f.write_str(">")?;
                for child in &element.children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{}>", element.tag)
            }
        }
    }
}

/// A declared container child: either a plain node, available immediately,
/// or a nested live stream of nodes.
///
/// The explicit sum lets [`container`] consume both shapes uniformly instead
/// of guessing at runtime.
#[derive(Clone)]
pub enum Child {
    Node(VNode),
    Stream(Stream<VNode>),
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Child {
        Child::Node(node)
    }
}

impl From<VElement> for Child {
    fn from(element: VElement) -> Child {
        Child::Node(VNode::Element(element))
    }
}

impl From<&str> for Child {
    fn from(content: &str) -> Child {
        Child::Node(VNode::text(content))
    }
}

impl From<String> for Child {
    fn from(content: String) -> Child {
        Child::Node(VNode::Text(content))
    }
}

impl From<Stream<VNode>> for Child {
    fn from(stream: Stream<VNode>) -> Child {
        Child::Stream(stream)
    }
}

/// Build a live container from a template element and declared children.
///
/// The container waits until every child stream has produced at least one
/// value, then emits a snapshot combining the latest of each child, and
/// re-emits whenever any child updates. Plain children count as immediately
/// available.
///
/// A container with zero declared children emits a single empty-children
/// snapshot right away — combining zero streams naively would never produce
/// a value, so the asymmetry is special-cased here.
///
/// ```
/// use foldview::{container, VElement};
///
/// let empty = container(VElement::new("div"), Vec::new());
/// let seen = std::rc::Rc::new(std::cell::Cell::new(0));
/// let tap = std::rc::Rc::clone(&seen);
/// empty.subscribe(move |_| tap.set(tap.get() + 1));
/// assert_eq!(seen.get(), 1);
/// ```
pub fn container(template: VElement, children: Vec<Child>) -> Stream<VNode> {
    let out = Stream::new(true);
    let slots: Rc<RefCell<Vec<Option<VNode>>>> = Rc::new(RefCell::new(vec![None; children.len()]));

    // Clones of this closure share the slot vector; captures are all cheap
    // handle clones.
    let emit_latest = {
        let target = out.clone();
        let slots = Rc::clone(&slots);
        move || {
            let snapshot = {
                let slots = slots.borrow();
                if slots.iter().any(|slot| slot.is_none()) {
                    return;
                }
                let mut element = template.clone();
                element.children = slots.iter().cloned().flatten().collect();
                VNode::Element(element)
            };
            target.emit(snapshot);
        }
    };

    // Plain children fill their slots first, so a replaying stream child can
    // complete the snapshot the moment it is wired below.
    for (index, child) in children.iter().enumerate() {
        if let Child::Node(node) = child {
            slots.borrow_mut()[index] = Some(node.clone());
        }
    }

    let mut has_stream = false;
    for (index, child) in children.into_iter().enumerate() {
        if let Child::Stream(stream) = child {
            has_stream = true;
            let slots = Rc::clone(&slots);
            let emit_latest = emit_latest.clone();
            stream.subscribe(move |node| {
                slots.borrow_mut()[index] = Some(node.clone());
                emit_latest();
            });
        }
    }

    // No stream children (zero children included): nothing will ever call
    // emit_latest, so the single snapshot is produced here.
    if !has_stream {
        emit_latest();
    }

    out
}

/// Route between view branches based on a selector stream.
///
/// On every selector emission, `f` picks the branch: a plain node is emitted
/// directly; a stream branch is followed until the next selection, then
/// unsubscribed so a superseded branch can no longer write to the output.
pub fn switch<T: Clone + 'static>(
    selector: &Stream<T>,
    f: impl Fn(&T) -> Child + 'static,
) -> Stream<VNode> {
    let out = Stream::new(true);
    let active: Rc<RefCell<Option<(Stream<VNode>, Subscription)>>> = Rc::new(RefCell::new(None));
    let target = out.clone();
    selector.subscribe(move |value| {
        if let Some((stream, subscription)) = active.borrow_mut().take() {
            stream.unsubscribe(subscription);
        }
        match f(value) {
            Child::Node(node) => target.emit(node),
            Child::Stream(stream) => {
                let forward = target.clone();
                let subscription = stream.subscribe(move |node| forward.emit(node.clone()));
                *active.borrow_mut() = Some((stream, subscription));
            }
        }
    });
    out
}
