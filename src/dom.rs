use crate::bus::{Binding, DomEvent};
use crate::stream::Stream;
use crate::view::{VElement, VNode};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// One mutation of the displayed surface, addressed by a child-index path
/// from the root.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Replace { path: Vec<usize>, node: VNode },
    SetText { path: Vec<usize>, text: String },
    SetAttr { path: Vec<usize>, name: String, value: String },
    RemoveAttr { path: Vec<usize>, name: String },
    SetBindings { path: Vec<usize>, bindings: Vec<Binding> },
    Append { path: Vec<usize>, node: VNode },
    Truncate { path: Vec<usize>, len: usize },
}

/// A structural patch-application failure.
///
/// Non-fatal and isolated per patch step: the render pipeline logs it and
/// keeps processing subsequent snapshots.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch path {path:?} does not resolve to a node")]
    BadPath { path: Vec<usize> },
    #[error("expected an element at {path:?}, found a text node")]
    NotAnElement { path: Vec<usize> },
    #[error("expected a text node at {path:?}, found an element")]
    NotText { path: Vec<usize> },
}

/// Compute the structural difference between two consecutive snapshots.
///
/// Returns the minimal mutation set that rewrites `old` into `new`: nothing
/// for identical trees, attribute/text/binding edits where shapes agree, a
/// whole-node replace where they do not. Children are matched by position;
/// surplus new children are appended, surplus old children truncated.
pub fn diff(old: &VNode, new: &VNode) -> Vec<Patch> {
    let mut patches = Vec::new();
    walk(&mut patches, &mut Vec::new(), old, new);
    patches
}

fn walk(patches: &mut Vec<Patch>, path: &mut Vec<usize>, old: &VNode, new: &VNode) {
    match (old, new) {
        (VNode::Text(old_text), VNode::Text(new_text)) => {
            if old_text != new_text {
                patches.push(Patch::SetText {
                    path: path.clone(),
                    text: new_text.clone(),
                });
            }
        }
        (VNode::Element(old_el), VNode::Element(new_el)) if old_el.tag == new_el.tag => {
            for (name, value) in &new_el.attrs {
                if old_el.attrs.get(name) != Some(value) {
                    patches.push(Patch::SetAttr {
                        path: path.clone(),
                        name: name.clone(),
                        value: value.clone(),
                    });
                }
            }
            for name in old_el.attrs.keys() {
                if !new_el.attrs.contains_key(name) {
                    patches.push(Patch::RemoveAttr {
                        path: path.clone(),
                        name: name.clone(),
                    });
                }
            }
            if old_el.bindings != new_el.bindings {
                patches.push(Patch::SetBindings {
                    path: path.clone(),
                    bindings: new_el.bindings.clone(),
                });
            }
            let shared = old_el.children.len().min(new_el.children.len());
            for index in 0..shared {
                path.push(index);
                walk(patches, path, &old_el.children[index], &new_el.children[index]);
                path.pop();
            }
            for child in &new_el.children[shared..] {
                patches.push(Patch::Append {
                    path: path.clone(),
                    node: child.clone(),
                });
            }
            if new_el.children.len() < old_el.children.len() {
                patches.push(Patch::Truncate {
                    path: path.clone(),
                    len: new_el.children.len(),
                });
            }
        }
        _ => {
            patches.push(Patch::Replace {
                path: path.clone(),
                node: new.clone(),
            });
        }
    }
}

/// The displayed surface: the live rendered output.
///
/// The host provides the initial root at startup; after that the surface is
/// mutated only through [`apply`](Surface::apply) executing computed patches,
/// never replaced wholesale.
pub struct Surface {
    root: VNode,
    patches_applied: u64,
}

impl Surface {
    pub fn new(root: VNode) -> Surface {
        Surface {
            root,
            patches_applied: 0,
        }
    }

    pub fn root(&self) -> &VNode {
        &self.root
    }

    /// Virtualize the surface: its own tree representation, used once at
    /// startup as snapshot zero.
    pub fn to_vnode(&self) -> VNode {
        self.root.clone()
    }

    /// Running count of individual patch operations executed, across all
    /// snapshots. An unchanged snapshot leaves it untouched.
    pub fn patches_applied(&self) -> u64 {
        self.patches_applied
    }

    /// Execute a computed patch list, in order.
    ///
    /// Stops at the first failing step; operations already executed stay
    /// applied.
    pub fn apply(&mut self, patches: &[Patch]) -> Result<(), PatchError> {
        for patch in patches {
            self.apply_one(patch)?;
            self.patches_applied += 1;
        }
        Ok(())
    }

    fn apply_one(&mut self, patch: &Patch) -> Result<(), PatchError> {
        match patch {
            Patch::Replace { path, node } => {
                let target = node_at_mut(&mut self.root, path)?;
                *target = node.clone();
            }
            Patch::SetText { path, text } => match node_at_mut(&mut self.root, path)? {
                VNode::Text(content) => *content = text.clone(),
                VNode::Element(_) => return Err(PatchError::NotText { path: path.clone() }),
            },
            Patch::SetAttr { path, name, value } => {
                let element = element_at_mut(&mut self.root, path)?;
                element.attrs.insert(name.clone(), value.clone());
            }
            Patch::RemoveAttr { path, name } => {
                let element = element_at_mut(&mut self.root, path)?;
                element.attrs.remove(name);
            }
            Patch::SetBindings { path, bindings } => {
                let element = element_at_mut(&mut self.root, path)?;
                element.bindings = bindings.clone();
            }
            Patch::Append { path, node } => {
                let element = element_at_mut(&mut self.root, path)?;
                element.children.push(node.clone());
            }
            Patch::Truncate { path, len } => {
                let element = element_at_mut(&mut self.root, path)?;
                if *len > element.children.len() {
                    return Err(PatchError::BadPath { path: path.clone() });
                }
                element.children.truncate(*len);
            }
        }
        Ok(())
    }

    /// The bindings registered for `event` on the node at `path`.
    ///
    /// Returns owned clones so the caller can release its borrow of the
    /// surface before invoking any of them.
    pub fn bindings_at(&self, path: &[usize], event: &str) -> Vec<Binding> {
        let mut current = &self.root;
        for &index in path {
            match current {
                VNode::Element(element) => match element.children.get(index) {
                    Some(child) => current = child,
                    None => return Vec::new(),
                },
                VNode::Text(_) => return Vec::new(),
            }
        }
        match current {
            VNode::Element(element) => element
                .bindings
                .iter()
                .filter(|binding| binding.event() == event)
                .cloned()
                .collect(),
            VNode::Text(_) => Vec::new(),
        }
    }
}

fn node_at_mut<'a>(root: &'a mut VNode, path: &[usize]) -> Result<&'a mut VNode, PatchError> {
    let mut current = root;
    for &index in path {
        current = match current {
            VNode::Element(element) => {
                element
                    .children
                    .get_mut(index)
                    .ok_or_else(|| PatchError::BadPath {
                        path: path.to_vec(),
                    })?
            }
            VNode::Text(_) => {
                return Err(PatchError::BadPath {
                    path: path.to_vec(),
                })
            }
        };
    }
    Ok(current)
}

fn element_at_mut<'a>(root: &'a mut VNode, path: &[usize]) -> Result<&'a mut VElement, PatchError> {
    match node_at_mut(root, path)? {
        VNode::Element(element) => Ok(element),
        VNode::Text(_) => Err(PatchError::NotAnElement {
            path: path.to_vec(),
        }),
    }
}

/// Connect a snapshot stream to the displayed surface.
///
/// The surface's current tree is virtualized once as snapshot zero, then
/// every consecutive snapshot pair is diffed and the difference applied, in
/// order, never skipping a pair. The first real snapshot may be identical to
/// the initial render; that yields an empty diff. A failed application is
/// logged and the pipeline continues — the prior snapshot still advances so
/// later diffs are computed against the intended tree.
pub fn render(tree: &Stream<VNode>, surface: &Rc<RefCell<Surface>>) {
    let previous = Rc::new(RefCell::new(surface.borrow().to_vnode()));
    let surface = Rc::clone(surface);
    tree.subscribe(move |next| {
        let prior = previous.borrow().clone();
        let patches = diff(&prior, next);
        if let Err(error) = surface.borrow_mut().apply(&patches) {
            log::error!("dropping failed patch step: {error}");
        }
        *previous.borrow_mut() = next.clone();
    });
}

/// Deliver a surface event to the bindings at `path`, standing in for the
/// hosting environment's own event callbacks.
///
/// Returns whether any binding was invoked. The surface borrow is released
/// before handlers run: handlers feed the pipeline, and the reconciler may
/// need to patch this same surface within the reaction.
pub fn dispatch(surface: &Rc<RefCell<Surface>>, path: &[usize], event: &str, value: &str) -> bool {
    let bindings = surface.borrow().bindings_at(path, event);
    if bindings.is_empty() {
        return false;
    }
    let raw = DomEvent {
        value: value.to_string(),
    };
    for binding in &bindings {
        binding.call(&raw);
    }
    true
}
