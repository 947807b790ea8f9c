mod common;

use foldview::{diff, dispatch, render, Patch, Sink, Surface, VElement, VNode};
use std::cell::RefCell;
use std::rc::Rc;

fn surface_of(root: VNode) -> Rc<RefCell<Surface>> {
    Rc::new(RefCell::new(Surface::new(root)))
}

fn label(text: &str) -> VNode {
    VNode::Element(VElement::new("span").child(VNode::text(text)))
}

#[test]
fn test_diff_identical_trees_is_empty() {
    let tree = label("same");
    assert!(diff(&tree, &tree).is_empty());
}

#[test]
fn test_diff_text_change() {
    let old = label("before");
    let new = label("after");
    let patches = diff(&old, &new);
    assert_eq!(
        patches,
        vec![Patch::SetText {
            path: vec![0],
            text: "after".to_string(),
        }]
    );
}

#[test]
fn test_diff_attr_add_change_remove() {
    let old = VNode::Element(VElement::new("div").attr("class", "a").attr("id", "x"));
    let new = VNode::Element(VElement::new("div").attr("class", "b").attr("title", "t"));
    let patches = diff(&old, &new);
    assert!(patches.contains(&Patch::SetAttr {
        path: vec![],
        name: "class".to_string(),
        value: "b".to_string(),
    }));
    assert!(patches.contains(&Patch::SetAttr {
        path: vec![],
        name: "title".to_string(),
        value: "t".to_string(),
    }));
    assert!(patches.contains(&Patch::RemoveAttr {
        path: vec![],
        name: "id".to_string(),
    }));
    assert_eq!(patches.len(), 3);
}

#[test]
fn test_diff_tag_change_replaces_node() {
    let old = VNode::Element(VElement::new("span"));
    let new = VNode::Element(VElement::new("div"));
    let patches = diff(&old, &new);
    assert_eq!(
        patches,
        vec![Patch::Replace {
            path: vec![],
            node: new.clone(),
        }]
    );
}

#[test]
fn test_diff_appends_and_truncates_children() {
    let old = VNode::Element(VElement::new("ul").child(VNode::text("a")));
    let grown = VNode::Element(
        VElement::new("ul")
            .child(VNode::text("a"))
            .child(VNode::text("b")),
    );
    assert_eq!(
        diff(&old, &grown),
        vec![Patch::Append {
            path: vec![],
            node: VNode::text("b"),
        }]
    );
    assert_eq!(
        diff(&grown, &old),
        vec![Patch::Truncate {
            path: vec![],
            len: 1,
        }]
    );
}

#[test]
fn test_apply_rewrites_old_into_new() {
    let old = VNode::Element(
        VElement::new("main")
            .attr("class", "x")
            .child(label("one"))
            .child(VNode::text("tail")),
    );
    let new = VNode::Element(
        VElement::new("main")
            .child(label("two"))
            .child(VNode::text("tail"))
            .child(VNode::Element(VElement::new("footer"))),
    );
    let mut surface = Surface::new(old.clone());
    surface.apply(&diff(&old, &new)).unwrap();
    assert_eq!(surface.root(), &new);
}

#[test]
fn test_apply_reports_bad_path() {
    let mut surface = Surface::new(label("x"));
    let bad = Patch::SetText {
        path: vec![7],
        text: "y".to_string(),
    };
    assert!(surface.apply(&[bad]).is_err());
}

// A failed step is isolated: the surface still accepts later patch lists.
#[test]
fn test_apply_failure_does_not_poison_surface() {
    let mut surface = Surface::new(label("x"));
    let bad = Patch::Truncate {
        path: vec![],
        len: 9,
    };
    assert!(surface.apply(&[bad]).is_err());

    let good = Patch::SetText {
        path: vec![0],
        text: "y".to_string(),
    };
    surface.apply(&[good]).unwrap();
    assert_eq!(surface.root().as_element().unwrap().children[0].as_text(), Some("y"));
}

#[test]
fn test_render_applies_snapshots_in_order() {
    let surface = surface_of(VNode::Element(VElement::new("div")));
    let trees: Sink<VNode> = Sink::new();
    render(&trees.stream(), &surface);

    trees.emit(label("first"));
    assert_eq!(
        surface.borrow().root().as_element().unwrap().tag,
        "span".to_string()
    );
    trees.emit(label("second"));
    assert_eq!(
        surface.borrow().root().as_element().unwrap().children[0].as_text(),
        Some("second")
    );
}

// The first real snapshot may be identical in shape to the initial render;
// that must produce an empty diff, not a wholesale redraw.
#[test]
fn test_render_tolerates_identical_first_snapshot() {
    let initial = label("same");
    let surface = surface_of(initial.clone());
    let trees: Sink<VNode> = Sink::new();
    render(&trees.stream(), &surface);

    trees.emit(initial);
    assert_eq!(surface.borrow().patches_applied(), 0);
}

#[test]
fn test_render_patches_incrementally() {
    let surface = surface_of(label("one"));
    let trees: Sink<VNode> = Sink::new();
    render(&trees.stream(), &surface);

    trees.emit(label("two"));
    // One text edit, not a rebuilt tree.
    assert_eq!(surface.borrow().patches_applied(), 1);
}

#[test]
fn test_dispatch_invokes_bindings_at_path() {
    let presses: Sink<()> = Sink::new();
    let seen = common::collect(&presses.stream());
    let root = VNode::Element(
        VElement::new("div").child(
            VElement::new("button")
                .on(presses.binding("click"))
                .child(VNode::text("go")),
        ),
    );
    let surface = surface_of(root);

    assert!(dispatch(&surface, &[0], "click", ""));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_dispatch_misses_return_false() {
    let surface = surface_of(label("x"));
    assert!(!dispatch(&surface, &[5], "click", ""));
    assert!(!dispatch(&surface, &[0], "click", ""));
}
