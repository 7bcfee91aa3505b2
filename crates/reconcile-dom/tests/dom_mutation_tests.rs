//! Tests for DOM tree mutation methods: remove_child, replace_child,
//! attribute edits and serialization.

use reconcile_dom::{DomError, DomTree, NodeId};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.create_element(tag)
}

/// Helper to build `<div>` under the document with children a, b, c.
fn div_with_three(tree: &mut DomTree) -> (NodeId, NodeId, NodeId, NodeId) {
    let parent = alloc_element(tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();
    let a = alloc_element(tree, "a");
    let b = alloc_element(tree, "b");
    let c = alloc_element(tree, "c");
    tree.append_child(parent, a).unwrap();
    tree.append_child(parent, b).unwrap();
    tree.append_child(parent, c).unwrap();
    (parent, a, b, c)
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child).unwrap();

    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child).unwrap();

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_first_of_three() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = div_with_three(&mut tree);

    tree.remove_child(parent, a).unwrap();

    // b is now first child, c is second
    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = div_with_three(&mut tree);

    tree.remove_child(parent, b).unwrap();

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_last_of_three() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = div_with_three(&mut tree);

    tree.remove_child(parent, c).unwrap();

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_remove_child_not_a_child() {
    let mut tree = DomTree::new();
    let (parent, _, _, _) = div_with_three(&mut tree);
    let stray = alloc_element(&mut tree, "span");

    assert_eq!(
        tree.remove_child(parent, stray),
        Err(DomError::NotAChild {
            parent,
            child: stray
        })
    );
}

// ========== replace_child ==========

#[test]
fn test_replace_child_keeps_position() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = div_with_three(&mut tree);

    let x = alloc_element(&mut tree, "x");
    tree.replace_child(parent, x, b).unwrap();

    assert_eq!(tree.children(parent), &[a, x, c]);
    assert_eq!(tree.parent(x), Some(parent));
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.next_sibling(a), Some(x));
    assert_eq!(tree.prev_sibling(c), Some(x));
}

#[test]
fn test_replace_child_with_sibling_moves_it() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = div_with_three(&mut tree);

    tree.replace_child(parent, c, a).unwrap();

    assert_eq!(tree.children(parent), &[c, b]);
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.prev_sibling(c), None);
    assert_eq!(tree.next_sibling(b), None);
}

#[test]
fn test_append_ancestor_is_rejected() {
    let mut tree = DomTree::new();
    let (parent, a, _, _) = div_with_three(&mut tree);

    assert_eq!(
        tree.append_child(a, parent),
        Err(DomError::HierarchyRequest { parent: a, node: parent })
    );
}

// ========== attributes ==========

#[test]
fn test_set_attribute_preserves_order() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    tree.set_attribute(div, "id", "a").unwrap();
    tree.set_attribute(div, "class", "x").unwrap();
    tree.set_attribute(div, "id", "b").unwrap();

    let names: Vec<&str> = tree
        .as_element(div)
        .unwrap()
        .attrs
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, ["id", "class"]);
    assert_eq!(tree.as_element(div).unwrap().id(), Some("b"));
}

#[test]
fn test_remove_attribute() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    tree.set_attribute(div, "id", "a").unwrap();
    tree.remove_attribute(div, "id").unwrap();
    tree.remove_attribute(div, "missing").unwrap();

    assert!(tree.as_element(div).unwrap().attrs.is_empty());
}

#[test]
fn test_attribute_on_text_is_error() {
    let mut tree = DomTree::new();
    let text = tree.create_text_node("hi");

    assert_eq!(
        tree.set_attribute(text, "id", "a"),
        Err(DomError::NotAnElement(text))
    );
}

// ========== serialization ==========

#[test]
fn test_inner_html_escapes_text_and_attributes() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, p).unwrap();
    tree.set_attribute(p, "title", "a \"b\" & c").unwrap();
    let text = tree.create_text_node("1 < 2 & 3");
    tree.append_child(p, text).unwrap();
    let br = alloc_element(&mut tree, "br");
    tree.append_child(p, br).unwrap();
    let comment = tree.create_comment(" note ");
    tree.append_child(p, comment).unwrap();

    assert_eq!(
        tree.inner_html(NodeId::ROOT),
        "<p title=\"a &quot;b&quot; &amp; c\">1 &lt; 2 &amp; 3<br><!-- note --></p>"
    );
}

#[test]
fn test_raw_text_is_not_escaped() {
    let mut tree = DomTree::new();
    let script = alloc_element(&mut tree, "script");
    tree.append_child(NodeId::ROOT, script).unwrap();
    let code = tree.create_text_node("if (a < b) {}");
    tree.append_child(script, code).unwrap();

    assert_eq!(tree.outer_html(script), "<script>if (a < b) {}</script>");
}

#[test]
fn test_clear_children_detaches_all() {
    let mut tree = DomTree::new();
    let (parent, a, b, c) = div_with_three(&mut tree);

    tree.clear_children(parent).unwrap();

    assert!(tree.children(parent).is_empty());
    for id in [a, b, c] {
        assert_eq!(tree.parent(id), None);
        assert_eq!(tree.next_sibling(id), None);
    }
}
