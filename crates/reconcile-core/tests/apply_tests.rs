//! Integration tests for patch application against a live `DomTree`.

use reconcile_core::{ApplyError, Patch, PatchList, Tree, apply_all, diff, mirror};
use reconcile_dom::{DomError, DomTree, NodeId};

/// Helper to parse markup that is known to parse.
fn tree(markup: &str) -> Tree {
    Tree::parse_str(markup).expect("markup should parse")
}

/// Helper to build a live document mirroring `tree` under the document node.
fn live(tree: &Tree) -> DomTree {
    let mut document = DomTree::new();
    mirror(tree, &mut document, NodeId::ROOT).expect("mirror should succeed");
    document
}

/// Helper to diff two snapshots, apply the result to a mirror of the first
/// and return the live markup.
fn reconcile(old: &str, new: &str) -> String {
    let (old, new) = (tree(old), tree(new));
    let mut document = live(&old);
    let _ = apply_all(diff(&old, &new), &mut document, NodeId::ROOT).expect("patches should apply");
    document.inner_html(NodeId::ROOT)
}

#[test]
fn test_mirror_reproduces_the_markup() {
    let markup = r#"<div id="a"><p>x <b>y</b></p><!-- c --><br></div>tail"#;
    assert_eq!(live(&tree(markup)).inner_html(NodeId::ROOT), markup);
}

#[test]
fn test_text_replacement() {
    assert_eq!(
        reconcile("<div><p>Hi</p></div>", "<div><p>Bye</p></div>"),
        "<div><p>Bye</p></div>"
    );
}

#[test]
fn test_unclosed_elements_reconcile() {
    assert_eq!(reconcile("<p>para", "<p>text"), "<p>text</p>");
    assert_eq!(
        reconcile("<ul><li>1<li>2</ul>", "<ul><li>1<li>3</ul>"),
        "<ul><li>1<li>3</li></li></ul>"
    );
}

#[test]
fn test_set_and_remove_attributes() {
    assert_eq!(
        reconcile(r#"<div id="a"></div>"#, r#"<div id="b"></div>"#),
        r#"<div id="b"></div>"#
    );
    assert_eq!(
        reconcile(r#"<p class="x" id="y">1</p>"#, r#"<p id="y">1</p>"#),
        r#"<p id="y">1</p>"#
    );
}

#[test]
fn test_append_child() {
    assert_eq!(
        reconcile("<ul><li>1</li></ul>", "<ul><li>1</li><li>2</li></ul>"),
        "<ul><li>1</li><li>2</li></ul>"
    );
}

#[test]
fn test_remove_node() {
    let (old, new) = (
        tree("<ul><li>1</li><li>2</li></ul>"),
        tree("<ul><li>1</li></ul>"),
    );
    let mut document = live(&old);
    let ul = document.children(NodeId::ROOT)[0];
    let second = document.children(ul)[1];

    let report = apply_all(diff(&old, &new), &mut document, NodeId::ROOT).unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(document.children(ul).len(), 1);
    assert_eq!(document.parent(second), None);
    assert_eq!(document.inner_html(NodeId::ROOT), "<ul><li>1</li></ul>");
}

#[test]
fn test_removals_renumber_later_siblings() {
    let (old, new) = (
        tree("<ul><li>a</li><li>b</li><li>c</li></ul>"),
        tree("<ul><li>a</li></ul>"),
    );
    let c = old.at(&[0, 2]).unwrap();
    let mut document = live(&old);

    let report = apply_all(diff(&old, &new), &mut document, NodeId::ROOT).unwrap();

    assert_eq!(report.applied, 2);
    assert_eq!(document.inner_html(NodeId::ROOT), "<ul><li>a</li></ul>");
    // only the last component moved, and descendants kept theirs
    assert_eq!(c.address().as_slice(), [0, 1]);
    assert_eq!(old.at(&[0, 0]).unwrap().address().as_slice(), [0, 0]);
    assert_eq!(old.at(&[0, 2, 0]).unwrap().address().as_slice(), [0, 2, 0]);
}

#[test]
fn test_root_level_removals() {
    assert_eq!(reconcile("<p>1</p><p>2</p><p>3</p>", "<p>1</p>"), "<p>1</p>");
    assert_eq!(reconcile("a<!--b--><i></i>", ""), "");
}

#[test]
fn test_replacement_builds_the_whole_subtree() {
    assert_eq!(
        reconcile(
            "<div><p>a</p></div>",
            r#"<div><ul class="x"><li>1</li><li>2<br></li></ul></div>"#
        ),
        r#"<div><ul class="x"><li>1</li><li>2<br></li></ul></div>"#
    );
}

#[test]
fn test_replacement_text_goes_through_entity_decoding() {
    assert_eq!(
        reconcile("<div><span></span></div>", "<div><p>a &amp; b</p></div>"),
        "<div><p>a &amp; b</p></div>"
    );
}

#[test]
fn test_interior_insertion_converges() {
    assert_eq!(
        reconcile(
            "<ul><li>a</li><li>b</li></ul>",
            "<ul><li>x</li><li>a</li><li>b</li></ul>"
        ),
        "<ul><li>x</li><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn test_missing_live_node_is_out_of_range() {
    let (old, new) = (tree(r#"<div id="a"></div>"#), tree(r#"<div id="b"></div>"#));
    let mut document = DomTree::new();

    let err = apply_all(diff(&old, &new), &mut document, NodeId::ROOT).unwrap_err();

    assert!(matches!(
        err,
        ApplyError::OutOfRange {
            patch: 0,
            depth: 0,
            index: 0,
            len: 0,
            ..
        }
    ));
    assert_eq!(err.patch_index(), 0);
}

#[test]
fn test_failed_batch_keeps_earlier_patches() {
    let (old, new) = (
        tree("<div><p>1</p></div><span></span>"),
        tree(r#"<div><p>2</p></div><span x="1"></span>"#),
    );
    // the live document lacks the <span>
    let mut document = live(&tree("<div><p>1</p></div>"));

    let err = apply_all(diff(&old, &new), &mut document, NodeId::ROOT).unwrap_err();

    match err {
        ApplyError::OutOfRange {
            patch,
            address,
            depth,
            index,
            len,
        } => {
            assert_eq!(patch, 1);
            assert_eq!(address.as_slice(), [1]);
            assert_eq!((depth, index, len), (0, 1, 1));
        }
        other => panic!("Expected OutOfRange, got {other}"),
    }
    assert_eq!(document.inner_html(NodeId::ROOT), "<div><p>2</p></div>");
}

#[test]
fn test_host_rejection_is_reported() {
    let (old, new) = (tree(r#"<div id="a"></div>"#), tree(r#"<div id="b"></div>"#));
    // position [0] holds text in the live document
    let mut document = live(&tree("hello"));

    let err = apply_all(diff(&old, &new), &mut document, NodeId::ROOT).unwrap_err();

    assert_eq!(err.patch_index(), 0);
    let ApplyError::Host { source, .. } = err else {
        panic!("Expected Host error");
    };
    assert!(matches!(
        source.downcast_ref::<DomError>(),
        Some(DomError::NotAnElement(_))
    ));
}

#[test]
fn test_hand_built_patch_list() {
    let old = tree("<p>1</p><p>2</p><p>3</p>");
    let target = old.at(&[1]).unwrap();
    let patches = PatchList::from(vec![Patch::RemoveNode { target }]);
    let mut document = live(&old);

    let report = apply_all(patches, &mut document, NodeId::ROOT).unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(document.inner_html(NodeId::ROOT), "<p>1</p><p>3</p>");
    assert_eq!(old.at(&[2]).unwrap().address().as_slice(), [1]);
    assert_eq!(old.at(&[0]).unwrap().address().as_slice(), [0]);
}
