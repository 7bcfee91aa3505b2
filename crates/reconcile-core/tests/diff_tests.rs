//! Integration tests for the positional differencer.

use reconcile_core::{Patch, PatchKind, Tree, diff};

/// Helper to parse markup that is known to be well formed.
fn tree(markup: &str) -> Tree {
    Tree::parse_str(markup).expect("markup should parse")
}

/// Helper to diff two snapshots and render every patch.
fn rendered(old: &str, new: &str) -> Vec<String> {
    let (old, new) = (tree(old), tree(new));
    diff(&old, &new).iter().map(ToString::to_string).collect()
}

#[test]
fn test_identical_trees_produce_no_patches() {
    let markup = r#"<div id="a"><p>Hi <b>there</b></p><!-- c --><br></div>tail"#;
    let (old, new) = (tree(markup), tree(markup));
    let patches = diff(&old, &new);
    assert!(patches.is_empty());
    assert_eq!(patches.summary().to_string(), "no changes");
}

#[test]
fn test_text_change_replaces_the_text_node() {
    let (old, new) = (tree("<div><p>Hi</p></div>"), tree("<div><p>Bye</p></div>"));
    let patches = diff(&old, &new);

    assert_eq!(patches.len(), 1);
    match patches.as_slice()[0] {
        Patch::ReplaceNode {
            target,
            replacement,
        } => {
            assert_eq!(target.value(), Some("Hi"));
            assert_eq!(target.address().as_slice(), [0, 0, 0]);
            assert_eq!(replacement.value(), Some("Bye"));
        }
        other => panic!("Expected ReplaceNode, got {other}"),
    }
}

#[test]
fn test_attribute_change_sets_the_attribute() {
    assert_eq!(
        rendered(r#"<div id="a"></div>"#, r#"<div id="b"></div>"#),
        [r#"set-attribute <div> [0] id="b""#]
    );
}

#[test]
fn test_extra_new_children_are_appended() {
    let (old, new) = (
        tree("<ul><li>1</li></ul>"),
        tree("<ul><li>1</li><li>2</li></ul>"),
    );
    let patches = diff(&old, &new);

    assert_eq!(patches.kinds(), [PatchKind::AppendChild]);
    let Patch::AppendChild { parent, child } = patches.as_slice()[0] else {
        panic!("Expected AppendChild");
    };
    // the parent comes from the new tree
    assert!(std::ptr::eq(parent.unwrap().tree(), &new));
    assert_eq!(parent.unwrap().name(), Some("ul"));
    assert_eq!(new.outer_markup(child).as_deref(), Some("<li>2</li>"));
}

#[test]
fn test_extra_old_children_are_removed() {
    assert_eq!(
        rendered("<ul><li>1</li><li>2</li></ul>", "<ul><li>1</li></ul>"),
        ["remove-node <li> [0, 1]"]
    );
}

#[test]
fn test_trailing_removals_keep_sibling_order() {
    assert_eq!(
        rendered("<p>1</p><p>2</p><p>3</p>", "<p>1</p>"),
        ["remove-node <p> [1]", "remove-node <p> [2]"]
    );
}

#[test]
fn test_root_level_append() {
    assert_eq!(
        rendered("a", "a<!--b-->"),
        ["append-child #comment \"b\" to root"]
    );
}

#[test]
fn test_tag_name_mismatch_short_circuits() {
    let (old, new) = (
        tree("<div><p><b>x</b>y</p></div>"),
        tree("<div><span><i>z</i></span></div>"),
    );
    let patches = diff(&old, &new);

    assert_eq!(patches.kinds(), [PatchKind::ReplaceNode]);
    assert_eq!(
        patches.as_slice()[0].target().unwrap().address().as_slice(),
        [0, 0]
    );
}

#[test]
fn test_kind_mismatch_is_a_replacement() {
    assert_eq!(
        rendered("<p>x</p>", "<p><b>x</b></p>"),
        ["replace-node #text \"x\" [0, 0] -> <b>"]
    );
    assert_eq!(
        rendered("<!--a-->", "<!--b-->"),
        ["replace-node #comment \"a\" [0] -> #comment \"b\""]
    );
}

#[test]
fn test_attribute_diff_order() {
    assert_eq!(
        rendered(
            r#"<a x="1" y="2" z="3"></a>"#,
            r#"<a z="3" w="4" x="9"></a>"#
        ),
        [
            "remove-attribute <a> [0] y",
            r#"set-attribute <a> [0] w="4""#,
            r#"set-attribute <a> [0] x="9""#,
        ]
    );
}

#[test]
fn test_reordered_attributes_produce_no_patches() {
    // unequal shallowly, but no value actually changes
    assert!(rendered(r#"<a x="1" y="2"></a>"#, r#"<a y="2" x="1"></a>"#).is_empty());
}

#[test]
fn test_attribute_and_child_changes_together() {
    assert_eq!(
        rendered(r#"<p class="a">1</p>"#, r#"<p>2</p>"#),
        [
            "remove-attribute <p> [0] class",
            "replace-node #text \"1\" [0, 0] -> #text \"2\"",
        ]
    );
}

#[test]
fn test_interior_insertion_cascades() {
    let (old, new) = (
        tree("<ul><li>a</li><li>b</li></ul>"),
        tree("<ul><li>x</li><li>a</li><li>b</li></ul>"),
    );
    let patches = diff(&old, &new);

    assert_eq!(
        patches.kinds(),
        [
            PatchKind::AppendChild,
            PatchKind::ReplaceNode,
            PatchKind::ReplaceNode
        ]
    );
    let summary = patches.summary();
    assert_eq!(summary.count(PatchKind::ReplaceNode), 2);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.to_string(), "2 replace-node, 1 append-child");
}

#[test]
fn test_records_serialize_to_json() {
    let (old, new) = (
        tree("<ul><li>1</li></ul>"),
        tree("<ul><li>1</li><li>2</li></ul>"),
    );
    let json = serde_json::to_value(diff(&old, &new).records()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "kind": "append-child", "parent": [0], "markup": "<li>2</li>" }])
    );

    let (old, new) = (tree("<div><p>Hi</p></div>"), tree("<div><p>a&lt;b</p></div>"));
    let json = serde_json::to_value(diff(&old, &new).records()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "kind": "replace-node", "target": [0, 0, 0], "markup": "a&lt;b" }])
    );

    let (old, new) = (tree(r#"<i x="1"></i>"#), tree(r#"<i y="2"></i>"#));
    let json = serde_json::to_value(diff(&old, &new).records()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "kind": "remove-attribute", "target": [0], "name": "x" },
            { "kind": "set-attribute", "target": [0], "name": "y", "value": "2" },
        ])
    );
}
