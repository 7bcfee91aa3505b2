//! Property tests: idempotence, diff-then-apply convergence and sibling
//! renumbering, over generated well-formed fragments.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use reconcile_core::{Patch, PatchList, Tree, apply_all, diff, mirror};
use reconcile_dom::{DomTree, NodeId};

const TAGS: &[&str] = &["div", "p", "span", "ul", "li", "b"];
const TEXTS: &[&str] = &["a", "b", "x y", " "];
const ATTRIBUTES: &[&str] = &["", r#" class="c1""#, r#" class="c2""#, r#" id="i""#];

/// A well-formed fragment made of a handful of tags, at most one attribute
/// per element, plain text, comments and `<br>`.
#[derive(Debug, Clone)]
struct Fragment(String);

impl Arbitrary for Fragment {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut out = String::new();
        push_nodes(g, 3, &mut out);
        Self(out)
    }
}

fn pick<'a>(g: &mut Gen, options: &[&'a str]) -> &'a str {
    g.choose(options).copied().unwrap_or_default()
}

fn push_nodes(g: &mut Gen, depth: usize, out: &mut String) {
    for _ in 0..usize::arbitrary(g) % 4 {
        push_node(g, depth, out);
    }
}

fn push_node(g: &mut Gen, depth: usize, out: &mut String) {
    match u8::arbitrary(g) % 6 {
        0 => out.push_str(pick(g, TEXTS)),
        1 => {
            out.push_str("<!--");
            out.push_str(pick(g, TEXTS));
            out.push_str("-->");
        }
        2 => out.push_str("<br>"),
        _ if depth > 0 => {
            let tag = pick(g, TAGS);
            out.push('<');
            out.push_str(tag);
            out.push_str(pick(g, ATTRIBUTES));
            out.push('>');
            push_nodes(g, depth - 1, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        _ => out.push_str(pick(g, TEXTS)),
    }
}

/// Helper to parse markup that is known to be well formed.
fn tree(markup: &str) -> Tree {
    Tree::parse_str(markup).expect("generated markup should parse")
}

/// Helper to build a live document mirroring `tree`.
fn live(tree: &Tree) -> DomTree {
    let mut document = DomTree::new();
    mirror(tree, &mut document, NodeId::ROOT).expect("mirror should succeed");
    document
}

#[quickcheck]
fn prop_diff_of_a_tree_with_itself_is_empty(fragment: Fragment) -> bool {
    let (a, b) = (tree(&fragment.0), tree(&fragment.0));
    diff(&a, &b).is_empty()
}

#[quickcheck]
fn prop_any_parseable_input_is_idempotent(input: String) -> bool {
    match (Tree::parse_str(&input), Tree::parse_str(&input)) {
        (Ok(a), Ok(b)) => diff(&a, &b).is_empty(),
        _ => true,
    }
}

#[quickcheck]
fn prop_applying_the_diff_converges(old: Fragment, new: Fragment) -> bool {
    let (old_tree, new_tree) = (tree(&old.0), tree(&new.0));
    let mut document = live(&old_tree);

    let patches = diff(&old_tree, &new_tree);
    let count = patches.len();
    let Ok(report) = apply_all(patches, &mut document, NodeId::ROOT) else {
        return false;
    };

    report.applied == count
        && document.inner_html(NodeId::ROOT) == live(&new_tree).inner_html(NodeId::ROOT)
}

#[quickcheck]
fn prop_removal_shifts_only_later_siblings(len: u8, removed: u8) -> bool {
    let len = usize::from(len % 8) + 1;
    let removed = usize::from(removed) % len;
    let markup: String = (0..len).map(|i| format!("<li>{i}<b></b></li>")).collect();
    let old = tree(&format!("<ul>{markup}</ul>"));
    let mut document = live(&old);

    let target = old.at(&[0, removed]).expect("sibling exists");
    let patches = PatchList::from(vec![Patch::RemoveNode { target }]);
    if apply_all(patches, &mut document, NodeId::ROOT).is_err() {
        return false;
    }

    let siblings_ok = (0..len).filter(|&i| i != removed).all(|i| {
        let expected = if i > removed { i - 1 } else { i };
        old.at(&[0, i])
            .is_some_and(|li| li.address().as_slice() == [0, expected])
    });
    // descendants keep their parse-time addresses
    let descendants_ok = (0..len).all(|i| {
        old.at(&[0, i, 1])
            .is_some_and(|b| b.address().as_slice() == [0, i, 1])
    });
    let live_ok = document.children(document.children(NodeId::ROOT)[0]).len() == len - 1;

    siblings_ok && descendants_ok && live_ok
}
