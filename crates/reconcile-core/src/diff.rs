//! Positional differencing.
//!
//! Siblings are matched by index only. An insertion or removal in the middle
//! of a sibling list therefore shows up as a run of replacements followed by
//! an append or removal at the end.

use crate::node::{NodeKind, NodeRef, Tree};
use crate::patch::{Patch, PatchList};

/// Compute the patches that turn `old` into `new`.
///
/// Patches are ordered so that they can be applied one after the other to a
/// live document that mirrors `old`.
#[must_use]
pub fn diff<'a>(old: &'a Tree, new: &'a Tree) -> PatchList<'a> {
    let old_roots: Vec<_> = old.roots().collect();
    let new_roots: Vec<_> = new.roots().collect();
    let mut patches = Vec::new();
    diff_children(&old_roots, &new_roots, &mut patches);
    PatchList::from(patches)
}

fn diff_children<'a>(old: &[NodeRef<'a>], new: &[NodeRef<'a>], patches: &mut Vec<Patch<'a>>) {
    let common = old.len().min(new.len());

    if new.len() > old.len() {
        patches.extend(new[common..].iter().map(|&child| Patch::AppendChild {
            parent: child.parent(),
            child,
        }));
    } else if old.len() > new.len() {
        patches.extend(
            old[common..]
                .iter()
                .map(|&target| Patch::RemoveNode { target }),
        );
    }

    for (&old_node, &new_node) in old[..common].iter().zip(&new[..common]) {
        match (old_node.kind(), new_node.kind()) {
            // Same tag: the element stays, only its attributes and children
            // may change.
            (NodeKind::Element(a), NodeKind::Element(b)) if a.name == b.name => {
                if !old_node.equals(new_node) {
                    diff_attributes(old_node, new_node, patches);
                }
                let old_children: Vec<_> = old_node.children().collect();
                let new_children: Vec<_> = new_node.children().collect();
                diff_children(&old_children, &new_children, patches);
            }
            _ if old_node.equals(new_node) => {}
            _ => patches.push(Patch::ReplaceNode {
                target: old_node,
                replacement: new_node,
            }),
        }
    }
}

/// Removals in old attribute order, then additions and changes in new order.
fn diff_attributes<'a>(old: NodeRef<'a>, new: NodeRef<'a>, patches: &mut Vec<Patch<'a>>) {
    let (Some(old_attrs), Some(new_attrs)) = (old.attributes_map(), new.attributes_map()) else {
        return;
    };

    for attr in old.attributes() {
        if !new_attrs.contains_key(attr.name.as_str()) {
            patches.push(Patch::RemoveAttribute {
                target: old,
                name: &attr.name,
            });
        }
    }
    for attr in new.attributes() {
        if old_attrs.get(attr.name.as_str()) != Some(&attr.value.as_str()) {
            patches.push(Patch::SetAttribute {
                target: old,
                name: &attr.name,
                value: &attr.value,
            });
        }
    }
}
