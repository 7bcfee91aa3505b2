//! Replaying a patch list against a live document.

use crate::error::ApplyError;
use crate::live::{LiveDocument, materialize};
use crate::node::NodeRef;
use crate::patch::{Patch, PatchList};

/// What a successful [`apply_all`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Number of patches applied.
    pub applied: usize,
}

/// Apply `patches` in order to the children of `root`.
///
/// `root` plays the role of the forest root of the old tree: address `[i]`
/// names its `i`-th child. Removing a node renumbers the old-tree siblings
/// that followed it, so later patches keep locating the right live nodes.
///
/// # Errors
///
/// Stops at the first patch whose address walks off the live tree
/// ([`ApplyError::OutOfRange`]) or whose mutation the document rejects
/// ([`ApplyError::Host`]). Patches before it stay applied.
pub fn apply_all<D: LiveDocument>(
    patches: PatchList<'_>,
    document: &mut D,
    root: D::Node,
) -> Result<ApplyReport, ApplyError> {
    let mut report = ApplyReport::default();
    for (index, patch) in patches.into_iter().enumerate() {
        apply_one(patch, document, root, index)?;
        report.applied += 1;
    }
    Ok(report)
}

fn apply_one<D: LiveDocument>(
    patch: Patch<'_>,
    document: &mut D,
    root: D::Node,
    index: usize,
) -> Result<(), ApplyError> {
    match patch {
        Patch::SetAttribute {
            target,
            name,
            value,
        } => {
            let live = locate(target, document, root, index)?;
            document
                .set_attribute(live, name, value)
                .map_err(ApplyError::host(index))
        }
        Patch::RemoveAttribute { target, name } => {
            let live = locate(target, document, root, index)?;
            document
                .remove_attribute(live, name)
                .map_err(ApplyError::host(index))
        }
        Patch::RemoveNode { target } => {
            let parent = locate_parent(target, document, root, index)?;
            let live = locate(target, document, root, index)?;
            document
                .remove_child(parent, live)
                .map_err(ApplyError::host(index))?;
            target.tree().shift_siblings_after(target.id());
            Ok(())
        }
        Patch::ReplaceNode {
            target,
            replacement,
        } => {
            let parent = locate_parent(target, document, root, index)?;
            let live = locate(target, document, root, index)?;
            let fresh = materialize(replacement, document).map_err(ApplyError::host(index))?;
            document
                .replace_child(parent, fresh, live)
                .map_err(ApplyError::host(index))
        }
        Patch::AppendChild { parent, child } => {
            let parent = match parent {
                Some(parent) => locate(parent, document, root, index)?,
                None => root,
            };
            let fresh = materialize(child, document).map_err(ApplyError::host(index))?;
            document
                .append_child(parent, fresh)
                .map_err(ApplyError::host(index))
        }
    }
}

fn locate<D: LiveDocument>(
    node: NodeRef<'_>,
    document: &D,
    root: D::Node,
    index: usize,
) -> Result<D::Node, ApplyError> {
    node.locate_in_live_tree(document, root)
        .map_err(|err| err.at_patch(index))
}

/// The live parent of `node`, or `root` for a root-level node.
fn locate_parent<D: LiveDocument>(
    node: NodeRef<'_>,
    document: &D,
    root: D::Node,
    index: usize,
) -> Result<D::Node, ApplyError> {
    node.parent()
        .map_or(Ok(root), |parent| locate(parent, document, root, index))
}
