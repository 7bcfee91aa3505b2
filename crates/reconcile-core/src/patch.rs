//! Patches: the mutations the differencer emits and the applier replays.

use std::collections::BTreeMap;
use std::fmt;

use reconcile_dom::escape_text;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::node::{Address, NodeKind, NodeRef};

/// One mutation of the live document.
///
/// Target nodes belong to the old tree and are located in the live document
/// by address. Replacement and appended content belongs to the new tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<'a> {
    /// Set (or add) an attribute on `target`.
    SetAttribute {
        /// Old-tree element.
        target: NodeRef<'a>,
        /// Attribute name.
        name: &'a str,
        /// New value.
        value: &'a str,
    },
    /// Remove an attribute from `target`.
    RemoveAttribute {
        /// Old-tree element.
        target: NodeRef<'a>,
        /// Attribute name.
        name: &'a str,
    },
    /// Remove `target` and its subtree.
    RemoveNode {
        /// Old-tree node.
        target: NodeRef<'a>,
    },
    /// Swap `target` for a node built from `replacement`.
    ReplaceNode {
        /// Old-tree node.
        target: NodeRef<'a>,
        /// New-tree node to materialize.
        replacement: NodeRef<'a>,
    },
    /// Append a node built from `child` to `parent`, or to the live root when
    /// `parent` is `None`.
    AppendChild {
        /// New-tree parent, located in the live document by its address.
        parent: Option<NodeRef<'a>>,
        /// New-tree node to materialize.
        child: NodeRef<'a>,
    },
}

/// The kind of a [`Patch`], without its operands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PatchKind {
    /// [`Patch::SetAttribute`]
    SetAttribute,
    /// [`Patch::RemoveAttribute`]
    RemoveAttribute,
    /// [`Patch::RemoveNode`]
    RemoveNode,
    /// [`Patch::ReplaceNode`]
    ReplaceNode,
    /// [`Patch::AppendChild`]
    AppendChild,
}

impl<'a> Patch<'a> {
    /// The kind of this patch.
    #[must_use]
    pub const fn kind(&self) -> PatchKind {
        match self {
            Self::SetAttribute { .. } => PatchKind::SetAttribute,
            Self::RemoveAttribute { .. } => PatchKind::RemoveAttribute,
            Self::RemoveNode { .. } => PatchKind::RemoveNode,
            Self::ReplaceNode { .. } => PatchKind::ReplaceNode,
            Self::AppendChild { .. } => PatchKind::AppendChild,
        }
    }

    /// The old-tree node this patch acts on. Appends have none.
    #[must_use]
    pub const fn target(&self) -> Option<NodeRef<'a>> {
        match *self {
            Self::SetAttribute { target, .. }
            | Self::RemoveAttribute { target, .. }
            | Self::RemoveNode { target }
            | Self::ReplaceNode { target, .. } => Some(target),
            Self::AppendChild { .. } => None,
        }
    }

    /// A serializable snapshot of this patch.
    #[must_use]
    pub fn to_record(self) -> PatchRecord {
        let mut record = PatchRecord {
            kind: self.kind(),
            target: self.target().map(NodeRef::address),
            parent: None,
            name: None,
            value: None,
            markup: None,
        };
        match self {
            Self::SetAttribute { name, value, .. } => {
                record.name = Some(name.to_string());
                record.value = Some(value.to_string());
            }
            Self::RemoveAttribute { name, .. } => record.name = Some(name.to_string()),
            Self::RemoveNode { .. } => {}
            Self::ReplaceNode { replacement, .. } => record.markup = Some(markup_of(replacement)),
            Self::AppendChild { parent, child } => {
                record.parent = parent.map(NodeRef::address);
                record.markup = Some(markup_of(child));
            }
        }
        record
    }
}

impl fmt::Display for Patch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match self {
            Self::SetAttribute {
                target,
                name,
                value,
            } => write!(f, " {target} {} {name}={value:?}", target.address()),
            Self::RemoveAttribute { target, name } => {
                write!(f, " {target} {} {name}", target.address())
            }
            Self::RemoveNode { target } => write!(f, " {target} {}", target.address()),
            Self::ReplaceNode {
                target,
                replacement,
            } => write!(f, " {target} {} -> {replacement}", target.address()),
            Self::AppendChild { parent, child } => {
                write!(f, " {child} to ")?;
                match parent {
                    Some(parent) => write!(f, "{parent} {}", parent.address()),
                    None => write!(f, "root"),
                }
            }
        }
    }
}

/// Markup that recreates `node`: the element's own source, or the text and
/// comment serialized.
fn markup_of(node: NodeRef<'_>) -> String {
    match node.kind() {
        NodeKind::Element(_) => node
            .tree()
            .outer_markup(node)
            .unwrap_or_default()
            .into_owned(),
        NodeKind::Text(value) => escape_text(value).into_owned(),
        NodeKind::Comment(value) => format!("<!--{value}-->"),
    }
}

/// A [`Patch`] detached from its trees, for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchRecord {
    /// Which mutation.
    pub kind: PatchKind,
    /// Old-tree address of the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Address>,
    /// Address of an append's parent; absent for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Address>,
    /// Attribute name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Attribute value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Markup of the replacement or appended node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
}

/// The ordered output of [`crate::diff`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchList<'a>(Vec<Patch<'a>>);

impl<'a> PatchList<'a> {
    /// Number of patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the two trees were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Patch<'a>> {
        self.0.iter()
    }

    /// The patches as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Patch<'a>] {
        &self.0
    }

    /// The kind of every patch, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<PatchKind> {
        self.0.iter().map(Patch::kind).collect()
    }

    /// Patch counts per kind.
    #[must_use]
    pub fn summary(&self) -> PatchSummary {
        PatchSummary(
            PatchKind::iter()
                .map(|kind| (kind, self.0.iter().filter(|p| p.kind() == kind).count()))
                .collect(),
        )
    }

    /// Serializable records, in order.
    #[must_use]
    pub fn records(&self) -> Vec<PatchRecord> {
        self.0.iter().copied().map(Patch::to_record).collect()
    }
}

impl<'a> From<Vec<Patch<'a>>> for PatchList<'a> {
    fn from(patches: Vec<Patch<'a>>) -> Self {
        Self(patches)
    }
}

impl<'a> FromIterator<Patch<'a>> for PatchList<'a> {
    fn from_iter<I: IntoIterator<Item = Patch<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for PatchList<'a> {
    type Item = Patch<'a>;
    type IntoIter = std::vec::IntoIter<Patch<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'l, 'a> IntoIterator for &'l PatchList<'a> {
    type Item = &'l Patch<'a>;
    type IntoIter = std::slice::Iter<'l, Patch<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// How many patches of each kind a [`PatchList`] holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSummary(BTreeMap<PatchKind, usize>);

impl PatchSummary {
    /// Count for one kind.
    #[must_use]
    pub fn count(&self, kind: PatchKind) -> usize {
        self.0.get(&kind).copied().unwrap_or_default()
    }

    /// Count over all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl fmt::Display for PatchSummary {
    /// `1 set-attribute, 2 replace-node`, or `no changes`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total() == 0 {
            return write!(f, "no changes");
        }
        let mut first = true;
        for (kind, count) in self.0.iter().filter(|&(_, &count)| count > 0) {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{count} {kind}")?;
            first = false;
        }
        Ok(())
    }
}
