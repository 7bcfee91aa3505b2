//! The parsed node model.
//!
//! A [`Tree`] owns its source markup and an arena of nodes. Nodes are exposed
//! as [`NodeRef`] views, which is also what patches hold on to: a patch never
//! owns the nodes it talks about.

use std::borrow::Cow;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

use reconcile_html::{Attribute, unescape};
use serde::Serialize;

/// Index of a node in its [`Tree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Byte offsets of an element in the source markup.
///
/// For `<p>text</p>`: `start` is the `<` of `<p>`, `inner_start` is just past
/// `<p>`, `inner_end` is the `<` of `</p>`, and `end` is just past `</p>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceSpan {
    /// Offset of the opening tag's `<`.
    pub start: usize,
    /// Offset just past the opening tag.
    pub inner_start: usize,
    /// Offset just past the closing tag. Self-closing and void elements end
    /// where their tag ends. `None` while the element is open.
    pub end: Option<usize>,
    /// Offset of the closing tag's `<`. Stays `None` for elements without
    /// a closing tag.
    pub inner_end: Option<usize>,
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    /// Attributes in source order, first occurrence of each name only.
    pub attributes: Vec<Attribute>,
    /// Written as `<x/>` or a void element: it has no children and no inner markup.
    pub self_closing: bool,
    /// Where the element sits in the source.
    pub span: SourceSpan,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with attributes and children.
    Element(Element),
    /// Decoded character data.
    Text(String),
    /// Raw comment body.
    Comment(String),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Sibling index at each depth. Cells so that patch application can keep
    /// the old tree's addresses in step with the live tree.
    pub(crate) address: Box<[Cell<usize>]>,
}

/// A positional address: the sibling index at each depth, from the roots down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Address(Vec<usize>);

impl Address {
    /// Depth of the addressed node; roots are at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Index among siblings.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Address of the parent, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.0.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self(rest.to_vec())),
            _ => None,
        }
    }

    /// The indices as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Iterate over the indices, outermost first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<usize>> for Address {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

/// A parsed fragment: the source markup plus the forest built from it.
///
/// Immutable after construction, except for the address bookkeeping done by
/// [`crate::apply_all`] when it removes nodes.
#[derive(Debug, Clone)]
pub struct Tree {
    source: Vec<u8>,
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
}

impl Tree {
    pub(crate) const fn from_parts(source: Vec<u8>, nodes: Vec<NodeData>, roots: Vec<NodeId>) -> Self {
        Self {
            source,
            nodes,
            roots,
        }
    }

    /// Parse markup held in a string.
    ///
    /// # Errors
    ///
    /// See [`crate::parse`].
    pub fn parse_str(markup: &str) -> Result<Self, crate::ParseError> {
        crate::parse(markup.as_bytes())
    }

    /// The raw bytes the tree was built from. Every span offsets into these.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Total number of nodes at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for a tree built from markup with no nodes (e.g. only a DOCTYPE).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root-level nodes, in order.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
        self.roots.iter().map(move |&id| NodeRef { tree: self, id })
    }

    /// Number of root-level nodes.
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Look up a node by arena id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Walk `roots[address[0]].children[address[1]]...` within this tree.
    #[must_use]
    pub fn at(&self, address: &[usize]) -> Option<NodeRef<'_>> {
        let (&first, rest) = address.split_first()?;
        let mut id = *self.roots.get(first)?;
        for &index in rest {
            id = *self.data(id).children.get(index)?;
        }
        Some(NodeRef { tree: self, id })
    }

    /// The raw source of an element, from its `<` to just past its closing
    /// tag, with invalid UTF-8 replaced. `None` for text, comments and
    /// elements that were never closed.
    #[must_use]
    pub fn outer_markup(&self, node: NodeRef<'_>) -> Option<Cow<'_, str>> {
        let span = node.span()?;
        self.source
            .get(span.start..span.end?)
            .map(String::from_utf8_lossy)
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// After `node` has been removed from the live tree, decrement the last
    /// address component of every sibling that followed it so that their
    /// addresses match live positions again. Only that one sibling list is
    /// touched; descendants keep their addresses.
    pub(crate) fn shift_siblings_after(&self, node: NodeId) {
        let siblings = match self.data(node).parent {
            Some(parent) => self.data(parent).children.as_slice(),
            None => self.roots.as_slice(),
        };
        let Some(position) = siblings.iter().position(|&id| id == node) else {
            return;
        };
        for &sibling in &siblings[position + 1..] {
            if let Some(last) = self.data(sibling).address.last() {
                last.set(last.get().saturating_sub(1));
            }
        }
    }
}

impl fmt::Display for Tree {
    /// One line per node, indented by depth, with its address and span.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(f: &mut fmt::Formatter<'_>, node: NodeRef<'_>) -> fmt::Result {
            let indent = "  ".repeat(node.address().depth());
            write!(f, "{indent}{node} {}", node.address())?;
            if let Some(span) = node.span() {
                write!(f, " @{}", span.start)?;
                if let Some(end) = span.end {
                    write!(f, "..{end}")?;
                }
            }
            writeln!(f)?;
            for child in node.children() {
                write_node(f, child)?;
            }
            Ok(())
        }

        for root in self.roots() {
            write_node(f, root)?;
        }
        Ok(())
    }
}

/// A read-only view of one node in a [`Tree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(self) -> &'a NodeData {
        self.tree.data(self.id)
    }

    /// The tree this node belongs to.
    #[must_use]
    pub const fn tree(self) -> &'a Tree {
        self.tree
    }

    /// Arena id of this node.
    #[must_use]
    pub const fn id(self) -> NodeId {
        self.id
    }

    /// The node's payload.
    #[must_use]
    pub fn kind(self) -> &'a NodeKind {
        &self.data().kind
    }

    /// Element payload, if this is an element.
    #[must_use]
    pub fn as_element(self) -> Option<&'a Element> {
        match self.kind() {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) | NodeKind::Comment(_) => None,
        }
    }

    /// Tag name of an element.
    #[must_use]
    pub fn name(self) -> Option<&'a str> {
        self.as_element().map(|element| element.name.as_str())
    }

    /// Character data of a text or comment node.
    #[must_use]
    pub fn value(self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Text(value) | NodeKind::Comment(value) => Some(value),
            NodeKind::Element(_) => None,
        }
    }

    /// Attributes of an element in source order; empty for other kinds.
    #[must_use]
    pub fn attributes(self) -> &'a [Attribute] {
        self.as_element()
            .map_or(&[], |element| element.attributes.as_slice())
    }

    /// Source span of an element.
    #[must_use]
    pub fn span(self) -> Option<SourceSpan> {
        self.as_element().map(|element| element.span)
    }

    /// Owning element, `None` at root level.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.data().parent.map(|id| Self {
            tree: self.tree,
            id,
        })
    }

    /// Children in order.
    pub fn children(self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(self) -> usize {
        self.data().children.len()
    }

    /// Current positional address.
    #[must_use]
    pub fn address(self) -> Address {
        Address(self.data().address.iter().map(Cell::get).collect())
    }

    /// Shallow equality.
    ///
    /// Text and comments are equal when their values are identical. Elements
    /// are equal when tag names match and attribute lists are identical in
    /// content and order. Different kinds are never equal. Children are not
    /// looked at.
    #[must_use]
    pub fn equals(self, other: NodeRef<'_>) -> bool {
        match (self.kind(), other.kind()) {
            (NodeKind::Text(a), NodeKind::Text(b)) | (NodeKind::Comment(a), NodeKind::Comment(b)) => {
                a == b
            }
            (NodeKind::Element(a), NodeKind::Element(b)) => {
                a.name == b.name && a.attributes == b.attributes
            }
            _ => false,
        }
    }

    /// Attribute name to value, or `None` for text and comments.
    #[must_use]
    pub fn attributes_map(self) -> Option<HashMap<&'a str, &'a str>> {
        self.as_element().map(|element| {
            element
                .attributes
                .iter()
                .map(|attr| (attr.name.as_str(), attr.value.as_str()))
                .collect()
        })
    }

    /// The entity-decoded source between an element's tags.
    ///
    /// Empty for self-closing and unclosed elements, text and comments.
    /// Invalid UTF-8 in the source is replaced before decoding.
    #[must_use]
    pub fn decoded_inner_markup(self) -> Cow<'a, str> {
        let Some(element) = self.as_element() else {
            return Cow::Borrowed("");
        };
        if element.self_closing {
            return Cow::Borrowed("");
        }
        let span = element.span;
        span.inner_end
            .and_then(|inner_end| self.tree.source.get(span.inner_start..inner_end))
            .map_or(Cow::Borrowed(""), |raw| match String::from_utf8_lossy(raw) {
                Cow::Borrowed(text) => unescape(text),
                Cow::Owned(text) => Cow::Owned(unescape(&text).into_owned()),
            })
    }
}

impl PartialEq for NodeRef<'_> {
    /// Identity: the same node of the same tree.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} {}", self.address())
    }
}

impl fmt::Display for NodeRef<'_> {
    /// `<li>`, `#text "2"`, `#comment " x "`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Element(element) => write!(f, "<{}>", element.name),
            NodeKind::Text(value) => write!(f, "#text {value:?}"),
            NodeKind::Comment(value) => write!(f, "#comment {value:?}"),
        }
    }
}
