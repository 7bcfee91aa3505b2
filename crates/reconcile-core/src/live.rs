//! The live document that patches are applied to.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! [`LiveDocument`] is the small slice of the DOM the applier needs. The
//! bundled [`DomTree`] implements it; any other host can too.

use std::error::Error as StdError;
use std::fmt;

use reconcile_dom::{DomError, DomTree};
use reconcile_html::parse_fragment_into;

use crate::error::AddressOutOfRange;
use crate::node::{NodeKind, NodeRef, Tree};

/// A mutable document tree addressed through copyable node handles.
pub trait LiveDocument {
    /// Handle to a live node.
    type Node: Copy + Eq + fmt::Debug;
    /// What a rejected mutation reports.
    type Error: StdError + Send + Sync + 'static;

    /// "The children of a node", in order.
    fn child_nodes(&self, node: Self::Node) -> &[Self::Node];

    /// [createElement](https://dom.spec.whatwg.org/#dom-document-createelement)
    fn create_element(&mut self, name: &str) -> Self::Node;

    /// [createTextNode](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    fn create_text_node(&mut self, data: &str) -> Self::Node;

    /// [createComment](https://dom.spec.whatwg.org/#dom-document-createcomment)
    fn create_comment(&mut self, data: &str) -> Self::Node;

    /// [appendChild](https://dom.spec.whatwg.org/#dom-node-appendchild)
    ///
    /// # Errors
    ///
    /// Whatever the host rejects.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error>;

    /// [replaceChild](https://dom.spec.whatwg.org/#dom-node-replacechild)
    ///
    /// # Errors
    ///
    /// Fails if `old_child` is not a child of `parent`.
    fn replace_child(
        &mut self,
        parent: Self::Node,
        new_child: Self::Node,
        old_child: Self::Node,
    ) -> Result<(), Self::Error>;

    /// [removeChild](https://dom.spec.whatwg.org/#dom-node-removechild)
    ///
    /// # Errors
    ///
    /// Fails if `child` is not a child of `parent`.
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error>;

    /// [setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// # Errors
    ///
    /// Fails if `element` is not an element.
    fn set_attribute(
        &mut self,
        element: Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// [removeAttribute](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    ///
    /// # Errors
    ///
    /// Fails if `element` is not an element.
    fn remove_attribute(&mut self, element: Self::Node, name: &str) -> Result<(), Self::Error>;

    /// [`innerHTML` setter](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-innerhtml)
    ///
    /// Replace the children of `element` with the nodes parsed from `markup`.
    ///
    /// # Errors
    ///
    /// Fails if `element` is not an element.
    fn set_inner_markup(&mut self, element: Self::Node, markup: &str) -> Result<(), Self::Error>;
}

impl LiveDocument for DomTree {
    type Node = reconcile_dom::NodeId;
    type Error = DomError;

    fn child_nodes(&self, node: Self::Node) -> &[Self::Node] {
        self.children(node)
    }

    fn create_element(&mut self, name: &str) -> Self::Node {
        Self::create_element(self, name)
    }

    fn create_text_node(&mut self, data: &str) -> Self::Node {
        Self::create_text_node(self, data)
    }

    fn create_comment(&mut self, data: &str) -> Self::Node {
        Self::create_comment(self, data)
    }

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), DomError> {
        Self::append_child(self, parent, child)
    }

    fn replace_child(
        &mut self,
        parent: Self::Node,
        new_child: Self::Node,
        old_child: Self::Node,
    ) -> Result<(), DomError> {
        Self::replace_child(self, parent, new_child, old_child)
    }

    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), DomError> {
        Self::remove_child(self, parent, child)
    }

    fn set_attribute(&mut self, element: Self::Node, name: &str, value: &str) -> Result<(), DomError> {
        Self::set_attribute(self, element, name, value)
    }

    fn remove_attribute(&mut self, element: Self::Node, name: &str) -> Result<(), DomError> {
        Self::remove_attribute(self, element, name)
    }

    /// "Let fragment be the result of invoking the fragment parsing algorithm
    /// ... Replace all with fragment within this."
    fn set_inner_markup(&mut self, element: Self::Node, markup: &str) -> Result<(), DomError> {
        if self.as_element(element).is_none() {
            return Err(DomError::NotAnElement(element));
        }
        self.clear_children(element)?;
        // Recoveries are already reported through warn_once.
        let _ = parse_fragment_into(self, element, markup)?;
        Ok(())
    }
}

impl NodeRef<'_> {
    /// Walk `root.children[address[0]].children[address[1]]...` in `document`.
    ///
    /// # Errors
    ///
    /// Fails as soon as an index is past the live sibling count.
    pub fn locate_in_live_tree<D: LiveDocument>(
        self,
        document: &D,
        root: D::Node,
    ) -> Result<D::Node, AddressOutOfRange> {
        let address = self.address();
        let mut current = root;
        for (depth, index) in address.iter().enumerate() {
            let children = document.child_nodes(current);
            let Some(&child) = children.get(index) else {
                return Err(AddressOutOfRange {
                    depth,
                    index,
                    len: children.len(),
                    address: address.clone(),
                });
            };
            current = child;
        }
        Ok(current)
    }
}

/// Build a live node from a parsed one.
///
/// Elements get their attributes and then their children through
/// [`LiveDocument::set_inner_markup`] with the decoded inner markup.
pub(crate) fn materialize<D: LiveDocument>(
    node: NodeRef<'_>,
    document: &mut D,
) -> Result<D::Node, D::Error> {
    match node.kind() {
        NodeKind::Element(element) => {
            let live = document.create_element(&element.name);
            for attr in &element.attributes {
                document.set_attribute(live, &attr.name, &attr.value)?;
            }
            document.set_inner_markup(live, &node.decoded_inner_markup())?;
            Ok(live)
        }
        NodeKind::Text(value) => Ok(document.create_text_node(value)),
        NodeKind::Comment(value) => Ok(document.create_comment(value)),
    }
}

/// Append a structural copy of every root of `tree` to `root`.
///
/// Unlike patch materialization this copies node by node, so the live tree
/// has exactly the parsed shape.
///
/// # Errors
///
/// Whatever the host rejects.
pub fn mirror<D: LiveDocument>(tree: &Tree, document: &mut D, root: D::Node) -> Result<(), D::Error> {
    for node in tree.roots() {
        mirror_node(node, document, root)?;
    }
    Ok(())
}

fn mirror_node<D: LiveDocument>(
    node: NodeRef<'_>,
    document: &mut D,
    parent: D::Node,
) -> Result<(), D::Error> {
    let live = match node.kind() {
        NodeKind::Element(element) => {
            let live = document.create_element(&element.name);
            for attr in &element.attributes {
                document.set_attribute(live, &attr.name, &attr.value)?;
            }
            for child in node.children() {
                mirror_node(child, document, live)?;
            }
            live
        }
        NodeKind::Text(value) => document.create_text_node(value),
        NodeKind::Comment(value) => document.create_comment(value),
    };
    document.append_child(parent, live)
}
