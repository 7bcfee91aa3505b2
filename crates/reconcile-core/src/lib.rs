//! Positional tree reconciliation for HTML fragments.
//!
//! # Pipeline
//!
//! - **Tree building** ([`parse`]): markup bytes become a [`Tree`] whose
//!   nodes know their source span and their positional [`Address`]
//! - **Differencing** ([`diff`]): two trees are compared sibling by sibling
//!   and the differences come out as an ordered [`PatchList`]
//! - **Application** ([`apply_all`]): patches are replayed against any
//!   [`LiveDocument`], such as [`reconcile_dom::DomTree`]
//!
//! ```
//! use reconcile_core::{Tree, apply_all, diff, mirror};
//! use reconcile_dom::{DomTree, NodeId};
//!
//! let old = Tree::parse_str("<ul><li>1</li></ul>").unwrap();
//! let new = Tree::parse_str("<ul><li>1</li><li>2</li></ul>").unwrap();
//!
//! let mut live = DomTree::new();
//! mirror(&old, &mut live, NodeId::ROOT).unwrap();
//! let report = apply_all(diff(&old, &new), &mut live, NodeId::ROOT).unwrap();
//!
//! assert_eq!(report.applied, 1);
//! assert_eq!(live.inner_html(NodeId::ROOT), "<ul><li>1</li><li>2</li></ul>");
//! ```
//!
//! # Limitations
//!
//! - Siblings are matched by index: no keyed matching, no moves
//! - A failed batch is not rolled back
//! - A `<` inside a start tag's attribute value confuses start-offset
//!   recovery
//! - An element that is never closed has no inner markup, so replacing or
//!   appending it brings its tag and attributes but no children

mod apply;
mod builder;
mod diff;
mod error;
mod live;
/// Parsed trees and read-only node views.
pub mod node;
/// Patch types and their exportable records.
pub mod patch;

pub use apply::{ApplyReport, apply_all};
pub use builder::parse;
pub use diff::diff;
pub use error::{AddressOutOfRange, ApplyError, ParseError};
pub use live::{LiveDocument, mirror};
pub use node::{Address, Element, NodeId, NodeKind, NodeRef, SourceSpan, Tree};
pub use patch::{Patch, PatchKind, PatchList, PatchRecord, PatchSummary};
pub use reconcile_html::{Attribute, is_void_element};
