//! Offset-tracking tree construction.
//!
//! Turns the token stream into a [`Tree`]. An end tag always closes the
//! current element, whatever its name, and elements still open at the end
//! of input stay open. Both recoveries are reported through `warn_once`.

use std::cell::Cell;

use reconcile_common::warning::warn_once;
use reconcile_html::{Attribute, Token, Tokenizer, is_void_element};

use crate::error::ParseError;
use crate::node::{Element, NodeData, NodeId, NodeKind, SourceSpan, Tree};

/// One entry of the stack of open elements.
#[derive(Debug)]
struct OpenElement {
    id: NodeId,
    name: String,
    start: usize,
    inner_start: usize,
}

struct TreeBuilder<'a> {
    tokenizer: Tokenizer<'a>,
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
    stack_of_open_elements: Vec<OpenElement>,
}

/// Parse markup into a [`Tree`], recording spans and addresses.
///
/// # Errors
///
/// Returns [`ParseError::Tokenizer`] if the input ends inside a tag,
/// [`ParseError::UnexpectedEndTag`] for an end tag with no element open, and
/// the scan variants when a tag's `<` cannot be recovered.
pub fn parse(markup: &[u8]) -> Result<Tree, ParseError> {
    TreeBuilder::new(markup).run()
}

impl<'a> TreeBuilder<'a> {
    const fn new(markup: &'a [u8]) -> Self {
        Self {
            tokenizer: Tokenizer::from_bytes(markup),
            nodes: Vec::new(),
            roots: Vec::new(),
            stack_of_open_elements: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Tree, ParseError> {
        loop {
            let spanned = self.tokenizer.next_token()?;
            match spanned.token {
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                } => self.start_tag(name, self_closing, attributes, spanned.end)?,
                Token::EndTag { name } => self.end_tag(&name, spanned.end)?,
                Token::Text { data } => {
                    let _ = self.insert(NodeKind::Text(data));
                }
                Token::Comment { data } => {
                    let _ = self.insert(NodeKind::Comment(data));
                }
                Token::Doctype { .. } => {}
                Token::EndOfFile => break,
            }
        }

        // Unclosed elements keep `end` and `inner_end` unset.
        for open in self.stack_of_open_elements.drain(..).rev() {
            warn_once(
                "Tree Builder",
                &format!("<{}> opened at byte {} is never closed", open.name, open.start),
            );
        }
        let source = self.tokenizer.input().to_vec();
        Ok(Tree::from_parts(source, self.nodes, self.roots))
    }

    fn start_tag(
        &mut self,
        name: String,
        self_closing: bool,
        attributes: Vec<Attribute>,
        end: usize,
    ) -> Result<(), ParseError> {
        let start = reverse_find(self.source(), 0, end.saturating_sub(1), b'<')?;
        let leaf = self_closing || is_void_element(&name);
        let span = SourceSpan {
            start,
            inner_start: end,
            end: leaf.then_some(end),
            inner_end: None,
        };
        let id = self.insert(NodeKind::Element(Element {
            name: name.clone(),
            attributes,
            self_closing: leaf,
            span,
        }));
        if !leaf {
            self.stack_of_open_elements.push(OpenElement {
                id,
                name,
                start,
                inner_start: end,
            });
        }
        Ok(())
    }

    fn end_tag(&mut self, name: &str, end: usize) -> Result<(), ParseError> {
        if is_void_element(name) {
            warn_once(
                "Tree Builder",
                &format!("ignored end tag </{name}> of a void element at byte {end}"),
            );
            return Ok(());
        }

        let Some(open) = self.stack_of_open_elements.last() else {
            return Err(ParseError::UnexpectedEndTag {
                name: name.to_string(),
                offset: end,
            });
        };
        if open.name != name {
            warn_once(
                "Tree Builder",
                &format!(
                    "end tag </{name}> at byte {end} closed the open <{}>",
                    open.name
                ),
            );
        }

        // For `</name>` this is `end - (len(name) + 3)`; scanning also copes
        // with whitespace before the `>`.
        let inner_end = reverse_find(self.source(), open.inner_start, end.saturating_sub(1), b'<')?;
        let id = open.id;
        let _ = self.stack_of_open_elements.pop();
        if let NodeKind::Element(element) = &mut self.nodes[id.0].kind {
            element.span.end = Some(end);
            element.span.inner_end = Some(inner_end);
        }
        Ok(())
    }

    /// Append a node under the current open element, or to the roots.
    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.stack_of_open_elements.last().map(|open| open.id);
        let mut address: Vec<usize> = match parent {
            Some(parent) => self.nodes[parent.0]
                .address
                .iter()
                .map(Cell::get)
                .collect(),
            None => Vec::new(),
        };
        let siblings = match parent {
            Some(parent) => &mut self.nodes[parent.0].children,
            None => &mut self.roots,
        };
        address.push(siblings.len());
        siblings.push(id);

        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            address: address.into_iter().map(Cell::new).collect(),
        });
        id
    }

    fn source(&self) -> &'a [u8] {
        self.tokenizer.input()
    }
}

/// Scan `haystack[low..=high]` from `high` down for `needle`.
///
/// # Errors
///
/// [`ParseError::Bounds`] if `high` is past the end or below `low`,
/// [`ParseError::MalformedMarkup`] if `needle` does not occur in the window.
pub(crate) fn reverse_find(
    haystack: &[u8],
    low: usize,
    high: usize,
    needle: u8,
) -> Result<usize, ParseError> {
    if high >= haystack.len() || high < low {
        return Err(ParseError::Bounds {
            start: low,
            end: high,
            len: haystack.len(),
        });
    }
    haystack[low..=high]
        .iter()
        .rposition(|&b| b == needle)
        .map(|position| low + position)
        .ok_or(ParseError::MalformedMarkup { offset: high })
}
