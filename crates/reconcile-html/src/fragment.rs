//! Lenient fragment parsing into a live [`DomTree`].
//!
//! [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
//!
//! This is the host side of `innerHTML`: markup is tokenized and its nodes are
//! appended under a context element. Unlike the offset-tracking tree builder,
//! it never fails on malformed nesting. Every recovery is recorded as a
//! [`ParseIssue`] and reported through the warning system.
//!
//! NOTE: There are no insertion modes, implied end tags or foster parenting.
//! Nesting follows the markup as written, so that a fragment produces the
//! same shape the offset-tracking builder would.

use reconcile_common::warning::warn_once;
use reconcile_dom::{DomError, DomTree, NodeId, is_void_element};

use crate::tokenizer::{Token, Tokenizer};

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A problem the fragment parser recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What was wrong and how it was handled.
    pub message: String,
    /// Index into the token stream where the issue was encountered.
    pub token_index: usize,
    /// False for conditions that are only suspicious (e.g. a void end tag).
    pub is_error: bool,
}

/// Appends the nodes parsed from a markup string under a context element.
pub struct FragmentParser<'t> {
    tree: &'t mut DomTree,
    context: NodeId,
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack_of_open_elements: Vec<NodeId>,
    issues: Vec<ParseIssue>,
    token_index: usize,
}

impl<'t> FragmentParser<'t> {
    /// Create a parser that appends to `context`'s children.
    ///
    /// # Errors
    ///
    /// Fails if `context` is not a node of `tree`.
    pub fn new(tree: &'t mut DomTree, context: NodeId) -> Result<Self, DomError> {
        if tree.get(context).is_none() {
            return Err(DomError::UnknownNode(context));
        }
        Ok(Self {
            tree,
            context,
            stack_of_open_elements: Vec::new(),
            issues: Vec::new(),
            token_index: 0,
        })
    }

    /// Parse `markup` and return the issues recovered from.
    ///
    /// # Errors
    ///
    /// Only fails if the tree rejects an insertion, which cannot happen for
    /// freshly created nodes under a valid context.
    pub fn run(mut self, markup: &str) -> Result<Vec<ParseIssue>, DomError> {
        let mut tokenizer = Tokenizer::new(markup);
        loop {
            let spanned = match tokenizer.next_token() {
                Ok(spanned) => spanned,
                // "eof-in-tag parse error": the unfinished tag is dropped.
                Err(err) => {
                    self.parse_error(&format!("{err}; the tag was dropped"));
                    break;
                }
            };
            if spanned.token.is_eof() {
                break;
            }
            self.process_token(&spanned.token)?;
            self.token_index += 1;
        }

        // "stop parsing": whatever is still open is closed implicitly.
        if let Some(&innermost) = self.stack_of_open_elements.last() {
            let name = self.tag_name(innermost).unwrap_or_default().to_string();
            self.parse_error(&format!(
                "{} element(s) still open at end of input, innermost <{name}>",
                self.stack_of_open_elements.len()
            ));
        }
        Ok(self.issues)
    }

    fn process_token(&mut self, token: &Token) -> Result<(), DomError> {
        match token {
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                let parent = self.current_node();
                let element = self.tree.create_element(name);
                for attr in attributes {
                    self.tree.set_attribute(element, &attr.name, &attr.value)?;
                }
                self.tree.append_child(parent, element)?;
                if !*self_closing && !is_void_element(name) {
                    self.stack_of_open_elements.push(element);
                }
            }
            Token::EndTag { name } => self.process_end_tag(name),
            Token::Text { data } => {
                let parent = self.current_node();
                let text = self.tree.create_text_node(data);
                self.tree.append_child(parent, text)?;
            }
            Token::Comment { data } => {
                let parent = self.current_node();
                let comment = self.tree.create_comment(data);
                self.tree.append_child(parent, comment)?;
            }
            // DOCTYPE tokens have no place inside a fragment.
            Token::Doctype { .. } | Token::EndOfFile => {}
        }
        Ok(())
    }

    fn process_end_tag(&mut self, name: &str) {
        if is_void_element(name) {
            self.parse_warning(&format!("ignored end tag </{name}> of a void element"));
            return;
        }

        let Some(position) = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.tag_name(id) == Some(name))
        else {
            self.parse_error(&format!("ignored end tag </{name}> with no open element"));
            return;
        };

        if position + 1 != self.stack_of_open_elements.len() {
            self.parse_error(&format!(
                "end tag </{name}> closed {} unclosed element(s)",
                self.stack_of_open_elements.len() - position - 1
            ));
        }
        self.stack_of_open_elements.truncate(position);
    }

    /// "The current node is the bottommost node in this stack of open elements."
    /// With an empty stack, nodes go straight into the context element.
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(self.context)
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.as_element(id).map(|data| data.tag_name.as_str())
    }

    fn parse_error(&mut self, message: &str) {
        self.record(message, true);
    }

    fn parse_warning(&mut self, message: &str) {
        self.record(message, false);
    }

    fn record(&mut self, message: &str, is_error: bool) {
        warn_once("HTML Fragment", message);
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
            is_error,
        });
    }
}

/// Parse `markup` and append the resulting nodes to `context`'s children.
///
/// # Errors
///
/// Fails if `context` is not a node of `tree`.
pub fn parse_fragment_into(
    tree: &mut DomTree,
    context: NodeId,
    markup: &str,
) -> Result<Vec<ParseIssue>, DomError> {
    FragmentParser::new(tree, context)?.run(markup)
}
