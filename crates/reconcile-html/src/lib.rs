//! HTML tokenizer and fragment parser for the reconcile engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, tag and attribute states
//!   - Comments, DOCTYPE, bogus comments and raw text elements
//!   - Every token carries the byte offset that follows it
//!
//! - **Character references** ([WHATWG § 13.5](https://html.spec.whatwg.org/multipage/named-characters.html))
//!   - Named (including legacy forms without `;`), decimal and hexadecimal
//!
//! - **Fragment parsing** into a live [`reconcile_dom::DomTree`], used as the
//!   host implementation of `innerHTML`
//!
//! # Not Yet Implemented
//!
//! - Newline normalization (offsets always refer to the raw input)
//! - Script data escape states
//! - The full named character reference table

/// Character reference decoding.
pub mod entities;
/// Tokenizer failure type.
mod error;
/// Lenient fragment parser targeting `DomTree`.
pub mod fragment;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use entities::{unescape, unescape_attribute};
pub use error::TokenizeError;
pub use fragment::{FragmentParser, ParseIssue, parse_fragment_into};
pub use reconcile_dom::is_void_element;
pub use tokenizer::{Attribute, SpannedToken, Token, TokenKind, Tokenizer, tokenize};
