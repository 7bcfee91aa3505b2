//! HTML tokenizer module.
//!
//! Implements the parts of [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! that fragment markup needs, with every token tagged by the byte offset
//! that follows it.

/// Tokenizer state machine implementation.
pub mod core;
/// Helper methods for state transitions, emission and scanning.
mod helpers;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{Tokenizer, TokenizerState, tokenize};
pub use token::{Attribute, SpannedToken, Token, TokenKind};
