use std::collections::VecDeque;

use strum_macros::Display;

use super::token::{SpannedToken, Token};
use crate::error::TokenizeError;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The subset of the tokenizer state machine that needs per-character
/// handling. Comments, DOCTYPEs, bogus comments and raw text are scanned
/// directly from the markup declaration open and tag emission steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
}

/// A start or end tag under construction.
#[derive(Debug, Default)]
pub(super) struct TagBuilder {
    pub(super) is_end_tag: bool,
    pub(super) name: String,
    pub(super) self_closing: bool,
    /// Raw (not yet decoded) name/value pairs, in source order.
    pub(super) attributes: Vec<(String, String)>,
}

impl TagBuilder {
    fn start_tag() -> Self {
        Self::default()
    }

    fn end_tag() -> Self {
        Self {
            is_end_tag: true,
            ..Self::default()
        }
    }

    fn start_new_attribute(&mut self) {
        self.attributes.push((String::new(), String::new()));
    }

    fn append_to_current_attribute_name(&mut self, c: char) {
        if let Some((name, _)) = self.attributes.last_mut() {
            name.push(c.to_ascii_lowercase());
        }
    }

    fn append_to_current_attribute_value(&mut self, c: char) {
        if let Some((_, value)) = self.attributes.last_mut() {
            value.push(c);
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// Pull-based: each call to [`Tokenizer::next_token`] runs the state machine
/// until at least one token is ready. Every token carries the byte offset just
/// past its last byte, which the tree builders use to recover source spans.
pub struct Tokenizer<'a> {
    pub(super) input: &'a [u8],
    pub(super) state: TokenizerState,
    pub(super) current_pos: usize,
    pub(super) current_input_character: Option<char>,
    // "Reconsume in the X state" sets this flag.
    pub(super) reconsume: bool,
    pub(super) current_tag: Option<TagBuilder>,
    /// Offset of the `<` that opened the construct being tokenized.
    pub(super) tag_start: usize,
    /// Offset where the current run of character data began.
    pub(super) text_start: usize,
    pub(super) pending: VecDeque<SpannedToken>,
    pub(super) at_eof: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over text.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Create a tokenizer over raw markup bytes.
    ///
    /// "The initial state is the data state."
    ///
    /// The bytes need not be UTF-8. Invalid sequences read as U+FFFD in
    /// token data, and every offset still refers to `bytes`.
    #[must_use]
    pub const fn from_bytes(input: &'a [u8]) -> Self {
        Self {
            input,
            state: TokenizerState::Data,
            current_pos: 0,
            current_input_character: None,
            reconsume: false,
            current_tag: None,
            tag_start: 0,
            text_start: 0,
            pending: VecDeque::new(),
            at_eof: false,
            done: false,
        }
    }

    /// The input being tokenized.
    #[must_use]
    pub const fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Produce the next token. After the end-of-file token has been returned,
    /// every further call returns end-of-file again.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizeError::EofInTag`] when the input ends inside a tag.
    /// The tokenizer is exhausted afterwards.
    pub fn next_token(&mut self) -> Result<SpannedToken, TokenizeError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            if self.at_eof {
                return Ok(SpannedToken {
                    token: Token::EndOfFile,
                    end: self.input.len(),
                });
            }
            if let Err(err) = self.step() {
                self.at_eof = true;
                self.pending.clear();
                return Err(err);
            }
        }
    }

    /// Run one iteration of the main loop.
    fn step(&mut self) -> Result<(), TokenizeError> {
        // Each state begins by consuming the next input character,
        // unless we're reconsuming from a previous state transition.
        if self.reconsume {
            self.reconsume = false;
        } else {
            self.current_input_character = self.consume();
        }

        match self.state {
            TokenizerState::Data => self.handle_data_state(),
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
            TokenizerState::TagName => self.handle_tag_name_state()?,
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state()?,
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => {
                self.handle_attribute_value_quoted_state('"')?;
            }
            TokenizerState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_quoted_state('\'')?;
            }
            TokenizerState::AttributeValueUnquoted => {
                self.handle_attribute_value_unquoted_state()?;
            }
            TokenizerState::AfterAttributeValueQuoted => {
                self.handle_after_attribute_value_quoted_state()?;
            }
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state()?,
            TokenizerState::MarkupDeclarationOpen => self.handle_markup_declaration_open_state(),
        }
        Ok(())
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => {
                self.tag_start = self.current_pos - 1;
                self.switch_to(TokenizerState::TagOpen);
            }
            // "EOF - Emit an end-of-file token."
            None => {
                self.flush_text(self.input.len());
                self.at_eof = true;
            }
            // Character data accumulates until the next tag; character
            // references are decoded when the run is flushed.
            Some(_) => {}
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            // NOTE: Reconsume so that the markup declaration open state can peek ahead
            // without the main loop consuming a character first.
            Some('!') => self.reconsume_in(TokenizerState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            // "ASCII alpha - Create a new start tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.flush_text(self.tag_start);
                self.current_tag = Some(TagBuilder::start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003F QUESTION MARK (?) - ... Reconsume in the bogus comment state."
            Some('?') => {
                self.log_parse_error("unexpected-question-mark-instead-of-tag-name");
                self.emit_bogus_comment(self.current_pos - 1);
            }
            // "EOF - ... Emit a U+003C LESS-THAN SIGN character token and an end-of-file token."
            // "Anything else - ... Emit a U+003C LESS-THAN SIGN character token. Reconsume
            // in the data state."
            // The '<' is still part of the pending text run.
            _ => self.reconsume_in(TokenizerState::Data),
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha - Create a new end tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.flush_text(self.tag_start);
                self.current_tag = Some(TagBuilder::end_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-end-tag-name parse error.
            // Switch to the data state."
            Some('>') => {
                self.log_parse_error("missing-end-tag-name");
                self.flush_text(self.tag_start);
                self.text_start = self.current_pos;
                self.switch_to(TokenizerState::Data);
            }
            // "EOF - ... Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
            // character token and an end-of-file token."
            None => self.reconsume_in(TokenizerState::Data),
            // "Anything else - This is an invalid-first-character-of-tag-name parse error.
            // Create a comment token whose data is the empty string. Reconsume in the bogus
            // comment state."
            // The bogus comment starts right after `</`.
            Some(_) => {
                self.log_parse_error("invalid-first-character-of-tag-name");
                self.emit_bogus_comment(self.tag_start + 2);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+002F SOLIDUS (/) - Switch to the self-closing start tag state."
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current tag token."
            Some('>') => self.emit_current_tag(),
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => return Err(self.eof_in_tag()),
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current tag token's tag name."
            // "U+0000 NULL - ... Append a U+FFFD REPLACEMENT CHARACTER character to the
            // current tag token's tag name."
            Some(c) => {
                let c = if c == '\0' { '\u{FFFD}' } else { c.to_ascii_lowercase() };
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.name.push(c);
                }
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF -
            // Reconsume in the after attribute name state."
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "U+003D EQUALS SIGN (=) - This is an unexpected-equals-sign-before-attribute-name
            // parse error. Start a new attribute in the current tag token. Set that attribute's
            // name to the current input character, and its value to the empty string."
            Some('=') => {
                self.log_parse_error("unexpected-equals-sign-before-attribute-name");
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.start_new_attribute();
                    tag.append_to_current_attribute_name('=');
                }
                self.switch_to(TokenizerState::AttributeName);
            }
            // "Anything else - Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the attribute name state."
            Some(_) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.start_new_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "whitespace, U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF -
            // Reconsume in the after attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "U+003D EQUALS SIGN (=) - Switch to the before attribute value state."
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current attribute's name."
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.append_to_current_attribute_name(c);
                }
            }
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => self.emit_current_tag(),
            None => return Err(self.eof_in_tag()),
            // "Anything else - Start a new attribute in the current tag token... Reconsume
            // in the attribute name state."
            Some(_) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.start_new_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-attribute-value parse error.
            // Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.log_parse_error("missing-attribute-value");
                self.emit_current_tag();
            }
            // "Anything else - Reconsume in the attribute value (unquoted) state."
            _ => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
        }
    }

    /// [§ 13.2.5.36](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// and [§ 13.2.5.37](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state),
    /// which differ only in the closing quote.
    fn handle_attribute_value_quoted_state(&mut self, quote: char) -> Result<(), TokenizeError> {
        match self.current_input_character {
            // "Switch to the after attribute value (quoted) state."
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            None => return Err(self.eof_in_tag()),
            // "Anything else - Append the current input character to the current
            // attribute's value." References are decoded when the tag is emitted.
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.append_to_current_attribute_value(c);
                }
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('>') => self.emit_current_tag(),
            None => return Err(self.eof_in_tag()),
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.append_to_current_attribute_value(c);
                }
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            None => return Err(self.eof_in_tag()),
            // "Anything else - This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.log_parse_error("missing-whitespace-between-attributes");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) -> Result<(), TokenizeError> {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Set the self-closing flag of the current tag
            // token. Switch to the data state. Emit the current tag token."
            Some('>') => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.self_closing = true;
                }
                self.emit_current_tag();
            }
            None => return Err(self.eof_in_tag()),
            // "Anything else - This is an unexpected-solidus-in-tag parse error. Reconsume
            // in the before attribute name state."
            Some(_) => {
                self.log_parse_error("unexpected-solidus-in-tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// `current_pos` sits just past the `!`.
    fn handle_markup_declaration_open_state(&mut self) {
        // "Two U+002D HYPHEN-MINUS characters (-) - Consume those two characters,
        // create a comment token whose data is the empty string, and switch to the
        // comment start state."
        if self.next_few_characters_are("--") {
            self.consume_string("--");
            self.emit_comment();
        }
        // "ASCII case-insensitive match for the word "DOCTYPE" - Consume those
        // characters and switch to the DOCTYPE state."
        else if self.next_few_characters_are_case_insensitive("DOCTYPE") {
            self.consume_string("DOCTYPE");
            self.emit_doctype();
        }
        // "Anything else - This is an incorrectly-opened-comment parse error. Create a
        // comment token whose data is the empty string. Switch to the bogus comment state
        // (don't consume anything in the current state)."
        // CDATA sections only exist in foreign content, so they land here too.
        else {
            self.log_parse_error("incorrectly-opened-comment");
            self.emit_bogus_comment(self.current_pos);
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<SpannedToken, TokenizeError>;

    /// Yields tokens up to and including the end-of-file token, or up to the
    /// first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_token();
        self.done = !matches!(&result, Ok(spanned) if !spanned.token.is_eof());
        Some(result)
    }
}

/// Tokenize a whole buffer. The returned stream ends with exactly one
/// [`Token::EndOfFile`].
///
/// # Errors
///
/// Fails if the input ends inside a tag.
pub fn tokenize(bytes: &[u8]) -> Result<Vec<SpannedToken>, TokenizeError> {
    Tokenizer::from_bytes(bytes).collect()
}
