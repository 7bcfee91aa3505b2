//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission, including the text run that precedes each tag
//! - Scanners for comments, DOCTYPEs and raw text elements

use reconcile_common::warning::warn_once;

use super::core::{Tokenizer, TokenizerState};
use super::token::{Attribute, SpannedToken, Token};
use crate::entities::{unescape, unescape_attribute};
use crate::error::TokenizeError;

/// How the content of a just-opened element is tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawTextKind {
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    /// (and script data): no character references.
    RawText,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state):
    /// character references are decoded.
    Rcdata,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state):
    /// everything up to end of input.
    Plaintext,
}

/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// NOTE: Per spec, the tree builder switches the tokenizer state. Tree
/// construction here never does, so the tokenizer recognizes these elements
/// itself.
fn raw_text_kind(name: &str) -> Option<RawTextKind> {
    match name {
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
            Some(RawTextKind::RawText)
        }
        "title" | "textarea" => Some(RawTextKind::Rcdata),
        "plaintext" => Some(RawTextKind::Plaintext),
        _ => None,
    }
}

/// "An appropriate end tag token is an end tag token whose tag name matches
/// the tag name of the last start tag to have been emitted from this
/// tokenizer"
///
/// Returns the offset of the `<` of the first `</name` (ASCII
/// case-insensitive) that is followed by whitespace, `/`, `>` or end of input.
fn find_appropriate_end_tag(haystack: &[u8], name: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(i) = find_bytes(&haystack[from..], b"</") {
        let at = from + i;
        let name_start = at + 2;
        let name_end = name_start + name.len();
        let matches_name = haystack
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()));
        if matches_name
            && matches!(
                haystack.get(name_end),
                None | Some(b'\t' | b'\n' | b'\x0C' | b'\r' | b' ' | b'/' | b'>')
            )
        {
            return Some(at);
        }
        from = name_start;
    }
    None
}

/// First occurrence of `needle` in `haystack`.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Earliest `-->` or `--!>` in a comment body, with the terminator's length.
fn find_comment_end(body: &[u8]) -> Option<(usize, usize)> {
    [
        find_bytes(body, b"-->").map(|i| (i, 3)),
        find_bytes(body, b"--!>").map(|i| (i, 4)),
    ]
        .into_iter()
        .flatten()
        .min_by_key(|&(i, _)| i)
}

// =============================================================================
// State Transition Helpers
// =============================================================================

impl Tokenizer<'_> {
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl Tokenizer<'_> {
    /// "Consume the next input character"
    ///
    /// Returns None at the end of input. An invalid UTF-8 sequence is
    /// consumed whole and reads as U+FFFD.
    pub(super) fn consume(&mut self) -> Option<char> {
        let rest = self.input.get(self.current_pos..)?;
        let chunk = rest[..rest.len().min(4)].utf8_chunks().next()?;
        let (c, len) = match chunk.valid().chars().next() {
            Some(c) => (c, c.len_utf8()),
            None => (char::REPLACEMENT_CHARACTER, chunk.invalid().len()),
        };
        self.current_pos += len;
        Some(c)
    }

    /// "If the next few characters are..."
    pub(super) fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target.as_bytes())
    }

    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input
            .get(self.current_pos..self.current_pos + target.len())
            .is_some_and(|next| next.eq_ignore_ascii_case(target.as_bytes()))
    }

    /// Consume the given ASCII string from the input. Caller must have already
    /// verified the characters are present.
    pub(super) const fn consume_string(&mut self, target: &str) {
        self.current_pos += target.len();
    }

    /// [ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// CR is included because input is never newline-normalized: offsets
    /// must keep pointing into the original buffer.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C' | '\r')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl Tokenizer<'_> {
    /// Emit the pending run of character data that ends at `until`, if any.
    pub(super) fn flush_text(&mut self, until: usize) {
        if until > self.text_start {
            let raw = String::from_utf8_lossy(&self.input[self.text_start..until]);
            let data = unescape(&raw).into_owned();
            self.pending.push_back(SpannedToken {
                token: Token::Text { data },
                end: until,
            });
        }
        self.text_start = until;
    }

    /// Emit a token for the construct that began at `tag_start` and ends at
    /// `end`, after the text run that preceded it. Returns to the data state.
    fn emit_markup(&mut self, token: Token, end: usize) {
        self.flush_text(self.tag_start);
        self.pending.push_back(SpannedToken { token, end });
        self.current_pos = end;
        self.text_start = end;
        self.switch_to(TokenizerState::Data);
    }

    /// "Switch to the data state. Emit the current tag token."
    pub(super) fn emit_current_tag(&mut self) {
        let Some(tag) = self.current_tag.take() else {
            self.switch_to(TokenizerState::Data);
            return;
        };

        let mut raw_text = None;
        let token = if tag.is_end_tag {
            // "When an end tag token is emitted with attributes, that is an
            // end-tag-with-attributes parse error."
            if !tag.attributes.is_empty() {
                self.log_parse_error("end-tag-with-attributes");
            }
            Token::EndTag { name: tag.name }
        } else {
            if !tag.self_closing {
                raw_text = raw_text_kind(&tag.name).map(|kind| (tag.name.clone(), kind));
            }
            Token::StartTag {
                attributes: self.finish_attributes(&tag.name, tag.attributes),
                name: tag.name,
                self_closing: tag.self_closing,
            }
        };

        self.emit_markup(token, self.current_pos);

        if let Some((name, kind)) = raw_text {
            self.consume_raw_text(&name, kind);
        }
    }

    /// Decode attribute values and drop duplicates.
    ///
    /// "if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    fn finish_attributes(&self, tag_name: &str, raw: Vec<(String, String)>) -> Vec<Attribute> {
        let mut attributes: Vec<Attribute> = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            if attributes.iter().any(|existing| existing.name == name) {
                warn_once(
                    "HTML Tokenizer",
                    &format!(
                        "duplicate attribute '{name}' on <{tag_name}> at byte {}; keeping the first",
                        self.tag_start
                    ),
                );
                continue;
            }
            let value = unescape_attribute(&value).into_owned();
            attributes.push(Attribute { name, value });
        }
        attributes
    }

    /// Emit the content of a raw text element as one text token, stopping
    /// right before its end tag so that the end tag is tokenized normally.
    fn consume_raw_text(&mut self, name: &str, kind: RawTextKind) {
        let input = self.input;
        let rest = &input[self.current_pos..];
        let len = match kind {
            RawTextKind::Plaintext => rest.len(),
            RawTextKind::RawText | RawTextKind::Rcdata => {
                find_appropriate_end_tag(rest, name).unwrap_or(rest.len())
            }
        };
        if len == 0 {
            return;
        }

        let raw = String::from_utf8_lossy(&rest[..len]);
        let data = match kind {
            RawTextKind::Rcdata => unescape(&raw).into_owned(),
            RawTextKind::RawText | RawTextKind::Plaintext => raw.into_owned(),
        };
        let end = self.current_pos + len;
        self.pending.push_back(SpannedToken {
            token: Token::Text { data },
            end,
        });
        self.current_pos = end;
        self.text_start = end;
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    /// through [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state).
    ///
    /// `current_pos` sits just past `<!--`. `<!-->` and `<!--->` are empty
    /// comments ("abrupt-closing-of-empty-comment"); `--!>` also closes.
    pub(super) fn emit_comment(&mut self) {
        let input = self.input;
        let body_start = self.current_pos;
        let body = &input[body_start..];

        let (data, end): (&[u8], usize) = if body.starts_with(b">") {
            (b"", body_start + 1)
        } else if body.starts_with(b"->") {
            (b"", body_start + 2)
        } else if let Some((len, terminator)) = find_comment_end(body) {
            (&body[..len], body_start + len + terminator)
        } else {
            // "EOF - This is an eof-in-comment parse error. Emit the current
            // comment token. Emit an end-of-file token."
            warn_once(
                "HTML Tokenizer",
                &format!("unterminated comment at byte {}", self.tag_start),
            );
            (body, input.len())
        };

        self.emit_markup(
            Token::Comment {
                data: String::from_utf8_lossy(data).into_owned(),
            },
            end,
        );
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    ///
    /// `current_pos` sits just past the `DOCTYPE` keyword. The name and
    /// identifiers are kept as one trimmed string; tree builders ignore it.
    pub(super) fn emit_doctype(&mut self) {
        let input = self.input;
        let rest = &input[self.current_pos..];
        let (body, end) = match rest.iter().position(|&b| b == b'>') {
            Some(i) => (&rest[..i], self.current_pos + i + 1),
            None => {
                self.log_parse_error("eof-in-doctype");
                (rest, input.len())
            }
        };
        let data = String::from_utf8_lossy(body)
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .to_string();
        self.emit_markup(Token::Doctype { data }, end);
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    ///
    /// The comment data runs from `from` up to the next `>` (or end of input).
    pub(super) fn emit_bogus_comment(&mut self, from: usize) {
        let input = self.input;
        let rest = &input[from..];
        let (data, end) = match rest.iter().position(|&b| b == b'>') {
            Some(i) => (&rest[..i], from + i + 1),
            None => (rest, input.len()),
        };
        self.emit_markup(
            Token::Comment {
                data: String::from_utf8_lossy(data).into_owned(),
            },
            end,
        );
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl Tokenizer<'_> {
    /// "EOF - This is an eof-in-tag parse error."
    ///
    /// Unlike the spec, which silently drops the tag, this is fatal: the
    /// tag's source span could never be closed.
    pub(super) const fn eof_in_tag(&self) -> TokenizeError {
        TokenizeError::EofInTag {
            offset: self.tag_start,
        }
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Recoverable parse errors are reported once through the warning system.
    pub(super) fn log_parse_error(&self, code: &str) {
        let pos = self.current_pos;
        warn_once("HTML Tokenizer", &format!("{code} parse error at byte {pos}"));
    }
}
