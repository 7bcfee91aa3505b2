use core::fmt;

use strum_macros::Display;

/// An attribute on a start tag token, and on an element built from it.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value" (character references already decoded)
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// Tokens handed to tree construction. Unlike the spec's per-character
/// tokens, runs of character data are coalesced into a single [`Token::Text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE ...>`; tree builders ignore it.
    Doctype {
        /// Everything between the `DOCTYPE` keyword and `>`, trimmed.
        data: String,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes". A start tag with `self_closing` set is the
    /// self-closing-tag token (`<br/>`).
    StartTag {
        /// "a tag name", ASCII-lowercased
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes", first occurrence of each name wins
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes on end tags are parsed and dropped.
    EndTag {
        /// "a tag name", ASCII-lowercased
        name: String,
    },

    /// A run of character data, with character references decoded.
    Text {
        /// decoded characters
        data: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// the raw comment body
        data: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

/// The kind of a [`Token`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TokenKind {
    /// `<!DOCTYPE ...>`
    Doctype,
    /// `<name ...>`
    StartTag,
    /// `<name .../>`
    SelfClosingTag,
    /// `</name>`
    EndTag,
    /// character data
    Text,
    /// `<!-- ... -->`
    Comment,
    /// end of input
    EndOfFile,
}

impl Token {
    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// The token's kind; self-closing start tags report [`TokenKind::SelfClosingTag`].
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Doctype { .. } => TokenKind::Doctype,
            Self::StartTag {
                self_closing: true, ..
            } => TokenKind::SelfClosingTag,
            Self::StartTag { .. } => TokenKind::StartTag,
            Self::EndTag { .. } => TokenKind::EndTag,
            Self::Text { .. } => TokenKind::Text,
            Self::Comment { .. } => TokenKind::Comment,
            Self::EndOfFile => TokenKind::EndOfFile,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { data } => write!(f, "<!DOCTYPE {data}>"),
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Text { data } => write!(f, "Text({data:?})"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}

/// A token together with the byte offset immediately following it in the
/// source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    /// The token itself.
    pub token: Token,
    /// Byte offset just past the token's last byte.
    pub end: usize,
}
