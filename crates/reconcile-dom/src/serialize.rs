//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Turns a live subtree back into markup so callers can observe the effect of
//! a patch batch, plus a debugging tree printer.

use std::borrow::Cow;
use std::fmt::Write;

use crate::{DomTree, NodeId, NodeType};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr". `keygen` and `param` are obsolete but still never get
/// an end tag.
#[must_use]
pub fn is_void_element(tag_name: &str) -> bool {
    matches!(
        tag_name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose text content is serialized (and tokenized) verbatim.
#[must_use]
pub fn is_raw_text_element(tag_name: &str) -> bool {
    matches!(
        tag_name,
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext"
    )
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "Replace any occurrence of the "&" character by the string "&amp;".
/// Replace any occurrences of the U+00A0 NO-BREAK SPACE character by the string
/// "&nbsp;". ... If the algorithm was not invoked in the attribute mode, replace
/// any occurrences of the "<" character by the string "&lt;", and any
/// occurrences of the ">" character by the string "&gt;"."
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

/// Attribute-mode escaping: `&`, U+00A0 and `"` are replaced.
#[must_use]
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

fn escape(input: &str, attribute_mode: bool) -> Cow<'_, str> {
    let needs_escape = input.chars().any(|c| match c {
        '&' | '\u{00A0}' => true,
        '"' => attribute_mode,
        '<' | '>' => !attribute_mode,
        _ => false,
    });
    if !needs_escape {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

impl DomTree {
    /// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#html-fragment-serialisation-algorithm)
    ///
    /// Serializes the children of `id` (what `element.innerHTML` returns).
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.serialize_node(child, &mut out);
        }
        out
    }

    /// Serializes `id` itself, including its own tags (`element.outerHTML`).
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(id, &mut out);
        out
    }

    fn serialize_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document => {
                for &child in &node.children {
                    self.serialize_node(child, out);
                }
            }
            NodeType::Element(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                for attr in &data.attrs {
                    let _ = write!(out, " {}=\"{}\"", attr.name, escape_attribute(&attr.value));
                }
                out.push('>');
                if is_void_element(&data.tag_name) {
                    return;
                }
                for &child in &node.children {
                    self.serialize_node(child, out);
                }
                let _ = write!(out, "</{}>", data.tag_name);
            }
            NodeType::Text(text) => {
                // "If the parent of current node is a style, script, xmp, iframe,
                // noembed, noframes, or plaintext element ... append the value of
                // current node's data literally."
                let raw = node
                    .parent
                    .and_then(|p| self.as_element(p))
                    .is_some_and(|parent| is_raw_text_element(&parent.tag_name));
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeType::Comment(data) => {
                let _ = write!(out, "<!--{data}-->");
            }
        }
    }
}

/// Print a DOM subtree for debugging, one node per line.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    print!("{}", format_tree(tree, id, indent));
}

/// Render the same outline `print_tree` prints.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId, indent: usize) -> String {
    let mut out = String::new();
    write_tree(tree, id, indent, &mut out);
    out
}

fn write_tree(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => {
            let _ = writeln!(out, "{prefix}#document");
        }
        NodeType::Element(data) => {
            if data.attrs.is_empty() {
                let _ = writeln!(out, "{prefix}<{}>", data.tag_name);
            } else {
                let attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|a| format!("{}=\"{}\"", a.name, a.value))
                    .collect();
                let _ = writeln!(out, "{prefix}<{} {}>", data.tag_name, attrs.join(" "));
            }
        }
        NodeType::Text(text) => {
            let _ = writeln!(out, "{prefix}#text {text:?}");
        }
        NodeType::Comment(data) => {
            let _ = writeln!(out, "{prefix}#comment {data:?}");
        }
    }
    for &child in &node.children {
        write_tree(tree, child, indent + 1, out);
    }
}
