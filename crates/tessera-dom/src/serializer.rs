//! Document serialization with XML and HTML strategies.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{Document, Node, NodeKind, RAW_TEXT_ELEMENTS};

/// Character references that the escaper leaves intact.
static CHAR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);")
        .expect("invalid character reference regex")
});

/// Serialization strategy.
///
/// `Xml` writes strict XML: empty elements self-close and every text node
/// is escaped, which destroys CDATA sections. `Html` writes browser-style
/// markup: void elements have no close tag, `script`/`style` content is
/// emitted raw, and CDATA sections are kept literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializeMode {
    /// XML-style output (the default).
    #[default]
    Xml,
    /// HTML-style output.
    Html,
}

/// Serialize a [`Document`] back to markup text.
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    mode: SerializeMode,
    pretty: bool,
}

impl Serializer {
    /// Create a serializer with the given strategy, compact output.
    #[must_use]
    pub fn new(mode: SerializeMode) -> Self {
        Self {
            mode,
            pretty: false,
        }
    }

    /// Enable or disable pretty printing.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serialize the document, doctype first when present.
    #[must_use]
    pub fn serialize(&self, doc: &Document) -> String {
        let mut out = String::with_capacity(4096);

        if let Some(doctype) = &doc.doctype {
            let _ = writeln!(out, "<!DOCTYPE {doctype}>");
        }

        for child in &doc.children {
            self.serialize_node(child, &mut out, 0);
            if !child.tail.is_empty() {
                out.push_str(&escape_text(&child.tail));
            }
        }
        out
    }

    fn serialize_node(&self, node: &Node, out: &mut String, depth: usize) {
        match node.kind {
            NodeKind::Comment => {
                out.push_str("<!--");
                out.push_str(&node.text);
                out.push_str("-->");
            }
            NodeKind::CData => match self.mode {
                // Strict XML has no way to keep the section; the content is
                // re-escaped as plain text
                SerializeMode::Xml => out.push_str(&escape_text(&node.text)),
                SerializeMode::Html => {
                    out.push_str("<![CDATA[");
                    out.push_str(&node.text);
                    out.push_str("]]>");
                }
            },
            NodeKind::Element => self.serialize_element(node, out, depth),
        }
    }

    fn serialize_element(&self, node: &Node, out: &mut String, depth: usize) {
        out.push('<');
        out.push_str(&node.tag);
        for (key, value) in &node.attrs {
            let _ = write!(out, r#" {key}="{}""#, escape_attr(value));
        }

        if node.text.is_empty() && node.children.is_empty() {
            match self.mode {
                SerializeMode::Xml => out.push_str(" />"),
                SerializeMode::Html => {
                    out.push('>');
                    if !node.is_void() {
                        let _ = write!(out, "</{}>", node.tag);
                    }
                }
            }
            return;
        }

        out.push('>');

        let raw_text =
            self.mode == SerializeMode::Html && RAW_TEXT_ELEMENTS.contains(&node.tag.as_str());
        if !node.text.is_empty() {
            if raw_text {
                out.push_str(&node.text);
            } else {
                out.push_str(&escape_text(&node.text));
            }
        }

        if self.indents_children(node) {
            let inner = "  ".repeat(depth + 1);
            for child in &node.children {
                out.push('\n');
                out.push_str(&inner);
                self.serialize_node(child, out, depth + 1);
                // Whitespace tails are replaced by the indentation
            }
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        } else {
            for child in &node.children {
                self.serialize_node(child, out, depth + 1);
                if !child.tail.is_empty() {
                    out.push_str(&escape_text(&child.tail));
                }
            }
        }

        let _ = write!(out, "</{}>", node.tag);
    }

    fn indents_children(&self, node: &Node) -> bool {
        self.pretty
            && node.text.is_empty()
            && !node.children.is_empty()
            && node.children.iter().all(|child| {
                matches!(child.kind, NodeKind::Element | NodeKind::Comment)
                    && child.tail.trim().is_empty()
            })
    }
}

/// Escape text for markup content.
fn escape_text(text: &str) -> String {
    escape_markup(text, false)
}

/// Escape text for attribute values.
fn escape_attr(text: &str) -> String {
    escape_markup(text, true)
}

/// Escape markup special characters.
///
/// An `&` that begins a well-formed character reference is left alone so
/// that entities preserved by the parser round-trip unchanged.
fn escape_markup(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => {
                if CHAR_REFERENCE.is_match(&text[idx + 1..]) {
                    result.push('&');
                } else {
                    result.push_str("&amp;");
                }
            }
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}
