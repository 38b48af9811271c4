//! HTML-tolerant parser built on quick-xml events.
//!
//! Real-world pages are rarely well-formed XML: void elements are written
//! without `/>`, close tags go missing, and stray close tags appear. The
//! parser accepts all of these and produces a [`Document`] tree; it only
//! fails on input that contains no elements at all or on hard syntax
//! errors the underlying reader cannot recover from.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::DomError;
use crate::tree::{Document, Node, NodeKind, VOID_ELEMENTS};

/// Parse HTML text into a [`Document`] tree.
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML string into a document tree.
    ///
    /// # Errors
    ///
    /// Returns an error on unrecoverable syntax errors or when the input
    /// contains no elements.
    pub fn parse(&self, html: &str) -> Result<Document, DomError> {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut doc = Document::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::DocType(e) => {
                    let declaration = reader.decoder().decode(&e)?;
                    doc.doctype = Some(declaration.trim().to_owned());
                }
                Event::Start(e) => {
                    let tag = self.decode_tag(&reader, &e);
                    let attrs = self.decode_attrs(&reader, &e);
                    let node = if is_void(&tag) {
                        element(tag, attrs)
                    } else {
                        self.parse_element(&mut reader, tag, attrs)?
                    };
                    doc.children.push(node);
                }
                Event::Empty(e) => {
                    let tag = self.decode_tag(&reader, &e);
                    let attrs = self.decode_attrs(&reader, &e);
                    doc.children.push(element(tag, attrs));
                }
                Event::Comment(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    doc.children.push(Node::comment(text));
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    doc.children.push(Node::cdata(text));
                }
                Event::Text(e) => {
                    // Whitespace between top-level nodes; anything before the
                    // first node has nowhere to hang and is dropped.
                    let text = reader.decoder().decode(&e)?;
                    if let Some(last) = doc.children.last_mut() {
                        last.tail.push_str(&text);
                    }
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    if let Some(last) = doc.children.last_mut() {
                        last.tail.push_str(&decode_entity(&entity));
                    }
                }
                Event::End(_) | Event::Decl(_) | Event::PI(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if doc.root().is_none() {
            return Err(DomError::NoContent);
        }
        Ok(doc)
    }

    fn parse_element<R: BufRead>(
        &self,
        reader: &mut Reader<R>,
        tag: String,
        attrs: Vec<(String, String)>,
    ) -> Result<Node, DomError> {
        let mut node = Node {
            kind: NodeKind::Element,
            tag,
            attrs,
            ..Node::default()
        };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child_tag = self.decode_tag(reader, &e);
                    let child_attrs = self.decode_attrs(reader, &e);
                    let child = if is_void(&child_tag) {
                        element(child_tag, child_attrs)
                    } else {
                        self.parse_element(reader, child_tag, child_attrs)?
                    };
                    node.children.push(child);
                }
                Event::Empty(e) => {
                    let child_tag = self.decode_tag(reader, &e);
                    let child_attrs = self.decode_attrs(reader, &e);
                    node.children.push(element(child_tag, child_attrs));
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    append_text(&mut node, &text);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    append_text(&mut node, &decode_entity(&entity));
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    node.children.push(Node::cdata(text));
                }
                Event::Comment(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    node.children.push(Node::comment(text));
                }
                Event::End(e) => {
                    let name = self.decode_name(reader, e.name().as_ref());
                    if name.eq_ignore_ascii_case(&node.tag) {
                        return Ok(node);
                    }
                    // Stray close tag for an element that was never opened
                }
                Event::Eof => {
                    // Unclosed element; everything parsed so far belongs to it
                    return Ok(node);
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }
    }

    fn decode_tag<R: BufRead>(&self, reader: &Reader<R>, e: &BytesStart) -> String {
        self.decode_name(reader, e.name().as_ref())
    }

    fn decode_name<R: BufRead>(&self, reader: &Reader<R>, name: &[u8]) -> String {
        reader.decoder().decode(name).map_or_else(
            |_| String::from_utf8_lossy(name).into_owned(),
            std::borrow::Cow::into_owned,
        )
    }

    fn decode_attrs<R: BufRead>(&self, reader: &Reader<R>, e: &BytesStart) -> Vec<(String, String)> {
        let mut attrs = Vec::new();
        for attr in e.attributes().flatten() {
            let key = reader.decoder().decode(attr.key.as_ref()).map_or_else(
                |_| String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                std::borrow::Cow::into_owned,
            );

            // Unknown entities in attribute values are kept verbatim
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );

            attrs.push((key, value));
        }
        attrs
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn element(tag: String, attrs: Vec<(String, String)>) -> Node {
    Node {
        kind: NodeKind::Element,
        tag,
        attrs,
        ..Node::default()
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Append text to the node's text or the last child's tail.
fn append_text(node: &mut Node, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Decode entity references to their character values.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        // Numeric character references
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown named entity - preserve as written
        _ => format!("&{entity};"),
    }
}
