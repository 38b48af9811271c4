//! HTML-tolerant document tree with switchable serialization.
//!
//! This crate provides the markup primitives used by the `tessera-compose`
//! pipeline:
//! - [`Node`] / [`Document`]: a mutable tree where text before the first
//!   child lives on the element and text after a node lives on that
//!   node's tail.
//! - [`HtmlParser`]: a tolerant parser built on quick-xml events that
//!   accepts real-world HTML (void elements, missing and stray close tags)
//!   and keeps doctypes, comments and CDATA sections.
//! - [`Serializer`]: renders a tree back to markup using one of two
//!   strategies ([`SerializeMode`]): strict XML or browser-style HTML.
//!
//! # Example
//!
//! ```
//! use tessera_dom::{HtmlParser, SerializeMode, Serializer};
//!
//! let doc = HtmlParser::new()
//!     .parse("<html><body><p>Hello</p></body></html>")
//!     .unwrap();
//! let out = Serializer::new(SerializeMode::Xml).serialize(&doc);
//! assert_eq!(out, "<html><body><p>Hello</p></body></html>");
//! ```

mod error;
mod parser;
mod serializer;
mod tree;

pub use error::DomError;
pub use parser::HtmlParser;
pub use serializer::{SerializeMode, Serializer};
pub use tree::{Document, Node, NodeKind};
