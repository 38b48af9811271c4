//! The document representation threaded through the transform chain.

use tessera_dom::{Document, SerializeMode, Serializer};

/// A parsed tree together with the way it will be rendered back out.
///
/// The serialization strategy starts as [`SerializeMode::Xml`] and may be
/// switched to [`SerializeMode::Html`] by the parse stage (raw-data section
/// in the input) or the layout-merge stage (non-XHTML doctype).
#[derive(Debug, Clone)]
pub struct ParsedHtml {
    /// The mutable document tree.
    pub document: Document,
    /// Serialization strategy for final emission.
    pub mode: SerializeMode,
    /// Pretty-print the output instead of compact markup.
    pub pretty: bool,
}

impl ParsedHtml {
    /// Render the tree back to markup text.
    #[must_use]
    pub fn serialize(&self) -> String {
        Serializer::new(self.mode)
            .with_pretty(self.pretty)
            .serialize(&self.document)
    }
}

/// Response body as it moves between transform stages.
///
/// A stage that has no logic for the current variant must return the body
/// unchanged; only the parse stage upgrades a non-parsed variant to
/// [`Body::Parsed`], and from then on every stage sees the same tree.
#[derive(Debug, Clone)]
pub enum Body {
    /// Untouched raw output.
    Bytes(Vec<u8>),
    /// Decoded output.
    Text(String),
    /// Chunked raw output, as produced by a streaming handler.
    Chunks(Vec<Vec<u8>>),
    /// Parsed tree plus serialization strategy.
    Parsed(ParsedHtml),
}

impl Body {
    /// Whether the body has been parsed into a tree.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Final emission: render the body to the bytes put on the wire.
    ///
    /// Serialized output is always UTF-8.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.into_bytes(),
            Self::Chunks(chunks) => chunks.concat(),
            Self::Parsed(parsed) => parsed.serialize().into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tessera_dom::HtmlParser;

    #[test]
    fn into_bytes_passes_raw_forms_through() {
        assert_eq!(Body::Bytes(b"abc".to_vec()).into_bytes(), b"abc");
        assert_eq!(Body::Text("abc".to_owned()).into_bytes(), b"abc");
        assert_eq!(
            Body::Chunks(vec![b"ab".to_vec(), b"c".to_vec()]).into_bytes(),
            b"abc"
        );
    }

    #[test]
    fn into_bytes_serializes_parsed_tree() {
        let document = HtmlParser::new().parse("<html><body></body></html>").unwrap();
        let body = Body::Parsed(ParsedHtml {
            document,
            mode: SerializeMode::Xml,
            pretty: false,
        });
        assert_eq!(body.into_bytes(), b"<html><body /></html>");
    }
}
