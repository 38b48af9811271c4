//! Error types for document parsing.

/// Error during HTML parsing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomError {
    /// XML parsing error.
    #[error("XML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Input contained no elements at all.
    #[error("document contains no elements")]
    NoContent,
}
