//! Tree node representation for parsed HTML documents.

/// HTML void elements, written without a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is emitted without escaping in HTML mode.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Regular element with tag, attributes and children.
    #[default]
    Element,
    /// HTML comment; the comment text lives in `text`.
    Comment,
    /// CDATA section; the raw section content lives in `text`.
    CData,
}

/// Node in a parsed HTML tree.
///
/// Text placement uses the text/tail model: `text` is the content before
/// the first child, and each child carries the text that follows it in
/// `tail`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Node kind.
    pub kind: NodeKind,
    /// Element tag name (empty for comments and CDATA sections).
    pub tag: String,
    /// Element attributes in document order.
    pub attrs: Vec<(String, String)>,
    /// Direct text content.
    pub text: String,
    /// Text after this node (XML tail).
    pub tail: String,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Create a comment node.
    #[must_use]
    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Comment,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a CDATA section node.
    #[must_use]
    pub fn cdata(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::CData,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node is a regular element.
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Whether this element is an HTML void element.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.is_element() && VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    /// Collect all descendant elements with the given tag, in document order.
    #[must_use]
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        for child in &self.children {
            if child.is_element() && child.tag == tag {
                found.push(child);
            }
            found.extend(child.find_all(tag));
        }
        found
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Node)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

/// A parsed document: an optional doctype plus the top-level nodes.
///
/// Top-level comments (before or after the root element) are kept so they
/// survive a parse/serialize round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Raw doctype declaration content, without `<!DOCTYPE` and `>`.
    pub doctype: Option<String>,
    /// Top-level nodes; usually one element plus surrounding comments.
    pub children: Vec<Node>,
}

impl Document {
    /// The first top-level element, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.children.iter().find(|node| node.is_element())
    }

    /// Mutable access to the first top-level element, if any.
    pub fn root_mut(&mut self) -> Option<&mut Node> {
        self.children.iter_mut().find(|node| node.is_element())
    }
}
