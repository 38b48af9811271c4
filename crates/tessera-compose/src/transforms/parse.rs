//! Parse stage: normalize raw output into a parsed tree.

use std::sync::LazyLock;

use regex::bytes::Regex;
use tessera_dom::{HtmlParser, SerializeMode};

use crate::body::{Body, ParsedHtml};
use crate::chain::Transform;
use crate::context::RequestContext;
use crate::error::ComposeError;

/// Content encodings the pipeline cannot safely operate on.
const COMPRESSED_ENCODINGS: &[&str] = &["zip", "deflate", "compress"];

/// Literal raw-data section marker. Strict XML serialization corrupts
/// these sections, so their presence forces HTML-style output.
const CDATA_MARKER: &[u8] = b"<![CDATA[";

// Layouts saved with CR[+LF] line endings carry encoded carriage returns
// that corrupt the head of the parsed tree; both forms collapse to a
// plain linefeed, the CR+LF form first.
static CR_ENTITY_LF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("&#13;\n").expect("invalid CR+LF regex"));
static CR_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("&#13;").expect("invalid CR regex"));

/// First composing stage: parse the response into a tree.
///
/// Later stages assume their input is the tree produced here and do
/// nothing otherwise, so the guards in this stage are what turns the
/// whole pipeline off for non-HTML responses: wrong `Content-Type`,
/// compressed `Content-Encoding`, a character encoding other than UTF-8,
/// or the `disabled` flag all leave the body untouched. A parse failure
/// is logged and the body also passes through unchanged, so the page
/// renders exactly as the origin produced it.
pub struct ParseHtml {
    pretty_print: bool,
}

impl ParseHtml {
    /// Create the stage with compact output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pretty_print: false,
        }
    }

    /// Pretty-print serialized output.
    #[must_use]
    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }
}

impl Default for ParseHtml {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for ParseHtml {
    fn name(&self) -> &'static str {
        "parse-html"
    }

    fn order(&self) -> i32 {
        8000
    }

    fn transform(
        &self,
        ctx: &mut RequestContext,
        body: Body,
        encoding: &str,
    ) -> Result<Body, ComposeError> {
        if ctx.flags().is_disabled() {
            return Ok(body);
        }

        let is_html = ctx
            .response_header("Content-Type")
            .is_some_and(|value| value.starts_with("text/html"));
        if !is_html {
            return Ok(body);
        }

        let compressed = ctx
            .response_header("Content-Encoding")
            .is_some_and(|value| COMPRESSED_ENCODINGS.contains(&value));
        if compressed {
            return Ok(body);
        }

        if !is_utf8(encoding) {
            tracing::debug!(encoding, "unsupported character encoding, skipping parse");
            return Ok(body);
        }

        let chunks: Vec<Vec<u8>> = match &body {
            Body::Bytes(bytes) => vec![normalize_line_endings(bytes)],
            Body::Text(text) => vec![normalize_line_endings(text.as_bytes())],
            Body::Chunks(chunks) => chunks
                .iter()
                .filter(|chunk| !chunk.is_empty())
                .map(|chunk| normalize_line_endings(chunk))
                .collect(),
            Body::Parsed(_) => return Ok(body),
        };

        let force_html = chunks
            .iter()
            .any(|chunk| contains_marker(chunk, CDATA_MARKER));

        let text = match String::from_utf8(chunks.concat()) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "response body is not valid UTF-8");
                return Ok(body);
            }
        };

        match HtmlParser::new().parse(&text) {
            Ok(document) => {
                ctx.flags_mut().mark_enabled();
                Ok(Body::Parsed(ParsedHtml {
                    document,
                    mode: if force_html {
                        SerializeMode::Html
                    } else {
                        SerializeMode::Xml
                    },
                    pretty: self.pretty_print,
                }))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to parse response as HTML");
                Ok(body)
            }
        }
    }
}

/// Collapse encoded CR+LF and lone encoded CR to a linefeed.
fn normalize_line_endings(input: &[u8]) -> Vec<u8> {
    let crlf_fixed = CR_ENTITY_LF.replace_all(input, &b"\n"[..]);
    CR_ENTITY.replace_all(&crlf_fixed, &b"\n"[..]).into_owned()
}

fn contains_marker(chunk: &[u8], marker: &[u8]) -> bool {
    chunk.windows(marker.len()).any(|window| window == marker)
}

fn is_utf8(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
}
