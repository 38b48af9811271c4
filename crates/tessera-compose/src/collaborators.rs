//! Interfaces to the composition collaborators.
//!
//! The pipeline orchestrates composition but owns none of the algorithms:
//! locating the site layout, rendering tiles, and rewriting edge-delivery
//! directives are behind these traits. Errors cross the boundary as boxed
//! errors and are wrapped by the stages; they fail the whole chain run.

use tessera_dom::Document;

use crate::context::RequestContext;
use crate::error::BoxError;

/// Locates the site layout for a request and merges the page's panels
/// into it.
pub trait LayoutMerger {
    /// Merge the layout into `document` in place.
    ///
    /// Returns `Ok(false)` when no layout applies to this request, in
    /// which case the document must be left untouched.
    fn merge(&self, ctx: &mut RequestContext, document: &mut Document) -> Result<bool, BoxError>;
}

/// Expands tile placeholders in a page into their rendered content.
///
/// Whether a tile is rendered inline or deferred to an edge layer is
/// entirely this collaborator's policy.
pub trait TileRenderer {
    /// Expand all tile placeholders in `document` in place.
    fn render_tiles(
        &self,
        ctx: &mut RequestContext,
        document: &mut Document,
    ) -> Result<(), BoxError>;
}

/// Rewrites or substitutes edge-delivery directives inline.
///
/// Implementations must be idempotent: substituting twice yields the same
/// output as substituting once.
pub trait DirectiveResolver {
    /// Substitute directives in a text body.
    fn substitute(&self, input: &str) -> Result<String, BoxError>;

    /// Substitute directives in a byte body.
    ///
    /// The default implementation goes through lossy UTF-8.
    fn substitute_bytes(&self, input: &[u8]) -> Result<Vec<u8>, BoxError> {
        let text = String::from_utf8_lossy(input);
        Ok(self.substitute(&text)?.into_bytes())
    }
}
