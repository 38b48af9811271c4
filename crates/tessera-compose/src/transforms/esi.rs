//! Edge-directive stage: resolve edge-delivery markers inline.

use crate::body::Body;
use crate::chain::Transform;
use crate::collaborators::DirectiveResolver;
use crate::context::RequestContext;
use crate::error::ComposeError;

/// Request header announcing that the client or edge path honors
/// edge-delivery directives.
pub const EDGE_CAPABILITY_HEADER: &str = "X-ESI-Enabled";

/// Response header set when directives were substituted inline.
pub const EDGE_PROCESSED_HEADER: &str = "X-Esi";

/// Resolves edge-delivery directives when no downstream edge layer will.
///
/// Runs last, after all composition: merged layouts and included tiles can
/// both introduce new directives, so resolution is only meaningful once the
/// page is complete. It ignores the pipeline flags entirely; even a
/// bypassed response can carry literal directives from upstream.
///
/// When the capability header is absent or not `true`, directives are left
/// verbatim for the edge layer to interpret. Otherwise they are resolved
/// inline; for the flattened forms the [`EDGE_PROCESSED_HEADER`] response
/// header records that substitution actually changed something.
pub struct ResolveEdgeDirectives {
    resolver: Box<dyn DirectiveResolver>,
}

impl ResolveEdgeDirectives {
    /// Create the stage around a directive-substitution collaborator.
    #[must_use]
    pub fn new(resolver: Box<dyn DirectiveResolver>) -> Self {
        Self { resolver }
    }

    fn substitute_flattened(
        &self,
        ctx: &mut RequestContext,
        flattened: String,
    ) -> Result<Body, ComposeError> {
        let substituted = self
            .resolver
            .substitute(&flattened)
            .map_err(ComposeError::DirectiveSubstitution)?;
        if substituted != flattened {
            ctx.set_response_header(EDGE_PROCESSED_HEADER, "1");
        }
        Ok(Body::Text(substituted))
    }
}

impl Transform for ResolveEdgeDirectives {
    fn name(&self) -> &'static str {
        "resolve-edge-directives"
    }

    fn order(&self) -> i32 {
        9900
    }

    fn transform(
        &self,
        ctx: &mut RequestContext,
        body: Body,
        _encoding: &str,
    ) -> Result<Body, ComposeError> {
        let honors_directives = ctx
            .request_header(EDGE_CAPABILITY_HEADER)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        if !honors_directives {
            return Ok(body);
        }

        match body {
            Body::Bytes(bytes) => {
                let substituted = self
                    .resolver
                    .substitute_bytes(&bytes)
                    .map_err(ComposeError::DirectiveSubstitution)?;
                Ok(Body::Bytes(substituted))
            }
            Body::Text(text) => {
                let substituted = self
                    .resolver
                    .substitute(&text)
                    .map_err(ComposeError::DirectiveSubstitution)?;
                Ok(Body::Text(substituted))
            }
            Body::Chunks(chunks) => {
                let flattened = String::from_utf8_lossy(&chunks.concat()).into_owned();
                self.substitute_flattened(ctx, flattened)
            }
            Body::Parsed(parsed) => {
                // Composition is complete; the tree is rendered down to the
                // form the substitution works on
                self.substitute_flattened(ctx, parsed.serialize())
            }
        }
    }
}
