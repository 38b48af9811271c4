//! Tile-inclusion stage: expand tile placeholders into rendered content.

use crate::body::Body;
use crate::chain::Transform;
use crate::collaborators::TileRenderer;
use crate::context::RequestContext;
use crate::error::ComposeError;

/// Turns the composed page into its final form by expanding tiles.
///
/// Runs whenever parsing succeeded and the body is the parsed tree; it
/// does not depend on `merged`, since a page can carry tiles without any
/// layout having been applied. How a tile is fetched and rendered is the
/// collaborator's policy.
pub struct IncludeTiles {
    renderer: Box<dyn TileRenderer>,
}

impl IncludeTiles {
    /// Create the stage around a tile-render collaborator.
    #[must_use]
    pub fn new(renderer: Box<dyn TileRenderer>) -> Self {
        Self { renderer }
    }
}

impl Transform for IncludeTiles {
    fn name(&self) -> &'static str {
        "include-tiles"
    }

    fn order(&self) -> i32 {
        8500
    }

    fn transform(
        &self,
        ctx: &mut RequestContext,
        body: Body,
        _encoding: &str,
    ) -> Result<Body, ComposeError> {
        if !ctx.flags().is_enabled() {
            return Ok(body);
        }

        match body {
            Body::Parsed(mut parsed) => {
                self.renderer
                    .render_tiles(ctx, &mut parsed.document)
                    .map_err(ComposeError::TileRender)?;
                Ok(Body::Parsed(parsed))
            }
            other => Ok(other),
        }
    }
}
