//! Panel-merge stage: combine the page with its site layout.

use tessera_dom::SerializeMode;

use crate::body::Body;
use crate::chain::Transform;
use crate::collaborators::LayoutMerger;
use crate::context::RequestContext;
use crate::error::ComposeError;

/// Finds the site layout and merges the page's panels into it.
///
/// Runs only when parsing succeeded (`enabled`) and the body is the
/// parsed tree. When the collaborator reports no applicable layout the
/// stage is a no-op and `merged` stays false. A successful merge can
/// change the document's effective type: a non-XHTML doctype switches
/// serialization to HTML style.
pub struct MergeLayout {
    merger: Box<dyn LayoutMerger>,
}

impl MergeLayout {
    /// Create the stage around a layout-merge collaborator.
    #[must_use]
    pub fn new(merger: Box<dyn LayoutMerger>) -> Self {
        Self { merger }
    }
}

impl Transform for MergeLayout {
    fn name(&self) -> &'static str {
        "merge-layout"
    }

    fn order(&self) -> i32 {
        8100
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
                let merged = self
                    .merger
                    .merge(ctx, &mut parsed.document)
                    .map_err(ComposeError::LayoutMerge)?;

                if merged {
                    // Let later logic know the layout is already in
                    ctx.flags_mut().mark_merged();

                    if let Some(doctype) = &parsed.document.doctype {
                        if !doctype.is_empty() && !doctype.contains("XHTML") {
                            parsed.mode = SerializeMode::Html;
                        }
                    }
                }
                Ok(Body::Parsed(parsed))
            }
            other => Ok(other),
        }
    }
}
