//! Bypass stage: opt a response out of composition.

use crate::body::Body;
use crate::chain::Transform;
use crate::context::RequestContext;
use crate::error::ComposeError;

/// Sets the `disabled` flag and changes nothing else, for any body
/// variant.
///
/// Register this for requests that must not be recomposed, typically the
/// sub-fragment fetches an edge-delivery layer performs, which would
/// otherwise re-enter the pipeline. It shares the parse stage's tier and
/// must be registered before it to take effect;
/// [`bypass_chain`](super::bypass_chain) does that.
pub struct DisableComposition;

impl Transform for DisableComposition {
    fn name(&self) -> &'static str {
        "disable-composition"
    }

    fn order(&self) -> i32 {
        8000
    }

    fn transform(
        &self,
        ctx: &mut RequestContext,
        body: Body,
        _encoding: &str,
    ) -> Result<Body, ComposeError> {
        ctx.flags_mut().disable();
        Ok(body)
    }
}
