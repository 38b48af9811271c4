//! The ordered transform chain.

use std::fmt;

use crate::body::Body;
use crate::context::RequestContext;
use crate::error::ComposeError;

/// A single stage of the response composition pipeline.
///
/// A stage receives the current [`Body`] and either returns it unchanged
/// (when its guard conditions do not hold or it has no logic for the
/// current variant) or returns a replacement that becomes current for all
/// later stages.
pub trait Transform {
    /// Stage name, used in logs.
    fn name(&self) -> &'static str;

    /// Ordering tier. Stages run in ascending order; stages sharing a
    /// tier run in registration order.
    fn order(&self) -> i32;

    /// Transform the body, or return it untouched.
    fn transform(
        &self,
        ctx: &mut RequestContext,
        body: Body,
        encoding: &str,
    ) -> Result<Body, ComposeError>;
}

/// Ordered list of transforms applied to one response.
///
/// Built once at startup and shared; all per-request state lives in the
/// [`RequestContext`] and the [`Body`] threaded through [`run`].
///
/// [`run`]: TransformChain::run
#[derive(Default)]
pub struct TransformChain {
    stages: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage, builder style.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Transform + 'static) -> Self {
        self.push(Box::new(stage));
        self
    }

    /// Register a stage at its ordering tier.
    ///
    /// Insertion keeps the list sorted ascending by order; a stage with an
    /// order equal to existing stages lands after them, so ties resolve by
    /// registration order.
    pub fn push(&mut self, stage: Box<dyn Transform>) {
        let pos = self
            .stages
            .iter()
            .position(|existing| existing.order() > stage.order())
            .unwrap_or(self.stages.len());
        self.stages.insert(pos, stage);
    }

    /// Number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage once, in order, threading the body through.
    ///
    /// # Errors
    ///
    /// Propagates collaborator failures; see [`ComposeError`].
    pub fn run(
        &self,
        ctx: &mut RequestContext,
        mut body: Body,
        encoding: &str,
    ) -> Result<Body, ComposeError> {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), "running transform stage");
            body = stage.transform(ctx, body, encoding)?;
        }
        Ok(body)
    }
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| (s.order(), s.name())))
            .finish()
    }
}
