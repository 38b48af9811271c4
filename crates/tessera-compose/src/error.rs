//! Pipeline error types.

/// Boxed error type returned by composition collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error from a transform chain run.
///
/// Only collaborator failures surface here: a half-merged or half-expanded
/// page must fail the request rather than being emitted. Parse failures
/// never appear; the parse stage logs them and lets the document pass
/// through unmodified.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ComposeError {
    /// The layout-merge collaborator failed.
    #[error("layout merge failed")]
    LayoutMerge(#[source] BoxError),

    /// The tile-render collaborator failed.
    #[error("tile rendering failed")]
    TileRender(#[source] BoxError),

    /// The directive-substitution collaborator failed.
    #[error("edge directive substitution failed")]
    DirectiveSubstitution(#[source] BoxError),
}
