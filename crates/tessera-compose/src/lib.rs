//! Response composition pipeline for panel-based HTML pages.
//!
//! This crate post-processes rendered HTML responses through an ordered
//! [`TransformChain`]: the response is parsed into a tree, merged with its
//! site layout, tile placeholders are expanded, and edge-delivery
//! directives are resolved when no edge layer will.
//!
//! # Architecture
//!
//! Each stage implements the [`Transform`] trait and guards itself with
//! the per-request [`FlagStore`], so a stage whose preconditions do not
//! hold returns the [`Body`] untouched. The actual layout, tile, and
//! directive semantics are supplied through the [`LayoutMerger`],
//! [`TileRenderer`], and [`DirectiveResolver`] collaborator traits.
//!
//! # Example
//!
//! ```
//! use tessera_compose::{
//!     Body, ComposeConfig, DirectiveResolver, LayoutMerger, RequestContext,
//!     TileRenderer, standard_chain,
//! };
//!
//! struct NoLayout;
//!
//! impl LayoutMerger for NoLayout {
//!     fn merge(
//!         &self,
//!         _ctx: &mut RequestContext,
//!         _document: &mut tessera_dom::Document,
//!     ) -> Result<bool, tessera_compose::BoxError> {
//!         Ok(false)
//!     }
//! }
//!
//! struct NoTiles;
//!
//! impl TileRenderer for NoTiles {
//!     fn render_tiles(
//!         &self,
//!         _ctx: &mut RequestContext,
//!         _document: &mut tessera_dom::Document,
//!     ) -> Result<(), tessera_compose::BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! struct NoDirectives;
//!
//! impl DirectiveResolver for NoDirectives {
//!     fn substitute(&self, input: &str) -> Result<String, tessera_compose::BoxError> {
//!         Ok(input.to_owned())
//!     }
//! }
//!
//! let chain = standard_chain(
//!     &ComposeConfig::default(),
//!     Box::new(NoLayout),
//!     Box::new(NoTiles),
//!     Box::new(NoDirectives),
//! );
//!
//! let mut ctx = RequestContext::new()
//!     .with_response_header("Content-Type", "text/html; charset=utf-8");
//! let body = chain
//!     .run(&mut ctx, Body::Bytes(b"<html><body /></html>".to_vec()), "utf-8")
//!     .unwrap();
//! assert_eq!(body.into_bytes(), b"<html><body /></html>");
//! ```

mod body;
mod chain;
mod collaborators;
mod config;
mod context;
mod error;
mod flags;
pub mod transforms;

pub use body::{Body, ParsedHtml};
pub use chain::{Transform, TransformChain};
pub use collaborators::{DirectiveResolver, LayoutMerger, TileRenderer};
pub use config::ComposeConfig;
pub use context::RequestContext;
pub use error::{BoxError, ComposeError};
pub use flags::FlagStore;
pub use transforms::{
    DisableComposition, EDGE_CAPABILITY_HEADER, EDGE_PROCESSED_HEADER, IncludeTiles, MergeLayout,
    ParseHtml, ResolveEdgeDirectives, bypass_chain, standard_chain,
};
