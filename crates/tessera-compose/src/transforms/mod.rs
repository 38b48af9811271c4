//! The pipeline's transform stages.
//!
//! Ordering tiers: bypass and parse share the early tier (8000, bypass
//! registered first), layout merge runs at 8100, tile inclusion at 8500,
//! and edge-directive resolution last at 9900.

mod disable;
mod esi;
mod merge;
mod parse;
mod tiles;

pub use disable::DisableComposition;
pub use esi::{EDGE_CAPABILITY_HEADER, EDGE_PROCESSED_HEADER, ResolveEdgeDirectives};
pub use merge::MergeLayout;
pub use parse::ParseHtml;
pub use tiles::IncludeTiles;

use crate::chain::TransformChain;
use crate::collaborators::{DirectiveResolver, LayoutMerger, TileRenderer};
use crate::config::ComposeConfig;

/// Build the standard composition chain: parse, merge layout, include
/// tiles, resolve edge directives.
///
/// For requests that must not be composed, use [`bypass_chain`] instead;
/// pushing [`DisableComposition`] into an already-built standard chain
/// does not work, because the equal-order tie break places it after the
/// parse stage.
#[must_use]
pub fn standard_chain(
    config: &ComposeConfig,
    merger: Box<dyn LayoutMerger>,
    renderer: Box<dyn TileRenderer>,
    resolver: Box<dyn DirectiveResolver>,
) -> TransformChain {
    with_standard_stages(TransformChain::new(), config, merger, renderer, resolver)
}

/// Build the standard chain with composition bypassed.
///
/// [`DisableComposition`] is registered first, so it wins the tie in the
/// tier it shares with the parse stage and every composing stage becomes
/// a no-op. Only the edge-directive stage still has any effect. Use this
/// for the sub-fragment fetches an edge-delivery layer performs, which
/// must not be recomposed.
#[must_use]
pub fn bypass_chain(
    config: &ComposeConfig,
    merger: Box<dyn LayoutMerger>,
    renderer: Box<dyn TileRenderer>,
    resolver: Box<dyn DirectiveResolver>,
) -> TransformChain {
    with_standard_stages(
        TransformChain::new().with_stage(DisableComposition),
        config,
        merger,
        renderer,
        resolver,
    )
}

fn with_standard_stages(
    chain: TransformChain,
    config: &ComposeConfig,
    merger: Box<dyn LayoutMerger>,
    renderer: Box<dyn TileRenderer>,
    resolver: Box<dyn DirectiveResolver>,
) -> TransformChain {
    chain
        .with_stage(ParseHtml::new().with_pretty_print(config.pretty_print))
        .with_stage(MergeLayout::new(merger))
        .with_stage(IncludeTiles::new(renderer))
        .with_stage(ResolveEdgeDirectives::new(resolver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::context::RequestContext;
    use crate::error::BoxError;
    use pretty_assertions::assert_eq;
    use regex::Regex;
    use std::sync::LazyLock;
    use tessera_dom::{Document, Node};

    /// Merges the page's `data-panel` regions into a fixed site layout.
    struct PanelLayout;

    impl LayoutMerger for PanelLayout {
        fn merge(&self, _ctx: &mut RequestContext, document: &mut Document) -> Result<bool, BoxError> {
            let Some(root) = document.root_mut() else {
                return Ok(false);
            };
            let panels: Vec<Node> = root
                .find_all("div")
                .into_iter()
                .filter(|div| div.attr("data-panel").is_some())
                .cloned()
                .collect();
            if panels.is_empty() {
                return Ok(false);
            }

            let body = Node::new("body").with_children(
                std::iter::once(Node::new("header").with_text("site"))
                    .chain(panels)
                    .collect(),
            );
            *root = Node::new("html").with_children(vec![body]);
            Ok(true)
        }
    }

    struct NoLayout;

    impl LayoutMerger for NoLayout {
        fn merge(&self, _ctx: &mut RequestContext, _document: &mut Document) -> Result<bool, BoxError> {
            Ok(false)
        }
    }

    /// Expands `data-tile` placeholders; tiles may introduce directives.
    struct ExpandTiles;

    impl TileRenderer for ExpandTiles {
        fn render_tiles(
            &self,
            _ctx: &mut RequestContext,
            document: &mut Document,
        ) -> Result<(), BoxError> {
            if let Some(root) = document.root_mut() {
                root.walk_mut(&mut |node| {
                    if let Some(tile) = node.attr("data-tile") {
                        if tile == "deferred" {
                            node.children =
                                vec![Node::comment(" esi <esi:include src=\"/tile\"/> ")];
                        } else {
                            node.text = format!("[{tile}]");
                        }
                    }
                });
            }
            Ok(())
        }
    }

    static ESI_COMMENT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<!-- esi\s(.*?)\s?-->").expect("invalid esi regex"));

    struct UnwrapEsiComments;

    impl DirectiveResolver for UnwrapEsiComments {
        fn substitute(&self, input: &str) -> Result<String, BoxError> {
            Ok(ESI_COMMENT.replace_all(input, "$1").into_owned())
        }
    }

    fn chain_with(merger: impl LayoutMerger + 'static) -> TransformChain {
        standard_chain(
            &ComposeConfig::default(),
            Box::new(merger),
            Box::new(ExpandTiles),
            Box::new(UnwrapEsiComments),
        )
    }

    fn bypass_chain_with(merger: impl LayoutMerger + 'static) -> TransformChain {
        bypass_chain(
            &ComposeConfig::default(),
            Box::new(merger),
            Box::new(ExpandTiles),
            Box::new(UnwrapEsiComments),
        )
    }

    fn html_ctx() -> RequestContext {
        RequestContext::new().with_response_header("Content-Type", "text/html; charset=utf-8")
    }

    fn run(chain: &TransformChain, ctx: &mut RequestContext, input: &[u8]) -> String {
        let body = chain
            .run(ctx, Body::Bytes(input.to_vec()), "utf-8")
            .expect("chain run failed");
        String::from_utf8(body.into_bytes()).unwrap()
    }

    #[test]
    fn standard_chain_registers_in_tier_order() {
        let chain = chain_with(NoLayout);
        assert_eq!(chain.len(), 4);
        assert_eq!(
            format!("{chain:?}"),
            "[(8000, \"parse-html\"), (8100, \"merge-layout\"), \
             (8500, \"include-tiles\"), (9900, \"resolve-edge-directives\")]"
        );
    }

    #[test]
    fn full_composition_with_layout_and_tiles() {
        let chain = chain_with(PanelLayout);
        let mut ctx = html_ctx();
        let page =
            br#"<html><body><div data-panel="content"><p data-tile="news"></p></div></body></html>"#;
        let out = run(&chain, &mut ctx, page);

        assert!(ctx.flags().is_enabled());
        assert!(ctx.flags().is_merged());
        assert!(out.contains("<header>site</header>"));
        assert!(out.contains("[news]"));
    }

    #[test]
    fn no_layout_available_keeps_page_structure() {
        let chain = chain_with(NoLayout);
        let mut ctx = html_ctx();
        let page = br#"<html><body><p data-tile="news">pending</p></body></html>"#;
        let out = run(&chain, &mut ctx, page);

        assert!(!ctx.flags().is_merged());
        assert!(out.contains("[news]"));
        assert!(!out.contains("<header>"));
    }

    #[test]
    fn non_html_response_is_untouched() {
        let chain = chain_with(PanelLayout);
        let mut ctx =
            RequestContext::new().with_response_header("Content-Type", "application/json");
        let input = br#"{"tile": "<div data-tile=\"x\"/>"}"#;
        let out = run(&chain, &mut ctx, input);
        assert_eq!(out.as_bytes(), input);
    }

    #[test]
    fn compressed_response_is_untouched() {
        let chain = chain_with(PanelLayout);
        let mut ctx = html_ctx().with_response_header("Content-Encoding", "deflate");
        let input = b"<html><body></body></html>";
        let out = run(&chain, &mut ctx, input);
        assert_eq!(out.as_bytes(), input);
    }

    #[test]
    fn bypass_chain_skips_composition_but_not_directive_stage() {
        let chain = bypass_chain_with(PanelLayout);
        let mut ctx = html_ctx().with_request_header(EDGE_CAPABILITY_HEADER, "true");

        let page = br#"<html><body><!-- esi <esi:include src="/t"/> --></body></html>"#;
        let out = run(&chain, &mut ctx, page);

        assert!(!ctx.flags().is_enabled());
        assert!(!ctx.flags().is_merged());
        assert!(out.contains("<esi:include"));
        assert!(!out.contains("<!-- esi"));
    }

    #[test]
    fn bypass_chain_registers_bypass_ahead_of_parse() {
        let chain = bypass_chain_with(NoLayout);
        assert_eq!(chain.len(), 5);
        assert!(format!("{chain:?}").starts_with("[(8000, \"disable-composition\"), (8000, \"parse-html\")"));

        let mut ctx = html_ctx();
        let out = chain
            .run(&mut ctx, Body::Bytes(b"<html></html>".to_vec()), "utf-8")
            .unwrap();
        assert!(ctx.flags().is_disabled());
        assert!(!ctx.flags().is_enabled());
        assert!(!out.is_parsed());
    }

    #[test]
    fn bypass_registers_before_parse_in_the_shared_tier() {
        // Pushed first, the bypass wins the tie within tier 8000
        let mut chain = TransformChain::new();
        chain.push(Box::new(DisableComposition));
        chain.push(Box::new(ParseHtml::new()));

        let mut ctx = html_ctx();
        let out = chain
            .run(&mut ctx, Body::Bytes(b"<html></html>".to_vec()), "utf-8")
            .unwrap();
        assert!(!out.is_parsed());
        assert!(ctx.flags().is_disabled());
    }

    #[test]
    fn edge_header_true_resolves_directives_and_sets_marker() {
        let chain = chain_with(NoLayout);
        let mut ctx = html_ctx().with_request_header(EDGE_CAPABILITY_HEADER, "true");
        let page = br#"<html><body><div data-tile="deferred"></div></body></html>"#;
        let out = run(&chain, &mut ctx, page);

        assert!(out.contains(r#"<esi:include src="/tile"/>"#));
        assert!(!out.contains("<!-- esi"));
        assert_eq!(ctx.response_header(EDGE_PROCESSED_HEADER), Some("1"));
    }

    #[test]
    fn edge_header_absent_keeps_directives_verbatim() {
        let chain = chain_with(NoLayout);
        let mut ctx = html_ctx();
        let page = br#"<html><body><div data-tile="deferred"></div></body></html>"#;
        let out = run(&chain, &mut ctx, page);

        assert!(out.contains("<!-- esi"));
        assert_eq!(ctx.response_header(EDGE_PROCESSED_HEADER), None);
    }

    #[test]
    fn parse_failure_degrades_to_passthrough() {
        let chain = chain_with(PanelLayout);
        let mut ctx = html_ctx();
        let input: &[u8] = &[b'<', 0xff, 0xfe];
        let out = chain
            .run(&mut ctx, Body::Bytes(input.to_vec()), "utf-8")
            .unwrap();

        assert!(!ctx.flags().is_enabled());
        assert!(!ctx.flags().is_merged());
        assert_eq!(out.into_bytes(), input);
    }
}
