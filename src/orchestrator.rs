//! # Card Render Orchestrator
//!
//! Drives a [`PageRenderer`] once per logical page at the resolution of the
//! requested output mode, then encodes the result.
//!
//! ```text
//! render_preview: front ──► render @ preview dpi ──► PNG/JPEG bytes
//! render_print:   front + populated pages ──► render @ print dpi (rayon)
//!                                          ──► DocumentAssembler ──► PDF bytes
//! ```
//!
//! Both collaborators are injected; [`CardRenderer::new`] wires the
//! defaults ([`Compositor`] and [`PdfAssembler`]).

use rayon::prelude::*;
use std::sync::Arc;

use crate::assets::AssetSource;
use crate::card::{CardDescription, LogicalPage};
use crate::config::RenderConfig;
use crate::document::{DocumentAssembler, PdfAssembler, raster};
use crate::error::CardpressError;
use crate::render::{Compositor, PageRenderer, RenderedPage};

/// Renders cards into preview and print artifacts.
pub struct CardRenderer<R = Compositor, A = PdfAssembler> {
    renderer: R,
    assembler: A,
    config: RenderConfig,
}

impl CardRenderer<Compositor, PdfAssembler> {
    /// Default pipeline over `assets`.
    pub fn new(assets: Arc<dyn AssetSource>, config: RenderConfig) -> Self {
        let renderer = Compositor::new(assets, config.max_canvas_pixels);
        let assembler = PdfAssembler::new(config.print.encoding);
        Self::with_parts(renderer, assembler, config)
    }
}

impl<R: PageRenderer, A: DocumentAssembler> CardRenderer<R, A> {
    pub fn with_parts(renderer: R, assembler: A, config: RenderConfig) -> Self {
        Self {
            renderer,
            assembler,
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn assembler(&self) -> &A {
        &self.assembler
    }

    /// Render `pages` at `dpi`, preserving the given order.
    pub fn render_pages(
        &self,
        card: &CardDescription,
        pages: &[LogicalPage],
        dpi: u32,
    ) -> Result<Vec<RenderedPage>, CardpressError> {
        if self.config.parallel_pages && pages.len() > 1 {
            pages
                .par_iter()
                .map(|&page| self.renderer.render_page(card, page, dpi))
                .collect()
        } else {
            pages
                .iter()
                .map(|&page| self.renderer.render_page(card, page, dpi))
                .collect()
        }
    }

    /// Low-resolution raster of the front page.
    pub fn render_preview(&self, card: &CardDescription) -> Result<Vec<u8>, CardpressError> {
        card.validate()?;
        let profile = self.config.preview;
        log::info!("preview '{}' at {} dpi", card.card_name, profile.dpi);

        let mut pages = self.render_pages(card, &[LogicalPage::Front], profile.dpi)?;
        let front = pages
            .pop()
            .ok_or_else(|| CardpressError::Canvas("front page was not rendered".into()))?;
        raster::encode(&front.raster, profile.format)
    }

    /// Print document: the front page plus every named page with elements.
    pub fn render_print(&self, card: &CardDescription) -> Result<Vec<u8>, CardpressError> {
        card.validate()?;
        let dpi = self.config.print.dpi;
        let pages = card.populated_pages();
        log::info!(
            "print '{}': {} page(s) at {} dpi",
            card.card_name,
            pages.len(),
            dpi
        );

        let rendered = self.render_pages(card, &pages, dpi)?;
        self.assembler.assemble(&rendered)
    }
}
