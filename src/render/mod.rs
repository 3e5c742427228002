//! # Page Rendering
//!
//! Turns one logical page of a card into pixels.
//!
//! ## Architecture
//!
//! ```text
//! CardDescription + LogicalPage + dpi
//!         ↓
//!   Compositor (PageRenderer)
//!     1. allocate RenderTarget   mm_to_px(width) × mm_to_px(height)
//!     2. fill background color
//!     3. stamp background image  (stretched to the canvas)
//!     4. Element::draw × N       (list order = paint order)
//!         ↓
//!   RenderedPage
//! ```
//!
//! Element drawing mutates the target in place. Asset problems inside an
//! element are absorbed there; only canvas-level failures surface as errors.

pub mod compositor;
pub mod font;
pub mod image;
pub mod shape;
pub mod target;
pub mod text;
pub mod transform;

pub use compositor::Compositor;
pub use font::{Face, FontBook};
pub use target::{ClipWindow, CoverageMask, RenderTarget};

use ::image::RgbImage;

use crate::assets::AssetSource;
use crate::card::{CardDescription, Element, LogicalPage};
use crate::config::DEFAULT_MAX_CANVAS_PIXELS;
use crate::error::CardpressError;

/// Per-page drawing state handed to element renderers.
pub struct DrawContext<'a> {
    /// Device resolution of the page being drawn.
    pub dpi: u32,
    pub assets: &'a dyn AssetSource,
    pub fonts: FontBook<'a>,
    /// Largest intermediate buffer an element may allocate, in pixels.
    pub max_buffer_pixels: u64,
}

impl<'a> DrawContext<'a> {
    pub fn new(assets: &'a dyn AssetSource, dpi: u32) -> Self {
        Self {
            dpi,
            assets,
            fonts: FontBook::new(assets),
            max_buffer_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }

    pub fn with_buffer_limit(mut self, max_buffer_pixels: u64) -> Self {
        self.max_buffer_pixels = max_buffer_pixels;
        self
    }

    /// Whether a `width × height` buffer may be allocated. Logs a warning
    /// when it may not; the caller then skips the element.
    pub fn buffer_fits(&self, what: &str, width: u64, height: u64) -> bool {
        let fits = width
            .checked_mul(height)
            .is_some_and(|pixels| pixels <= self.max_buffer_pixels);
        if !fits {
            log::warn!(
                "{} buffer {}x{} exceeds the {} pixel limit, skipping element",
                what,
                width,
                height,
                self.max_buffer_pixels
            );
        }
        fits
    }
}

impl Element {
    /// Draw this element onto `target`.
    pub fn draw(&self, target: &mut RenderTarget, ctx: &mut DrawContext<'_>) {
        match self {
            Element::Text(t) => text::draw(t, target, ctx),
            Element::Image(i) => image::draw(i, target, ctx),
            Element::Shape(s) => shape::draw(s, target, ctx),
        }
    }
}

/// One rasterized logical page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub page: LogicalPage,
    pub dpi: u32,
    pub raster: RgbImage,
}

impl RenderedPage {
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// Capability to rasterize one logical page of a card.
///
/// `Sync` so that pages can be rendered in parallel.
pub trait PageRenderer: Sync {
    fn render_page(
        &self,
        card: &CardDescription,
        page: LogicalPage,
        dpi: u32,
    ) -> Result<RenderedPage, CardpressError>;
}
