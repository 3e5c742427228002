//! Page compositor: background, background image, then elements in order.

use std::sync::Arc;

use super::image::{ImageLookup, load, stretch};
use super::{DrawContext, PageRenderer, RenderTarget, RenderedPage};
use crate::assets::AssetSource;
use crate::card::{CardDescription, Color, Element, LogicalPage};
use crate::error::CardpressError;
use crate::geometry::mm_to_px_extent;

/// Default [`PageRenderer`]: composites onto a fresh canvas per call.
#[derive(Clone)]
pub struct Compositor {
    assets: Arc<dyn AssetSource>,
    max_canvas_pixels: u64,
}

impl Compositor {
    pub fn new(assets: Arc<dyn AssetSource>, max_canvas_pixels: u64) -> Self {
        Self {
            assets,
            max_canvas_pixels,
        }
    }

    /// Build one page canvas.
    ///
    /// A background image that is missing is skipped; one that exists but
    /// cannot be decoded aborts the page.
    pub fn compose(
        &self,
        width_mm: u32,
        height_mm: u32,
        background_color: Color,
        background_image: Option<&str>,
        elements: &[Element],
        dpi: u32,
    ) -> Result<RenderTarget, CardpressError> {
        let width = mm_to_px_extent(width_mm as f64, dpi);
        let height = mm_to_px_extent(height_mm as f64, dpi);
        let mut target = RenderTarget::new(width, height, background_color, self.max_canvas_pixels)?;

        if let Some(reference) = background_image {
            match load(self.assets.as_ref(), reference) {
                ImageLookup::Found(img) => {
                    let stretched = stretch(&img, width, height).to_rgba8();
                    target.draw_image(&stretched, 0, 0, 1.0);
                }
                ImageLookup::Missing => {
                    log::warn!("background image '{}' not found, using color only", reference);
                }
                ImageLookup::Undecodable(e) => {
                    return Err(CardpressError::Background(format!(
                        "Failed to decode {}: {}",
                        reference, e
                    )));
                }
            }
        }

        let mut ctx =
            DrawContext::new(self.assets.as_ref(), dpi).with_buffer_limit(self.max_canvas_pixels);
        for (i, element) in elements.iter().enumerate() {
            log::debug!("drawing element {} ({})", i, element.label());
            element.draw(&mut target, &mut ctx);
        }

        Ok(target)
    }
}

impl PageRenderer for Compositor {
    fn render_page(
        &self,
        card: &CardDescription,
        page: LogicalPage,
        dpi: u32,
    ) -> Result<RenderedPage, CardpressError> {
        let elements = card.page(page);
        log::debug!("composing {} page: {} element(s) at {} dpi", page, elements.len(), dpi);

        let target = self.compose(
            card.width_mm,
            card.height_mm,
            card.background_color,
            card.background_image.as_deref(),
            elements,
            dpi,
        )?;

        Ok(RenderedPage {
            page,
            dpi,
            raster: target.into_image(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::card::{ShapeElement, ShapeKind};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn compositor(assets: MemoryAssets) -> Compositor {
        Compositor::new(Arc::new(assets), 50_000_000)
    }

    fn square(x: f64, color: Color) -> Element {
        let mut s = ShapeElement::new(ShapeKind::Rectangle, x, 10.0, 20.0, 20.0);
        s.fill = Some(color);
        Element::Shape(s)
    }

    #[test]
    fn test_canvas_size_follows_dpi() {
        let c = compositor(MemoryAssets::new());
        let target = c.compose(150, 210, Color::WHITE, None, &[], 150).unwrap();
        assert_eq!((target.width(), target.height()), (886, 1240));
    }

    #[test]
    fn test_background_color_fill() {
        let c = compositor(MemoryAssets::new());
        let target = c.compose(100, 100, Color::rgb(1, 2, 3), None, &[], 10).unwrap();
        assert!(target.image().pixels().all(|p| *p == Rgb([1, 2, 3])));
    }

    #[test]
    fn test_background_image_is_stretched() {
        let bg = RgbImage::from_pixel(3, 7, Rgb([0, 128, 0]));
        let mut bytes = Vec::new();
        bg.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        let c = compositor(MemoryAssets::new().with_image("bg.png", bytes));

        let target = c.compose(100, 100, Color::WHITE, Some("bg.png"), &[], 20).unwrap();
        let corner = target.image().get_pixel(0, 0);
        let far = target.image().get_pixel(target.width() - 1, target.height() - 1);
        assert!(corner[1] > 120 && corner[0] < 10, "{:?}", corner);
        assert!(far[1] > 120 && far[0] < 10, "{:?}", far);
    }

    #[test]
    fn test_missing_background_is_not_fatal() {
        let c = compositor(MemoryAssets::new());
        let target = c.compose(100, 100, Color::WHITE, Some("nope.png"), &[], 10).unwrap();
        assert!(target.image().pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_undecodable_background_is_fatal() {
        let c = compositor(MemoryAssets::new().with_image("bad.png", vec![0; 16]));
        let result = c.compose(100, 100, Color::WHITE, Some("bad.png"), &[], 10);
        assert!(matches!(result, Err(CardpressError::Background(_))));
    }

    #[test]
    fn test_later_elements_paint_over_earlier() {
        let c = compositor(MemoryAssets::new());
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        // 10px per mm: red at 100..300, blue at 200..400
        let elements = vec![square(10.0, red), square(20.0, blue)];
        let target = c.compose(100, 100, Color::WHITE, None, &elements, 254).unwrap();
        assert_eq!(*target.image().get_pixel(150, 150), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(250, 150), Rgb([0, 0, 255]));

        let reversed = vec![square(20.0, blue), square(10.0, red)];
        let target = c.compose(100, 100, Color::WHITE, None, &reversed, 254).unwrap();
        assert_eq!(*target.image().get_pixel(250, 150), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_canvas_limit_is_a_canvas_error() {
        let c = Compositor::new(Arc::new(MemoryAssets::new()), 1_000);
        let result = c.compose(100, 100, Color::WHITE, None, &[], 150);
        assert!(matches!(result, Err(CardpressError::Canvas(_))));
    }

    #[test]
    fn test_render_page_reports_identity() {
        let c = compositor(MemoryAssets::new());
        let card = CardDescription::default();
        let page = c.render_page(&card, LogicalPage::Back, 30).unwrap();
        assert_eq!(page.page, LogicalPage::Back);
        assert_eq!(page.dpi, 30);
        assert_eq!(page.width(), 177);
    }
}
