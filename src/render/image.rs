//! Image element rendering and asset decoding.
//!
//! A missing or undecodable image never fails the page: the element is
//! skipped and a warning is logged, so one bad photo cannot block the rest
//! of the card. The same holds for an image whose resized or rotated
//! buffer would exceed the buffer limit.

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use super::DrawContext;
use super::target::RenderTarget;
use super::transform::{rotate_image, rotated_extent};
use crate::assets::AssetSource;
use crate::card::ImageElement;
use crate::geometry::{mm_to_px, mm_to_px_extent};

/// Outcome of looking up and decoding an image reference.
pub enum ImageLookup {
    Found(DynamicImage),
    Missing,
    Undecodable(String),
}

/// Fetch and decode an image through the asset source.
pub fn load(assets: &dyn AssetSource, reference: &str) -> ImageLookup {
    let Some(bytes) = assets.image_bytes(reference) else {
        return ImageLookup::Missing;
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => ImageLookup::Found(img),
        Err(e) => ImageLookup::Undecodable(e.to_string()),
    }
}

/// Stretch to exactly `width × height` (no aspect preservation).
pub fn stretch(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    img.resize_exact(width.max(1), height.max(1), FilterType::Lanczos3)
}

/// Draw an image element onto the target.
pub fn draw(el: &ImageElement, target: &mut RenderTarget, ctx: &mut DrawContext<'_>) {
    let source = match load(ctx.assets, &el.src) {
        ImageLookup::Found(img) => img,
        ImageLookup::Missing => {
            log::warn!("image '{}' not found, skipping element", el.src);
            return;
        }
        ImageLookup::Undecodable(e) => {
            log::warn!("image '{}' could not be decoded ({}), skipping element", el.src, e);
            return;
        }
    };

    let sized = match el.target_size() {
        Some((w_mm, h_mm)) => {
            let w = mm_to_px_extent(w_mm, ctx.dpi);
            let h = mm_to_px_extent(h_mm, ctx.dpi);
            if w == 0 || h == 0 {
                log::debug!("image '{}' sized to nothing, skipping", el.src);
                return;
            }
            if !ctx.buffer_fits("image", w as u64, h as u64) {
                return;
            }
            stretch(&source, w, h)
        }
        None => {
            if !ctx.buffer_fits("image", source.width() as u64, source.height() as u64) {
                return;
            }
            source
        }
    };

    let mut rgba: RgbaImage = sized.to_rgba8();
    if let Some(r) = el.rotation
        && r != 0.0
    {
        let angle = -r as f32;
        let (w, h) = (rgba.width() as usize, rgba.height() as usize);
        let (rw, rh) = rotated_extent(w, h, angle, (w as f32 / 2.0, h as f32 / 2.0));
        if !ctx.buffer_fits("rotated image", rw as u64, rh as u64) {
            return;
        }
        rgba = rotate_image(&rgba, angle);
    }

    let x = mm_to_px(el.x, ctx.dpi);
    let y = mm_to_px(el.y, ctx.dpi);
    log::debug!("image '{}' {}x{} at ({}, {})", el.src, rgba.width(), rgba.height(), x, y);

    target.draw_image(&rgba, x, y, el.opacity);
}
