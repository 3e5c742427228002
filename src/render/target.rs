//! The canvas every element is drawn onto.
//!
//! A `RenderTarget` is an opaque RGB buffer owned by one compositor run.
//! Sources with alpha (images, text coverage, anti-aliased shapes) are blended
//! in with straight-alpha "over" compositing. Anything outside the buffer is
//! clipped.

use image::{Rgb, RgbImage, RgbaImage};

use crate::card::Color;
use crate::error::CardpressError;

/// Single-channel coverage buffer: 0.0 = untouched, 1.0 = fully covered.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl CoverageMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data.get(y * self.width + x).copied().unwrap_or(0.0)
    }

    /// Accumulate coverage at (x, y), clamped to 1.0. Out-of-range is ignored.
    #[inline]
    pub fn add(&mut self, x: i64, y: i64, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.data[idx] = (self.data[idx] + coverage).min(1.0);
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The part of an element's box that lands on the canvas, in box-local
/// pixels: columns `x..x + width`, rows `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    pub x: i64,
    pub y: i64,
    pub width: usize,
    pub height: usize,
}

/// Mutable page canvas in device pixels.
pub struct RenderTarget {
    image: RgbImage,
}

impl RenderTarget {
    /// Allocate a canvas of `width × height` filled with `background`.
    ///
    /// Allocation is fallible: zero-sized canvases, canvases above
    /// `max_pixels`, and failed reservations are reported as `Canvas` errors.
    pub fn new(width: u32, height: u32, background: Color, max_pixels: u64) -> Result<Self, CardpressError> {
        if width == 0 || height == 0 {
            return Err(CardpressError::Canvas(format!(
                "canvas must be non-empty, got {}x{}",
                width, height
            )));
        }
        let pixels = width as u64 * height as u64;
        if pixels > max_pixels {
            return Err(CardpressError::Canvas(format!(
                "canvas {}x{} exceeds the {} pixel limit",
                width, height, max_pixels
            )));
        }

        let len = pixels as usize * 3;
        let mut buffer: Vec<u8> = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|e| CardpressError::Canvas(format!("Failed to allocate {}x{}: {}", width, height, e)))?;

        // Background alpha is ignored: the canvas is opaque.
        let [r, g, b] = [background.r, background.g, background.b];
        for _ in 0..pixels {
            buffer.extend_from_slice(&[r, g, b]);
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| CardpressError::Canvas("buffer size mismatch".into()))?;
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Consume the target, yielding its pixels.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Visible part of a `width × height` box whose top-left is at (x, y),
    /// or `None` when it misses the canvas entirely.
    pub fn visible_window(&self, x: i64, y: i64, width: i64, height: i64) -> Option<ClipWindow> {
        let span = |pos: i64, len: i64, canvas: u32| {
            let start = pos.saturating_neg().max(0);
            let end = len.min((canvas as i64).saturating_sub(pos));
            (start < end).then_some((start, end))
        };
        let (x0, x1) = span(x, width, self.width())?;
        let (y0, y1) = span(y, height, self.height())?;
        Some(ClipWindow {
            x: x0,
            y: y0,
            width: (x1 - x0) as usize,
            height: (y1 - y0) as usize,
        })
    }

    /// Blend `color` into one pixel with the given coverage (0..=1).
    #[inline]
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let alpha = (coverage * color.alpha()).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        *dst = mix(*dst, [color.r, color.g, color.b], alpha);
    }

    /// Composite a coverage mask tinted with `color`, its top-left at (x, y).
    pub fn draw_mask(&mut self, mask: &CoverageMask, x: i64, y: i64, color: Color) {
        for my in 0..mask.height {
            let ty = y + my as i64;
            if ty < 0 || ty >= self.height() as i64 {
                continue;
            }
            for mx in 0..mask.width {
                let coverage = mask.get(mx, my);
                if coverage > 0.0 {
                    self.blend_pixel(x + mx as i64, ty, color, coverage);
                }
            }
        }
    }

    /// Composite an RGBA image, its top-left at (x, y), scaled by `opacity`.
    pub fn draw_image(&mut self, src: &RgbaImage, x: i64, y: i64, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        let (cw, ch) = (self.width() as i64, self.height() as i64);

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.width() as i64).min(cw);
        let y1 = (y + src.height() as i64).min(ch);

        for ty in y0..y1 {
            for tx in x0..x1 {
                let p = src.get_pixel((tx - x) as u32, (ty - y) as u32);
                let alpha = p[3] as f32 / 255.0 * opacity;
                if alpha <= 0.0 {
                    continue;
                }
                let dst = self.image.get_pixel_mut(tx as u32, ty as u32);
                *dst = mix(*dst, [p[0], p[1], p[2]], alpha);
            }
        }
    }
}

#[inline]
fn mix(dst: Rgb<u8>, src: [u8; 3], alpha: f32) -> Rgb<u8> {
    if alpha >= 1.0 {
        return Rgb(src);
    }
    let blend = |d: u8, s: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    Rgb([
        blend(dst[0], src[0]),
        blend(dst[1], src[1]),
        blend(dst[2], src[2]),
    ])
}
