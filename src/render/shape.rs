//! Shape element rendering.
//!
//! Each primitive is rasterized into coverage masks (fill and stroke) with
//! 4×4 supersampling, optionally rotated about the shape's center, and
//! tinted onto the canvas. Strokes sit inside the shape's box.
//!
//! | Kind | Geometry | Paint |
//! |------|----------|-------|
//! | rectangle | box `(x, y, w, h)` | fill, then stroke |
//! | ellipse | inscribed in the box | fill, then stroke |
//! | line | `(x, y)` → `(x + w, y + h)` | stroke (or fill, or black) |
//!
//! Unrotated shapes and lines are only sampled where they overlap the
//! canvas. Rotated shapes need their whole mask and are skipped when it
//! exceeds the buffer limit.

use super::DrawContext;
use super::target::{ClipWindow, CoverageMask, RenderTarget};
use super::transform::{rotate_mask, rotated_extent};
use crate::card::{Color, ShapeElement, ShapeKind};
use crate::geometry::{mm_to_px, mm_to_px_f};

const SUBSAMPLES: usize = 4;

/// Rasterize `window` of a shape with supersampling. `inside(px, py)` is
/// evaluated in shape-local pixel space.
fn supersample(window: &ClipWindow, inside: impl Fn(f32, f32) -> bool) -> CoverageMask {
    let mut mask = CoverageMask::new(window.width, window.height);
    let step = 1.0 / SUBSAMPLES as f32;
    let weight = 1.0 / (SUBSAMPLES * SUBSAMPLES) as f32;

    for y in 0..window.height {
        let oy = (window.y + y as i64) as f32;
        for x in 0..window.width {
            let ox = (window.x + x as i64) as f32;
            let mut hits = 0;
            for sy in 0..SUBSAMPLES {
                for sx in 0..SUBSAMPLES {
                    let px = ox + (sx as f32 + 0.5) * step;
                    let py = oy + (sy as f32 + 0.5) * step;
                    if inside(px, py) {
                        hits += 1;
                    }
                }
            }
            if hits > 0 {
                mask.data[y * window.width + x] = hits as f32 * weight;
            }
        }
    }
    mask
}

fn rectangle_masks(w: f32, h: f32, stroke: f32, window: &ClipWindow) -> (CoverageMask, CoverageMask) {
    let fill = supersample(window, |_, _| true);
    let outline = supersample(window, |x, y| {
        x < stroke || y < stroke || x > w - stroke || y > h - stroke
    });
    (fill, outline)
}

fn ellipse_masks(w: f32, h: f32, stroke: f32, window: &ClipWindow) -> (CoverageMask, CoverageMask) {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let in_ellipse = move |x: f32, y: f32, rx: f32, ry: f32| {
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let nx = (x - cx) / rx;
        let ny = (y - cy) / ry;
        nx * nx + ny * ny <= 1.0
    };
    let fill = supersample(window, |x, y| in_ellipse(x, y, cx, cy));
    let outline = supersample(window, |x, y| {
        in_ellipse(x, y, cx, cy) && !in_ellipse(x, y, cx - stroke, cy - stroke)
    });
    (fill, outline)
}

/// Distance from (px, py) to the segment (0,0)-(dx,dy).
fn segment_distance(px: f32, py: f32, dx: f32, dy: f32) -> f32 {
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        ((px * dx + py * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (qx, qy) = (px - t * dx, py - t * dy);
    (qx * qx + qy * qy).sqrt()
}

/// Fill and stroke of an unrotated or rotated rectangle/ellipse.
fn draw_box(el: &ShapeElement, target: &mut RenderTarget, ctx: &DrawContext<'_>, rect: (i64, i64, i64, i64), stroke: f32) {
    let (x, y, w, h) = rect;
    if w <= 0 || h <= 0 {
        return;
    }
    let fill = el.fill;
    let outline = el.stroke.filter(|_| stroke > 0.0);
    if fill.is_none() && outline.is_none() {
        return;
    }

    let masks = |window: &ClipWindow| match el.shape {
        ShapeKind::Ellipse => ellipse_masks(w as f32, h as f32, stroke, window),
        _ => rectangle_masks(w as f32, h as f32, stroke, window),
    };

    match el.rotation.filter(|r| *r != 0.0) {
        None => {
            let Some(window) = target.visible_window(x, y, w, h) else {
                return;
            };
            let (fill_mask, outline_mask) = masks(&window);
            for (mask, color) in [(fill_mask, fill), (outline_mask, outline)] {
                if let Some(color) = color {
                    target.draw_mask(&mask, x + window.x, y + window.y, color);
                }
            }
        }
        Some(r) => {
            let angle = -r as f32;
            if !ctx.buffer_fits(el.shape.label(), w as u64, h as u64) {
                return;
            }
            let (w, h) = (w as usize, h as usize);
            let center = (w as f32 / 2.0, h as f32 / 2.0);
            let (rw, rh) = rotated_extent(w, h, angle, center);
            if !ctx.buffer_fits(el.shape.label(), rw as u64, rh as u64) {
                return;
            }

            let window = ClipWindow {
                x: 0,
                y: 0,
                width: w,
                height: h,
            };
            let (fill_mask, outline_mask) = masks(&window);
            for (mask, color) in [(fill_mask, fill), (outline_mask, outline)] {
                let Some(color) = color else { continue };
                let (mask, pivot) = rotate_mask(&mask, angle, center);
                let ox = x + (center.0 - pivot.0).round() as i64;
                let oy = y + (center.1 - pivot.1).round() as i64;
                target.draw_mask(&mask, ox, oy, color);
            }
        }
    }
}

/// A line from (x, y) to (x + dx, y + dy), sampled only over the canvas.
fn draw_line(target: &mut RenderTarget, start: (i64, i64), delta: (i64, i64), stroke: f32, color: Color) {
    let half = (stroke / 2.0).max(0.5) as f64;
    let (x, y) = start;
    let (dx, dy) = delta;
    let min_x = (x.min(x + dx) as f64 - half).floor() as i64;
    let min_y = (y.min(y + dy) as f64 - half).floor() as i64;
    let max_x = (x.max(x + dx) as f64 + half).ceil() as i64;
    let max_y = (y.max(y + dy) as f64 + half).ceil() as i64;

    let Some(window) = target.visible_window(min_x, min_y, max_x - min_x, max_y - min_y) else {
        return;
    };
    // sample positions relative to the line start
    let (ox, oy) = ((min_x - x) as f32, (min_y - y) as f32);
    let half = half as f32;
    let mask = supersample(&window, |px, py| {
        segment_distance(px + ox, py + oy, dx as f32, dy as f32) <= half
    });
    target.draw_mask(&mask, min_x + window.x, min_y + window.y, color);
}

/// Draw a shape element onto the target.
pub fn draw(el: &ShapeElement, target: &mut RenderTarget, ctx: &mut DrawContext<'_>) {
    let x = mm_to_px(el.x, ctx.dpi);
    let y = mm_to_px(el.y, ctx.dpi);
    let w = mm_to_px(el.width, ctx.dpi);
    let h = mm_to_px(el.height, ctx.dpi);
    let stroke_px = mm_to_px_f(el.stroke_width, ctx.dpi).max(0.0) as f32;

    log::debug!("{} {}x{} at ({}, {})", el.shape.label(), w, h, x, y);

    match el.shape {
        ShapeKind::Rectangle | ShapeKind::Ellipse => draw_box(el, target, ctx, (x, y, w, h), stroke_px),
        ShapeKind::Line => {
            let color = el.stroke.or(el.fill).unwrap_or(Color::BLACK);
            draw_line(target, (x, y), (w, h), stroke_px, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use image::Rgb;

    fn render(el: &ShapeElement) -> RenderTarget {
        let assets = MemoryAssets::new();
        let mut ctx = DrawContext::new(&assets, 254); // 10 px per mm
        let mut target = RenderTarget::new(200, 200, Color::WHITE, u64::MAX).unwrap();
        draw(el, &mut target, &mut ctx);
        target
    }

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_filled_rectangle() {
        let mut el = ShapeElement::new(ShapeKind::Rectangle, 1.0, 2.0, 3.0, 4.0);
        el.fill = Some(RED);
        let target = render(&el);
        assert_eq!(*target.image().get_pixel(10, 20), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(39, 59), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(40, 20), WHITE);
        assert_eq!(*target.image().get_pixel(10, 60), WHITE);
        assert_eq!(*target.image().get_pixel(9, 19), WHITE);
    }

    #[test]
    fn test_stroke_only_rectangle_is_hollow() {
        let mut el = ShapeElement::new(ShapeKind::Rectangle, 1.0, 1.0, 10.0, 10.0);
        el.stroke = Some(BLUE);
        el.stroke_width = 0.5; // 5px
        let target = render(&el);
        assert_eq!(*target.image().get_pixel(12, 50), Rgb([0, 0, 255]));
        assert_eq!(*target.image().get_pixel(60, 60), WHITE);
    }

    #[test]
    fn test_sub_pixel_stroke_is_drawn() {
        let mut el = ShapeElement::new(ShapeKind::Rectangle, 1.0, 1.0, 10.0, 10.0);
        el.stroke = Some(BLUE);
        el.stroke_width = 0.04; // 0.4px, half of the first column
        let target = render(&el);
        let edge = target.image().get_pixel(10, 50);
        assert_eq!(edge[2], 255);
        assert!(edge[0] > 100 && edge[0] < 160, "{:?}", edge);
        assert_eq!(*target.image().get_pixel(11, 50), WHITE);
    }

    #[test]
    fn test_ellipse_corners_are_empty() {
        let mut el = ShapeElement::new(ShapeKind::Ellipse, 0.0, 0.0, 10.0, 10.0);
        el.fill = Some(RED);
        let target = render(&el);
        assert_eq!(*target.image().get_pixel(50, 50), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(1, 1), WHITE);
        assert_eq!(*target.image().get_pixel(98, 98), WHITE);
    }

    #[test]
    fn test_line_defaults_to_black() {
        let mut el = ShapeElement::new(ShapeKind::Line, 1.0, 5.0, 10.0, 0.0);
        el.stroke_width = 0.3;
        let target = render(&el);
        assert_eq!(*target.image().get_pixel(50, 50), Rgb([0, 0, 0]));
        assert_eq!(*target.image().get_pixel(50, 60), WHITE);
        assert_eq!(*target.image().get_pixel(150, 50), WHITE);
    }

    #[test]
    fn test_line_with_negative_extent() {
        let mut el = ShapeElement::new(ShapeKind::Line, 10.0, 10.0, -5.0, -5.0);
        el.stroke = Some(RED);
        el.stroke_width = 0.4;
        let target = render(&el);
        assert_eq!(*target.image().get_pixel(75, 75), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(120, 120), WHITE);
    }

    #[test]
    fn test_rotated_rectangle_stays_centered() {
        let mut el = ShapeElement::new(ShapeKind::Rectangle, 5.0, 5.0, 10.0, 2.0);
        el.fill = Some(RED);
        el.rotation = Some(90.0);
        let target = render(&el);
        // center (100, 60) is preserved; the bar now runs vertically
        assert_eq!(*target.image().get_pixel(100, 60), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(100, 20), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(60, 60), WHITE);
    }

    #[test]
    fn test_partially_off_canvas_rectangle_is_clipped() {
        let mut el = ShapeElement::new(ShapeKind::Rectangle, -5.0, 15.0, 10.0, 10.0);
        el.fill = Some(RED);
        let target = render(&el);
        assert_eq!(*target.image().get_pixel(0, 150), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(49, 199), Rgb([255, 0, 0]));
        assert_eq!(*target.image().get_pixel(50, 150), WHITE);
    }

    #[test]
    fn test_huge_rectangle_covers_canvas() {
        // the inset stroke on the near edges falls just off the canvas
        let mut el = ShapeElement::new(ShapeKind::Rectangle, -1.0, -1.0, 1e12, 1e12);
        el.fill = Some(RED);
        el.stroke = Some(BLUE);
        let target = render(&el);
        assert!(target.image().pixels().all(|p| *p == Rgb([255, 0, 0])));
    }

    #[test]
    fn test_huge_ellipse_and_line_complete() {
        let mut ellipse = ShapeElement::new(ShapeKind::Ellipse, -1e9, -1e9, 2e9, 2e9);
        ellipse.fill = Some(BLUE);
        let target = render(&ellipse);
        // the canvas sits deep inside the ellipse
        assert_eq!(*target.image().get_pixel(100, 100), Rgb([0, 0, 255]));

        let mut line = ShapeElement::new(ShapeKind::Line, 0.0, 5.0, 1e12, 0.0);
        line.stroke_width = 1e9;
        let target = render(&line);
        assert!(target.image().pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_huge_rotated_rectangle_is_skipped() {
        let mut el = ShapeElement::new(ShapeKind::Rectangle, 0.0, 0.0, 1e12, 1e12);
        el.fill = Some(RED);
        el.rotation = Some(10.0);
        let target = render(&el);
        assert!(target.image().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_rotated_rectangle_above_buffer_limit_is_skipped() {
        let assets = MemoryAssets::new();
        let mut ctx = DrawContext::new(&assets, 254).with_buffer_limit(1_000);
        let mut target = RenderTarget::new(200, 200, Color::WHITE, u64::MAX).unwrap();
        let mut el = ShapeElement::new(ShapeKind::Rectangle, 1.0, 1.0, 10.0, 10.0);
        el.fill = Some(RED);
        el.rotation = Some(45.0);
        draw(&el, &mut target, &mut ctx);
        assert!(target.image().pixels().all(|p| *p == WHITE));

        // the unrotated box is clipped to the canvas, not budgeted
        el.rotation = None;
        draw(&el, &mut target, &mut ctx);
        assert_eq!(*target.image().get_pixel(50, 50), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_degenerate_box_draws_nothing() {
        let mut el = ShapeElement::new(ShapeKind::Rectangle, 1.0, 1.0, 0.0, 5.0);
        el.fill = Some(RED);
        let target = render(&el);
        assert!(target.image().pixels().all(|p| *p == WHITE));
    }
}
