//! Text element rendering.
//!
//! The text block is laid out into a coverage mask first, then rotated about
//! its anchor, then tinted onto the canvas:
//!
//! ```text
//!  anchor (x, y) ──► align: left | center | right   (x is left edge / middle / right edge)
//!                    valign: top | center | bottom  (y is top / middle / bottom of the block)
//! ```
//!
//! The authored rotation is negated before it is applied as a
//! counter-clockwise rotation, so a positive authored angle turns the text
//! clockwise on the page.

use super::DrawContext;
use super::font::{Face, LineMetrics};
use super::target::{CoverageMask, RenderTarget};
use super::transform::{rotate_mask, rotated_extent};
use crate::card::{Align, TextElement, VAlign};
use crate::geometry::{font_size_px, mm_to_px};

/// Greedy word wrap.
///
/// Words are accumulated into a line while `measure(line) <= max_width`. A
/// single word wider than the limit is emitted on its own line, unmodified.
/// Explicit newlines always break.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", line, word);
            if measure(&candidate) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            }
        }
        lines.push(line);
    }

    lines
}

/// Rasterize `lines` into `mask`, shifted by `offset` (block-local to
/// mask-local). Lines entirely outside the mask are not drawn.
fn layout(mask: &mut CoverageMask, block: &Block<'_>, face: &Face, offset: (f32, f32)) {
    for (i, (line, width)) in block.lines.iter().zip(&block.widths).enumerate() {
        let top = i as f32 * block.metrics.line_height + offset.1;
        if top >= mask.height as f32 || top + block.metrics.line_height <= 0.0 {
            continue;
        }
        let x = match block.align {
            Align::Left => 0.0,
            Align::Center => (block.width as f32 - width) / 2.0,
            Align::Right => block.width as f32 - width,
        };
        face.draw_line(mask, line, x + offset.0, top + block.metrics.ascent, block.px);
    }
}

/// Laid-out text block, before rasterizing.
struct Block<'a> {
    lines: &'a [String],
    widths: Vec<f32>,
    metrics: LineMetrics,
    align: Align,
    px: f32,
    width: usize,
    height: usize,
}

/// Draw a text element onto the target.
///
/// The whole block must fit the buffer limit, since glyph rasterizing cost
/// follows the glyph size. Unrotated blocks only allocate the part that
/// lands on the canvas.
pub fn draw(el: &TextElement, target: &mut RenderTarget, ctx: &mut DrawContext<'_>) {
    let px = font_size_px(el.font_size, ctx.dpi) as f32;
    if px <= 0.0 || el.text.is_empty() {
        return;
    }

    let face = ctx.fonts.face(&el.font_family);

    let lines: Vec<String> = match el.wrap_width {
        Some(wrap_mm) => {
            let limit = mm_to_px(wrap_mm, ctx.dpi) as f32;
            wrap_words(&el.text, limit, |s| face.measure(s, px))
        }
        None => el.text.split('\n').map(str::to_string).collect(),
    };

    let metrics = face.line_metrics(px);
    let widths: Vec<f32> = lines.iter().map(|l| face.measure(l, px)).collect();
    let block_w = widths.iter().copied().fold(0.0f32, f32::max).ceil().max(1.0) as u64;
    let block_h = (metrics.line_height * lines.len() as f32).ceil().max(1.0) as u64;
    if !ctx.buffer_fits("text", block_w, block_h) {
        return;
    }

    let block = Block {
        lines: &lines,
        widths,
        metrics,
        align: el.align,
        px,
        width: block_w as usize,
        height: block_h as usize,
    };

    let anchor_x = match el.align {
        Align::Left => 0.0,
        Align::Center => block.width as f32 / 2.0,
        Align::Right => block.width as f32,
    };
    let anchor_y = match el.valign {
        VAlign::Top => 0.0,
        VAlign::Center => block.height as f32 / 2.0,
        VAlign::Bottom => block.height as f32,
    };
    let (ax, ay) = (mm_to_px(el.x, ctx.dpi), mm_to_px(el.y, ctx.dpi));

    let (mask, x, y) = match el.rotation.filter(|r| *r != 0.0) {
        Some(r) => {
            let angle = -r as f32;
            let (rw, rh) = rotated_extent(block.width, block.height, angle, (anchor_x, anchor_y));
            if !ctx.buffer_fits("rotated text", rw as u64, rh as u64) {
                return;
            }
            let mut mask = CoverageMask::new(block.width, block.height);
            layout(&mut mask, &block, &face, (0.0, 0.0));
            let (mask, (pivot_x, pivot_y)) = rotate_mask(&mask, angle, (anchor_x, anchor_y));
            (mask, ax - pivot_x.round() as i64, ay - pivot_y.round() as i64)
        }
        None => {
            let x = ax - anchor_x.round() as i64;
            let y = ay - anchor_y.round() as i64;
            let Some(window) = target.visible_window(x, y, block.width as i64, block.height as i64) else {
                return;
            };
            let mut mask = CoverageMask::new(window.width, window.height);
            layout(&mut mask, &block, &face, (-window.x as f32, -window.y as f32));
            (mask, x + window.x, y + window.y)
        }
    };

    log::debug!(
        "text '{}' {}px, {} line(s) at ({}, {})",
        el.text.chars().take(24).collect::<String>(),
        px,
        lines.len(),
        x,
        y
    );

    target.draw_mask(&mask, x, y, el.color);
}
