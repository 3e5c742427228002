//! Font faces for text elements.
//!
//! Families resolve through the [`AssetSource`] to TrueType/OpenType bytes and
//! are rasterized with `ab_glyph`. When a family cannot be found or decoded
//! the built-in face is used instead: the Spleen 12×24 bitmap font, scaled
//! nearest-neighbour to the requested pixel size.
//!
//! A [`FontBook`] lives for one page render. Faces are decoded at most once
//! per family per page and dropped with the book.

use ab_glyph::{Font, FontArc, ScaleFont, point};
use spleen_font::{FONT_12X24, PSF2Font};
use std::collections::HashMap;

use super::target::CoverageMask;
use crate::assets::AssetSource;

/// Native cell size of the built-in bitmap face.
const BITMAP_CELL_W: usize = 12;
const BITMAP_CELL_H: usize = 24;
/// Baseline row inside the 24-row Spleen cell.
const BITMAP_ASCENT: f32 = 19.0;

/// Vertical metrics at a given pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
}

/// A resolved font face.
#[derive(Clone)]
pub enum Face {
    /// Outline font loaded from the asset source.
    Outline(FontArc),
    /// Built-in Spleen bitmap face.
    Builtin,
}

impl Face {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Face::Builtin)
    }

    pub fn line_metrics(&self, px: f32) -> LineMetrics {
        match self {
            Face::Outline(font) => {
                let scaled = font.as_scaled(px);
                let ascent = scaled.ascent();
                let descent = scaled.descent();
                LineMetrics {
                    ascent,
                    descent,
                    line_height: (ascent - descent + scaled.line_gap()).ceil(),
                }
            }
            Face::Builtin => {
                let scale = px / BITMAP_CELL_H as f32;
                LineMetrics {
                    ascent: BITMAP_ASCENT * scale,
                    descent: -(BITMAP_CELL_H as f32 - BITMAP_ASCENT) * scale,
                    line_height: px.ceil(),
                }
            }
        }
    }

    /// Advance width of `text` on one line at `px`.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        match self {
            Face::Outline(font) => {
                let scaled = font.as_scaled(px);
                let mut width = 0.0;
                let mut prev = None;
                for ch in text.chars() {
                    let id = font.glyph_id(ch);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width
            }
            Face::Builtin => text.chars().count() as f32 * builtin_advance(px),
        }
    }

    /// Rasterize one line into `mask` with its baseline at `baseline` and its
    /// left edge at `x`.
    pub fn draw_line(&self, mask: &mut CoverageMask, text: &str, x: f32, baseline: f32, px: f32) {
        match self {
            Face::Outline(font) => {
                let scaled = font.as_scaled(px);
                let mut caret = x;
                let mut prev = None;
                for ch in text.chars() {
                    let id = font.glyph_id(ch);
                    if let Some(p) = prev {
                        caret += scaled.kern(p, id);
                    }
                    let glyph = id.with_scale_and_position(px, point(caret, baseline));
                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, coverage| {
                            mask.add(
                                gx as i64 + bounds.min.x as i64,
                                gy as i64 + bounds.min.y as i64,
                                coverage,
                            );
                        });
                    }
                    caret += scaled.h_advance(id);
                    prev = Some(id);
                }
            }
            Face::Builtin => draw_builtin_line(mask, text, x, baseline, px),
        }
    }
}

#[inline]
fn builtin_advance(px: f32) -> f32 {
    BITMAP_CELL_W as f32 * px / BITMAP_CELL_H as f32
}

/// One glyph as a 12×24 on/off grid, from Spleen rows. Unknown glyphs become a box.
fn builtin_cell(ch: char, rows: Option<Vec<Vec<bool>>>) -> Vec<bool> {
    let mut cell = vec![false; BITMAP_CELL_W * BITMAP_CELL_H];
    if ch == ' ' {
        return cell;
    }

    match rows {
        Some(rows) => {
            for (row_y, row) in rows.iter().enumerate().take(BITMAP_CELL_H) {
                for (col_x, &on) in row.iter().enumerate().take(BITMAP_CELL_W) {
                    cell[row_y * BITMAP_CELL_W + col_x] = on;
                }
            }
        }
        None => {
            for x in 0..BITMAP_CELL_W {
                cell[x] = true;
                cell[(BITMAP_CELL_H - 1) * BITMAP_CELL_W + x] = true;
            }
            for y in 0..BITMAP_CELL_H {
                cell[y * BITMAP_CELL_W] = true;
                cell[y * BITMAP_CELL_W + BITMAP_CELL_W - 1] = true;
            }
        }
    }
    cell
}

fn draw_builtin_line(mask: &mut CoverageMask, text: &str, x: f32, baseline: f32, px: f32) {
    let mut spleen = PSF2Font::new(FONT_12X24).ok();
    let scale = px / BITMAP_CELL_H as f32;
    let advance = builtin_advance(px);
    let top = (baseline - BITMAP_ASCENT * scale).round() as i64;
    let dst_w = advance.round().max(1.0) as usize;
    let dst_h = px.round().max(1.0) as usize;
    let mut glyphs: HashMap<char, Vec<bool>> = HashMap::new();

    for (i, ch) in text.chars().enumerate() {
        let cell = glyphs.entry(ch).or_insert_with(|| {
            let mut utf8 = [0u8; 4];
            let rows = spleen
                .as_mut()
                .and_then(|font| font.glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes()))
                .map(|glyph| glyph.map(|row| row.collect::<Vec<bool>>()).collect::<Vec<_>>());
            builtin_cell(ch, rows)
        });
        let left = (x + i as f32 * advance).round() as i64;

        // nearest-neighbour scale from the 12×24 cell
        for dy in 0..dst_h {
            let sy = dy * BITMAP_CELL_H / dst_h;
            for dx in 0..dst_w {
                let sx = dx * BITMAP_CELL_W / dst_w;
                if cell[sy * BITMAP_CELL_W + sx] {
                    mask.add(left + dx as i64, top + dy as i64, 1.0);
                }
            }
        }
    }
}

/// Per-render cache of resolved faces.
pub struct FontBook<'a> {
    assets: &'a dyn AssetSource,
    faces: HashMap<String, Face>,
}

impl<'a> FontBook<'a> {
    pub fn new(assets: &'a dyn AssetSource) -> Self {
        Self {
            assets,
            faces: HashMap::new(),
        }
    }

    /// Resolve `family`, falling back to the built-in face.
    pub fn face(&mut self, family: &str) -> Face {
        if let Some(face) = self.faces.get(family) {
            return face.clone();
        }

        let face = match self.assets.font_bytes(family) {
            Some(bytes) => match FontArc::try_from_vec(bytes) {
                Ok(font) => Face::Outline(font),
                Err(e) => {
                    log::warn!("font '{}' could not be decoded ({}), using built-in face", family, e);
                    Face::Builtin
                }
            },
            None => {
                log::warn!("font '{}' not found, using built-in face", family);
                Face::Builtin
            }
        };

        self.faces.insert(family.to_string(), face.clone());
        face
    }
}
