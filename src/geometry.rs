//! # Geometry Conversion
//!
//! Maps authoring units to device pixels at a target resolution.
//!
//! ```text
//! px        = round(mm   * dpi / 25.4)
//! font_px   = round(size * dpi / 96)
//! ```
//!
//! Positions and sizes are authored in millimeters, but font sizes are
//! authored in the editor's screen-pixel convention (96 per inch), so the
//! two conversions use different divisors.
//!
//! ```
//! use cardpress::geometry::{font_size_px, mm_to_px};
//!
//! assert_eq!(mm_to_px(150.0, 150), 886);
//! assert_eq!(mm_to_px(210.0, 150), 1240);
//! assert_eq!(font_size_px(24.0, 300), 75);
//! ```

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Font size reference: authored sizes are pixels at 96 per inch.
pub const FONT_UNITS_PER_INCH: f64 = 96.0;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Device coordinates are clamped to ±2^40 px. No canvas comes close, and
/// sums of a position and an extent stay far from `i64` overflow.
pub const MAX_DEVICE_PX: i64 = 1 << 40;

/// Unrounded millimeters to device pixels, for sub-pixel lengths such as
/// stroke widths.
#[inline]
pub fn mm_to_px_f(value_mm: f64, dpi: u32) -> f64 {
    value_mm * dpi as f64 / MM_PER_INCH
}

/// Convert millimeters to device pixels at `dpi`.
///
/// Signed so that elements positioned partially off-canvas keep their
/// offset; the canvas clips them.
#[inline]
pub fn mm_to_px(value_mm: f64, dpi: u32) -> i64 {
    let px = mm_to_px_f(value_mm, dpi).round();
    if px.is_nan() {
        return 0;
    }
    (px as i64).clamp(-MAX_DEVICE_PX, MAX_DEVICE_PX)
}

/// Convert a canvas dimension in millimeters to pixels, clamped at zero.
#[inline]
pub fn mm_to_px_extent(value_mm: f64, dpi: u32) -> u32 {
    mm_to_px(value_mm, dpi).clamp(0, u32::MAX as i64) as u32
}

/// Convert an authored font size to a device pixel size at `dpi`.
#[inline]
pub fn font_size_px(source_size: f64, dpi: u32) -> u32 {
    (source_size * dpi as f64 / FONT_UNITS_PER_INCH)
        .round()
        .clamp(0.0, u32::MAX as f64) as u32
}

/// Convert a pixel length at `dpi` to PDF points.
#[inline]
pub fn px_to_points(px: u32, dpi: u32) -> f32 {
    (px as f64 * POINTS_PER_INCH / dpi as f64) as f32
}
