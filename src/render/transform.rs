//! Rotation of coverage masks and RGBA images.
//!
//! Angles are in degrees, counter-clockwise as seen on the page (y grows
//! downward). The output is enlarged to hold the rotated content; uncovered
//! corners are empty (zero coverage / transparent).
//!
//! Both rotate about a pivot and report where that pivot ended up in the new
//! buffer, so callers can keep an anchor point fixed on the page.

use image::{Rgba, RgbaImage};

use super::target::CoverageMask;

/// Rotate a point around the origin, counter-clockwise on screen.
#[inline]
pub fn rotate_point(dx: f32, dy: f32, angle_deg: f32) -> (f32, f32) {
    let (s, c) = angle_deg.to_radians().sin_cos();
    (dx * c + dy * s, -dx * s + dy * c)
}

/// Geometry shared by mask and image rotation.
struct Frame {
    cos: f32,
    sin: f32,
    /// Top-left of the output, relative to the pivot.
    min_x: f32,
    min_y: f32,
    width: usize,
    height: usize,
    pivot: (f32, f32),
}

impl Frame {
    fn new(width: usize, height: usize, angle_deg: f32, pivot: (f32, f32)) -> Self {
        let corners = [
            (0.0, 0.0),
            (width as f32, 0.0),
            (0.0, height as f32),
            (width as f32, height as f32),
        ];
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        // trig noise (cos 90° ≈ -4e-8) must not add a pixel row
        let snap = |v: f32| if (v - v.round()).abs() < 1e-3 { v.round() } else { v };
        for (cx, cy) in corners {
            let (rx, ry) = rotate_point(cx - pivot.0, cy - pivot.1, angle_deg);
            let (rx, ry) = (snap(rx), snap(ry));
            min_x = min_x.min(rx);
            min_y = min_y.min(ry);
            max_x = max_x.max(rx);
            max_y = max_y.max(ry);
        }
        let min_x = min_x.floor();
        let min_y = min_y.floor();
        let (sin, cos) = angle_deg.to_radians().sin_cos();

        Self {
            cos,
            sin,
            min_x,
            min_y,
            width: (max_x.ceil() - min_x).max(0.0) as usize,
            height: (max_y.ceil() - min_y).max(0.0) as usize,
            pivot,
        }
    }

    /// Source coordinates (pixel-center space) for output pixel (x, y).
    #[inline]
    fn source(&self, x: usize, y: usize) -> (f32, f32) {
        let dx = x as f32 + 0.5 + self.min_x;
        let dy = y as f32 + 0.5 + self.min_y;
        // inverse rotation
        let sx = dx * self.cos - dy * self.sin;
        let sy = dx * self.sin + dy * self.cos;
        (sx + self.pivot.0 - 0.5, sy + self.pivot.1 - 0.5)
    }

    /// Where the pivot sits in the output buffer.
    fn new_pivot(&self) -> (f32, f32) {
        (-self.min_x, -self.min_y)
    }
}

/// Size of the buffer [`rotate_mask`] or [`rotate_image`] would allocate for
/// a `width × height` source, without allocating it.
pub fn rotated_extent(width: usize, height: usize, angle_deg: f32, pivot: (f32, f32)) -> (usize, usize) {
    if angle_deg.rem_euclid(360.0) == 0.0 {
        return (width, height);
    }
    let frame = Frame::new(width, height, angle_deg, pivot);
    (frame.width, frame.height)
}

/// Bilinear taps around (sx, sy): ((x, y), weight).
#[inline]
fn taps(sx: f32, sy: f32) -> [((i64, i64), f32); 4] {
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);
    [
        ((x0, y0), (1.0 - fx) * (1.0 - fy)),
        ((x0 + 1, y0), fx * (1.0 - fy)),
        ((x0, y0 + 1), (1.0 - fx) * fy),
        ((x0 + 1, y0 + 1), fx * fy),
    ]
}

/// Rotate a coverage mask about `pivot`. Returns the new mask and pivot.
pub fn rotate_mask(mask: &CoverageMask, angle_deg: f32, pivot: (f32, f32)) -> (CoverageMask, (f32, f32)) {
    if angle_deg.rem_euclid(360.0) == 0.0 || mask.is_empty() {
        return (mask.clone(), pivot);
    }

    let frame = Frame::new(mask.width, mask.height, angle_deg, pivot);
    let mut out = CoverageMask::new(frame.width, frame.height);

    for y in 0..frame.height {
        for x in 0..frame.width {
            let (sx, sy) = frame.source(x, y);
            let mut value = 0.0;
            for ((px, py), w) in taps(sx, sy) {
                if w > 0.0 && px >= 0 && py >= 0 && (px as usize) < mask.width && (py as usize) < mask.height {
                    value += mask.get(px as usize, py as usize) * w;
                }
            }
            if value > 0.0 {
                out.data[y * frame.width + x] = value.min(1.0);
            }
        }
    }

    (out, frame.new_pivot())
}

/// Rotate an image about its center, growing the canvas to fit.
pub fn rotate_image(image: &RgbaImage, angle_deg: f32) -> RgbaImage {
    if angle_deg.rem_euclid(360.0) == 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let (w, h) = (image.width() as usize, image.height() as usize);
    let frame = Frame::new(w, h, angle_deg, (w as f32 / 2.0, h as f32 / 2.0));
    let mut out = RgbaImage::new(frame.width as u32, frame.height as u32);

    for y in 0..frame.height {
        for x in 0..frame.width {
            let (sx, sy) = frame.source(x, y);
            // premultiplied accumulation keeps transparent edges from darkening
            let mut acc = [0.0f32; 4];
            for ((px, py), wt) in taps(sx, sy) {
                if wt <= 0.0 || px < 0 || py < 0 || px as usize >= w || py as usize >= h {
                    continue;
                }
                let p = image.get_pixel(px as u32, py as u32);
                let a = p[3] as f32 / 255.0 * wt;
                acc[0] += p[0] as f32 * a;
                acc[1] += p[1] as f32 * a;
                acc[2] += p[2] as f32 * a;
                acc[3] += a;
            }
            if acc[3] > 0.0 {
                let alpha = acc[3].min(1.0);
                out.put_pixel(
                    x as u32,
                    y as u32,
                    Rgba([
                        (acc[0] / acc[3]).round().clamp(0.0, 255.0) as u8,
                        (acc[1] / acc[3]).round().clamp(0.0, 255.0) as u8,
                        (acc[2] / acc[3]).round().clamp(0.0, 255.0) as u8,
                        (alpha * 255.0).round() as u8,
                    ]),
                );
            }
        }
    }

    out
}
