//! Standalone raster encoders (PNG, JPEG).

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::config::RasterFormat;
use crate::error::CardpressError;

/// Encode as PNG.
pub fn encode_png(raster: &RgbImage) -> Result<Vec<u8>, CardpressError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e: image::ImageError| CardpressError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Encode as baseline JPEG at `quality` (1..=100).
pub fn encode_jpeg(raster: &RgbImage, quality: u8) -> Result<Vec<u8>, CardpressError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e: image::ImageError| CardpressError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Encode in the requested format.
pub fn encode(raster: &RgbImage, format: RasterFormat) -> Result<Vec<u8>, CardpressError> {
    match format {
        RasterFormat::Png => encode_png(raster),
        RasterFormat::Jpeg { quality } => encode_jpeg(raster, quality),
    }
}
