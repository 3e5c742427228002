//! # Render Configuration
//!
//! Resolution and encoding settings for the two output modes.
//!
//! | Profile | DPI | Output |
//! |---------|-----|--------|
//! | Preview | 150 | PNG raster |
//! | Print   | 300 | PDF, one JPEG (quality 100) page image per logical page |
//!
//! ## Usage
//!
//! ```
//! use cardpress::config::{PageEncoding, RenderConfig};
//!
//! let config = RenderConfig::from_json(r#"{"print": {"dpi": 600, "encoding": {"kind": "flate"}}}"#).unwrap();
//! assert_eq!(config.preview.dpi, 150);
//! assert_eq!(config.print.dpi, 600);
//! assert_eq!(config.print.encoding, PageEncoding::Flate);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CardpressError;

/// Encoding of a standalone raster (preview output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RasterFormat {
    Png,
    Jpeg { quality: u8 },
}

impl RasterFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Encoding of page images embedded in the print document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEncoding {
    /// DCT-compressed page images.
    Jpeg { quality: u8 },
    /// Lossless zlib-compressed RGB.
    Flate,
}

/// Low-resolution preview settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewProfile {
    pub dpi: u32,
    pub format: RasterFormat,
}

impl PreviewProfile {
    pub const DEFAULT: PreviewProfile = PreviewProfile {
        dpi: 150,
        format: RasterFormat::Png,
    };
}

impl Default for PreviewProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// High-resolution print settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintProfile {
    pub dpi: u32,
    pub encoding: PageEncoding,
}

impl PrintProfile {
    pub const DEFAULT: PrintProfile = PrintProfile {
        dpi: 300,
        encoding: PageEncoding::Jpeg { quality: 100 },
    };
}

impl Default for PrintProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Default pixel limit for canvases and per-element buffers.
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 64_000_000;

/// Top-level render configuration. Every field has a default, so an empty
/// JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub preview: PreviewProfile,
    pub print: PrintProfile,
    /// Compose print pages on the rayon pool.
    pub parallel_pages: bool,
    /// Canvases above this many pixels are refused; element buffers
    /// (text blocks, shape masks, resized images) above it are skipped.
    pub max_canvas_pixels: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preview: PreviewProfile::DEFAULT,
            print: PrintProfile::DEFAULT,
            parallel_pages: true,
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self, CardpressError> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CardpressError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CardpressError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), CardpressError> {
        if self.preview.dpi == 0 || self.print.dpi == 0 {
            return Err(CardpressError::Config("dpi must be greater than zero".into()));
        }
        if let RasterFormat::Jpeg { quality } = self.preview.format {
            check_quality(quality)?;
        }
        if let PageEncoding::Jpeg { quality } = self.print.encoding {
            check_quality(quality)?;
        }
        if self.max_canvas_pixels == 0 {
            return Err(CardpressError::Config("max_canvas_pixels must be greater than zero".into()));
        }
        Ok(())
    }
}

fn check_quality(quality: u8) -> Result<(), CardpressError> {
    if (1..=100).contains(&quality) {
        Ok(())
    } else {
        Err(CardpressError::Config(format!(
            "jpeg quality must be between 1 and 100, got {}",
            quality
        )))
    }
}
