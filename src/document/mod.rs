//! # Document Assembly
//!
//! Encodes rendered pages into deliverable bytes.
//!
//! - [`raster`]: single-page PNG/JPEG encoding for previews
//! - [`pdf`]: multi-page PDF packaging for print
//!
//! The print path goes through [`DocumentAssembler`] so a different
//! paginated container can be swapped in without touching rendering.

pub mod pdf;
pub mod raster;

pub use pdf::PdfAssembler;

use crate::error::CardpressError;
use crate::render::RenderedPage;

/// Packages an ordered list of page rasters into one document.
pub trait DocumentAssembler: Sync {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    /// Pages appear in the document in input order. Empty input is an error.
    fn assemble(&self, pages: &[RenderedPage]) -> Result<Vec<u8>, CardpressError>;
}
