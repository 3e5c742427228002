//! PDF assembly with `pdf-writer`.
//!
//! Every page is a single image XObject painted over the full MediaBox. The
//! MediaBox is the raster's pixel size at the raster's own resolution, so
//! pages of different sizes keep their own dimensions.
//!
//! ```text
//! 1 Catalog ──► 2 Pages ──► [Page, Page, ...]
//!                              └─ Resources /XObject << /Im0 image >>
//!                              └─ Contents  q W 0 0 H 0 0 cm /Im0 Do Q
//! ```

use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use std::io::Write;

use super::DocumentAssembler;
use super::raster::encode_jpeg;
use crate::config::PageEncoding;
use crate::error::CardpressError;
use crate::geometry::px_to_points;
use crate::render::RenderedPage;

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// Packages page rasters into one PDF.
#[derive(Debug, Clone, Copy)]
pub struct PdfAssembler {
    encoding: PageEncoding,
}

impl PdfAssembler {
    pub fn new(encoding: PageEncoding) -> Self {
        Self { encoding }
    }

    /// Encoded image stream and its filter.
    fn page_image(&self, page: &RenderedPage) -> Result<(Vec<u8>, Filter), CardpressError> {
        match self.encoding {
            PageEncoding::Jpeg { quality } => Ok((encode_jpeg(&page.raster, quality)?, Filter::DctDecode)),
            PageEncoding::Flate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder
                    .write_all(page.raster.as_raw())
                    .and_then(|_| encoder.finish())
                    .map(|data| (data, Filter::FlateDecode))
                    .map_err(|e| CardpressError::Encode(format!("Flate error: {}", e)))
            }
        }
    }
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new(PageEncoding::Jpeg { quality: 100 })
    }
}

impl DocumentAssembler for PdfAssembler {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn assemble(&self, pages: &[RenderedPage]) -> Result<Vec<u8>, CardpressError> {
        if pages.is_empty() {
            return Err(CardpressError::Document("no pages to assemble".into()));
        }

        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let tree_id = alloc.bump();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);

        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            if page.dpi == 0 {
                return Err(CardpressError::Document(format!("{} page has zero dpi", page.page)));
            }

            let page_id = alloc.bump();
            let image_id = alloc.bump();
            let content_id = alloc.bump();
            kids.push(page_id);

            let (data, filter) = self.page_image(page)?;
            let mut image = pdf.image_xobject(image_id, &data);
            image.filter(filter);
            image.width(page.width() as i32);
            image.height(page.height() as i32);
            image.color_space().device_rgb();
            image.bits_per_component(8);
            image.finish();

            let w = px_to_points(page.width(), page.dpi);
            let h = px_to_points(page.height(), page.dpi);

            let mut pdf_page = pdf.page(page_id);
            pdf_page.media_box(Rect::new(0.0, 0.0, w, h));
            pdf_page.parent(tree_id);
            pdf_page.contents(content_id);
            pdf_page.resources().x_objects().pair(IMAGE_NAME, image_id);
            pdf_page.finish();

            let mut content = Content::new();
            content.save_state();
            content.transform([w, 0.0, 0.0, h, 0.0, 0.0]);
            content.x_object(IMAGE_NAME);
            content.restore_state();
            pdf.stream(content_id, &content.finish());

            log::debug!(
                "pdf page {} ({}): {}x{} px → {:.1}x{:.1} pt",
                kids.len(),
                page.page,
                page.width(),
                page.height(),
                w,
                h
            );
        }

        pdf.pages(tree_id).kids(kids.iter().copied()).count(kids.len() as i32);

        Ok(pdf.finish())
    }
}
