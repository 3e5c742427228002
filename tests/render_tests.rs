//! # Render Tests
//!
//! End-to-end checks of the preview and print pipelines through the public
//! API, using in-memory assets and fixtures generated with `image`.

use cardpress::assets::{MemoryAssets, PublicDir};
use cardpress::card::{Element, ImageElement, LogicalPage, ShapeElement, ShapeKind, TextElement};
use cardpress::config::PageEncoding;
use cardpress::{CardDescription, CardRenderer, CardpressError, RenderConfig};
use image::{ImageFormat, Rgb, RgbImage};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::sync::Arc;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn renderer(assets: MemoryAssets) -> CardRenderer {
    CardRenderer::new(Arc::new(assets), RenderConfig::default())
}

/// Print renderer at a low resolution to keep tests fast.
fn draft_renderer(assets: MemoryAssets) -> CardRenderer {
    let mut config = RenderConfig::default();
    config.print.dpi = 30;
    config.print.encoding = PageEncoding::Flate;
    CardRenderer::new(Arc::new(assets), config)
}

fn hello_card() -> CardDescription {
    CardDescription::from_json(
        r##"{
            "width_mm": 150,
            "height_mm": 210,
            "background_color": "#FFFFFF",
            "elements": [
                {"type": "text", "x": 10, "y": 10, "text": "Hello", "font_size": 24, "color": "#000000"}
            ]
        }"##,
    )
    .unwrap()
}

fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

fn decode(bytes: &[u8]) -> RgbImage {
    image::load_from_memory(bytes).unwrap().to_rgb8()
}

fn count(haystack: &[u8], needle: &str) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle.as_bytes())
        .count()
}

/// Page objects, not counting the page tree.
fn page_objects(pdf: &[u8]) -> usize {
    count(pdf, "/Type /Page") - count(pdf, "/Type /Pages")
}

// ============================================================================
// PREVIEW
// ============================================================================

#[test]
fn test_hello_preview_size_and_ink() {
    let bytes = renderer(MemoryAssets::new()).render_preview(&hello_card()).unwrap();
    let img = decode(&bytes);
    assert_eq!((img.width(), img.height()), (886, 1240));

    let white = Rgb([255, 255, 255]);
    let near_anchor = (40..80).any(|y| (55..100).any(|x| *img.get_pixel(x, y) != white));
    assert!(near_anchor, "expected ink near (59, 59)");

    // nothing far from the text
    assert_eq!(*img.get_pixel(500, 800), white);
    assert_eq!(*img.get_pixel(10, 10), white);
}

#[test]
fn test_preview_is_deterministic() {
    let renderer = renderer(MemoryAssets::new());
    let mut card = hello_card();
    card.elements.push(Element::Shape({
        let mut s = ShapeElement::new(ShapeKind::Ellipse, 40.0, 60.0, 50.0, 30.0);
        s.fill = Some("#3366CC".parse().unwrap());
        s.rotation = Some(30.0);
        s
    }));
    let a = renderer.render_preview(&card).unwrap();
    let b = renderer.render_preview(&card).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_missing_image_is_a_no_op() {
    let renderer = renderer(MemoryAssets::new());
    let card = hello_card();
    let mut with_missing = card.clone();
    with_missing
        .elements
        .push(Element::Image(ImageElement::new("photos/missing.jpg", 20.0, 20.0)));

    assert_eq!(
        renderer.render_preview(&card).unwrap(),
        renderer.render_preview(&with_missing).unwrap()
    );
}

#[test]
fn test_image_element_is_composited() {
    let photo = RgbImage::from_pixel(4, 4, Rgb([200, 0, 0]));
    let assets = MemoryAssets::new().with_image("photo.png", png_bytes(&photo));
    let mut card = CardDescription::default();
    let mut el = ImageElement::new("photo.png", 50.0, 50.0);
    el.width = Some(20.0);
    el.height = Some(20.0);
    card.elements.push(Element::Image(el));

    let img = decode(&renderer(assets).render_preview(&card).unwrap());
    // 60 mm at 150 dpi = 354 px, inside the 295..413 px box
    let px = img.get_pixel(354, 354);
    assert!(px[0] > 180 && px[1] < 30, "{:?}", px);
    assert_eq!(*img.get_pixel(250, 250), Rgb([255, 255, 255]));
}

#[test]
fn test_public_dir_assets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("img")).unwrap();
    let photo = RgbImage::from_pixel(2, 2, Rgb([0, 0, 210]));
    std::fs::write(dir.path().join("img/blue.png"), png_bytes(&photo)).unwrap();

    let mut card = CardDescription::default();
    let mut el = ImageElement::new("img/blue.png", 0.0, 0.0);
    el.width = Some(30.0);
    el.height = Some(30.0);
    card.elements.push(Element::Image(el));

    let renderer = CardRenderer::new(Arc::new(PublicDir::new(dir.path())), RenderConfig::default());
    let img = decode(&renderer.render_preview(&card).unwrap());
    let px = img.get_pixel(80, 80);
    assert!(px[2] > 190 && px[0] < 20, "{:?}", px);
}

#[test]
fn test_oversized_elements_still_render() {
    let photo = RgbImage::from_pixel(2, 2, Rgb([0, 120, 0]));
    let assets = MemoryAssets::new().with_image("photo.png", png_bytes(&photo));
    let renderer = renderer(assets);

    let mut rect = ShapeElement::new(ShapeKind::Rectangle, -1.0, -1.0, 1e12, 1e12);
    rect.fill = Some("#CC0000".parse().unwrap());
    let mut image = ImageElement::new("photo.png", 0.0, 0.0);
    image.width = Some(1e12);
    image.height = Some(1e12);
    let text = TextElement::new("Huge", 10.0, 10.0, 1e12);

    for element in [Element::Shape(rect), Element::Text(text), Element::Image(image)] {
        let mut card = hello_card();
        card.elements.push(element);
        let bytes = renderer.render_preview(&card).unwrap();
        let img = decode(&bytes);
        assert_eq!((img.width(), img.height()), (886, 1240));
    }
}

#[test]
fn test_oversized_rectangle_fills_preview() {
    let mut card = CardDescription::default();
    let mut rect = ShapeElement::new(ShapeKind::Rectangle, -1.0, -1.0, 1e12, 1e12);
    rect.fill = Some("#CC0000".parse().unwrap());
    card.elements.push(Element::Shape(rect));

    let img = decode(&renderer(MemoryAssets::new()).render_preview(&card).unwrap());
    assert_eq!(*img.get_pixel(0, 0), Rgb([204, 0, 0]));
    assert_eq!(*img.get_pixel(885, 1239), Rgb([204, 0, 0]));
}

#[test]
fn test_invalid_dimensions() {
    let result = CardDescription::from_json(r#"{"width_mm": 50}"#);
    assert!(matches!(result, Err(CardpressError::InvalidCard(_))));
}

// ============================================================================
// PRINT
// ============================================================================

#[test]
fn test_front_only_print_has_one_page() {
    let bytes = draft_renderer(MemoryAssets::new()).render_print(&hello_card()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(count(&bytes, "/Count 1"), 1);
    assert_eq!(page_objects(&bytes), 1);
}

#[test]
fn test_named_pages_add_exactly_their_count() {
    let renderer = draft_renderer(MemoryAssets::new());
    let mut card = hello_card();
    card.inside_left
        .push(Element::Text(TextElement::new("Inside", 10.0, 10.0, 18.0)));
    card.back
        .push(Element::Text(TextElement::new("Back", 10.0, 10.0, 12.0)));

    assert_eq!(card.populated_pages(), vec![
        LogicalPage::Front,
        LogicalPage::InsideLeft,
        LogicalPage::Back
    ]);
    let bytes = renderer.render_print(&card).unwrap();
    assert_eq!(count(&bytes, "/Count 3"), 1);
    assert_eq!(page_objects(&bytes), 3);
}

#[test]
fn test_named_pages_from_json() {
    let card = CardDescription::from_json(
        r##"{
            "front": [{"type": "text", "x": 5, "y": 5, "text": "Front", "font_size": 12}],
            "inside-right": [{"type": "shape", "shape": "rect", "x": 5, "y": 5, "width": 10, "height": 10, "fill": "#000"}]
        }"##,
    )
    .unwrap();
    assert_eq!(card.populated_pages(), vec![LogicalPage::Front, LogicalPage::InsideRight]);

    let bytes = draft_renderer(MemoryAssets::new()).render_print(&card).unwrap();
    assert_eq!(count(&bytes, "/Count 2"), 1);
}

#[test]
fn test_print_page_image_matches_card_size() {
    // 150 x 210 mm at 30 dpi
    let bytes = draft_renderer(MemoryAssets::new()).render_print(&hello_card()).unwrap();
    assert_eq!(count(&bytes, "/Width 177"), 1);
    assert_eq!(count(&bytes, "/Height 248"), 1);
}

#[test]
fn test_undecodable_background_fails_print() {
    let assets = MemoryAssets::new().with_image("bg.png", b"not an image".to_vec());
    let mut card = hello_card();
    card.background_image = Some("bg.png".into());
    let result = draft_renderer(assets).render_print(&card);
    assert!(matches!(result, Err(CardpressError::Background(_))));
}
