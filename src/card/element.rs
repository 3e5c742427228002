//! Element types placed on a card page.
//!
//! All positions and sizes are millimeters from the top-left corner of the
//! card. They are converted to device pixels only at draw time.
//!
//! Every element is tagged with a `type` discriminator:
//!
//! ```json
//! {"type": "text", "text": "Hello", "x": 10, "y": 10, "font_size": 24}
//! {"type": "image", "src": "/storage/photos/a.jpg", "x": 0, "y": 0, "width": 50, "height": 40}
//! {"type": "shape", "shape": "ellipse", "x": 20, "y": 20, "width": 30, "height": 30, "fill": "#F00"}
//! ```
//!
//! Missing required attributes fail deserialization.

use serde::{Deserialize, Serialize};

use super::color::Color;

// ============================================================================
// ELEMENT
// ============================================================================

/// One drawable element. List order is paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
    Shape(ShapeElement),
}

impl Element {
    /// Human-readable label, used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Element::Text(_) => "text",
            Element::Image(_) => "image",
            Element::Shape(s) => s.shape.label(),
        }
    }

    /// Anchor position in millimeters.
    pub fn position(&self) -> (f64, f64) {
        match self {
            Element::Text(t) => (t.x, t.y),
            Element::Image(i) => (i.x, i.y),
            Element::Shape(s) => (s.x, s.y),
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Horizontal anchor of a text block relative to its `x` position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor of a text block relative to its `y` position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

fn default_font_family() -> String {
    "Arial".to_string()
}

/// Text element.
///
/// `font_size` is in the editor's screen pixels (96 per inch), not points
/// and not millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub valign: VAlign,
    /// Degrees, authoring convention (clockwise positive).
    #[serde(default)]
    pub rotation: Option<f64>,
    /// Greedy word-wrap limit in millimeters.
    #[serde(default, alias = "max_width")]
    pub wrap_width: Option<f64>,
}

impl TextElement {
    pub fn new(text: impl Into<String>, x: f64, y: f64, font_size: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size,
            font_family: default_font_family(),
            color: Color::BLACK,
            align: Align::Left,
            valign: VAlign::Center,
            rotation: None,
            wrap_width: None,
        }
    }
}

// ============================================================================
// IMAGE
// ============================================================================

fn default_opacity() -> f32 {
    1.0
}

/// Raster image element.
///
/// When both `width` and `height` are set the image is stretched to exactly
/// that size; aspect ratio is not preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub src: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl ImageElement {
    pub fn new(src: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            src: src.into(),
            x,
            y,
            width: None,
            height: None,
            rotation: None,
            opacity: 1.0,
        }
    }

    /// Target size in millimeters, if both dimensions are given.
    pub fn target_size(&self) -> Option<(f64, f64)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }
}

// ============================================================================
// SHAPE
// ============================================================================

/// Primitive drawn by a shape element.
///
/// New primitives are added here and in `render::shape`; text and image
/// handling never match on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[serde(alias = "rect")]
    Rectangle,
    #[serde(alias = "circle")]
    Ellipse,
    Line,
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
        }
    }
}

fn default_stroke_width() -> f64 {
    0.5
}

/// Shape element.
///
/// Rectangles and ellipses occupy the box `(x, y, width, height)`. A line
/// runs from `(x, y)` to `(x + width, y + height)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub shape: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default)]
    pub stroke: Option<Color>,
    /// Stroke width in millimeters.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub rotation: Option<f64>,
}

impl ShapeElement {
    pub fn new(shape: ShapeKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            shape,
            x,
            y,
            width,
            height,
            fill: None,
            stroke: None,
            stroke_width: default_stroke_width(),
            rotation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_from_json_with_defaults() {
        let el: Element = serde_json::from_str(
            r##"{"type":"text","x":10,"y":10,"text":"Hello","font_size":24,"color":"#000000"}"##,
        )
        .unwrap();
        let mut expected = TextElement::new("Hello", 10.0, 10.0, 24.0);
        expected.color = Color::BLACK;
        assert_eq!(el, Element::Text(expected));
    }

    #[test]
    fn test_text_max_width_alias() {
        let el: Element = serde_json::from_str(
            r#"{"type":"text","x":0,"y":0,"text":"a b","font_size":12,"max_width":40,"align":"center","rotation":15}"#,
        )
        .unwrap();
        let Element::Text(t) = el else { panic!("expected text") };
        assert_eq!(t.wrap_width, Some(40.0));
        assert_eq!(t.align, Align::Center);
        assert_eq!(t.rotation, Some(15.0));
    }

    #[test]
    fn test_text_missing_required_fields_is_error() {
        let missing_text = r#"{"type":"text","x":0,"y":0,"font_size":12}"#;
        let missing_size = r#"{"type":"text","x":0,"y":0,"text":"hi"}"#;
        assert!(serde_json::from_str::<Element>(missing_text).is_err());
        assert!(serde_json::from_str::<Element>(missing_size).is_err());
    }

    #[test]
    fn test_unknown_type_is_error() {
        assert!(serde_json::from_str::<Element>(r#"{"type":"video","x":0,"y":0}"#).is_err());
    }

    #[test]
    fn test_image_target_size_needs_both() {
        let mut img = ImageElement::new("a.png", 0.0, 0.0);
        img.width = Some(10.0);
        assert_eq!(img.target_size(), None);
        img.height = Some(20.0);
        assert_eq!(img.target_size(), Some((10.0, 20.0)));
    }

    #[test]
    fn test_shape_aliases() {
        let el: Element = serde_json::from_str(
            r##"{"type":"shape","shape":"circle","x":1,"y":2,"width":3,"height":4,"fill":"#F00"}"##,
        )
        .unwrap();
        let Element::Shape(s) = el else { panic!("expected shape") };
        assert_eq!(s.shape, ShapeKind::Ellipse);
        assert_eq!(s.fill, Some(Color::rgb(255, 0, 0)));
        assert_eq!(s.stroke_width, 0.5);
    }
}
