//! # Card Model
//!
//! A card is a fixed-size canvas (millimeters) with a background and up to
//! four logical pages of elements. Both the Rust API and the JSON API use the
//! same types.
//!
//! ```
//! use cardpress::card::{CardDescription, LogicalPage};
//!
//! let card = CardDescription::from_json(r##"{
//!     "width_mm": 150,
//!     "height_mm": 210,
//!     "background_color": "#FFFFFF",
//!     "elements": [
//!         {"type": "text", "x": 10, "y": 10, "text": "Hello", "font_size": 24}
//!     ]
//! }"##).unwrap();
//!
//! assert_eq!(card.populated_pages(), vec![LogicalPage::Front]);
//! ```
//!
//! A single-page card uses `elements`. Folded cards add `inside_left`,
//! `inside_right` and `back`; `front` is accepted as an alias of `elements`.

mod color;
mod element;

pub use color::Color;
pub use element::{
    Align, Element, ImageElement, ShapeElement, ShapeKind, TextElement, VAlign,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::CardpressError;

/// Accepted card edge lengths in millimeters.
pub const DIMENSION_RANGE_MM: RangeInclusive<u32> = 100..=500;

/// Default card size (A5 portrait).
pub const DEFAULT_WIDTH_MM: u32 = 150;
pub const DEFAULT_HEIGHT_MM: u32 = 210;

fn default_card_name() -> String {
    "Untitled Card".to_string()
}

fn default_width() -> u32 {
    DEFAULT_WIDTH_MM
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT_MM
}

fn default_background() -> Color {
    Color::WHITE
}

/// Logical card face, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalPage {
    Front,
    InsideLeft,
    InsideRight,
    Back,
}

impl LogicalPage {
    pub const ALL: [LogicalPage; 4] = [
        LogicalPage::Front,
        LogicalPage::InsideLeft,
        LogicalPage::InsideRight,
        LogicalPage::Back,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LogicalPage::Front => "front",
            LogicalPage::InsideLeft => "inside-left",
            LogicalPage::InsideRight => "inside-right",
            LogicalPage::Back => "back",
        }
    }
}

impl fmt::Display for LogicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable render input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDescription {
    #[serde(default = "default_card_name")]
    pub card_name: String,
    #[serde(default = "default_width")]
    pub width_mm: u32,
    #[serde(default = "default_height")]
    pub height_mm: u32,
    #[serde(default = "default_background")]
    pub background_color: Color,
    #[serde(default)]
    pub background_image: Option<String>,
    /// Front page (or the only page).
    #[serde(default, alias = "front")]
    pub elements: Vec<Element>,
    #[serde(default, alias = "inside-left", skip_serializing_if = "Vec::is_empty")]
    pub inside_left: Vec<Element>,
    #[serde(default, alias = "inside-right", skip_serializing_if = "Vec::is_empty")]
    pub inside_right: Vec<Element>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub back: Vec<Element>,
    /// Opaque caller data, carried but never rendered.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl Default for CardDescription {
    fn default() -> Self {
        Self {
            card_name: default_card_name(),
            width_mm: DEFAULT_WIDTH_MM,
            height_mm: DEFAULT_HEIGHT_MM,
            background_color: Color::WHITE,
            background_image: None,
            elements: Vec::new(),
            inside_left: Vec::new(),
            inside_right: Vec::new(),
            back: Vec::new(),
            metadata: serde_json::Value::Null,
        }
    }
}

impl CardDescription {
    /// Parse and validate a card from JSON.
    pub fn from_json(json: &str) -> Result<Self, CardpressError> {
        let card: CardDescription = serde_json::from_str(json)?;
        card.validate()?;
        Ok(card)
    }

    /// Check the constraints that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), CardpressError> {
        for (name, value) in [("width_mm", self.width_mm), ("height_mm", self.height_mm)] {
            if !DIMENSION_RANGE_MM.contains(&value) {
                return Err(CardpressError::InvalidCard(format!(
                    "{} must be between {} and {}, got {}",
                    name,
                    DIMENSION_RANGE_MM.start(),
                    DIMENSION_RANGE_MM.end(),
                    value
                )));
            }
        }
        Ok(())
    }

    /// Elements of one logical page.
    pub fn page(&self, page: LogicalPage) -> &[Element] {
        match page {
            LogicalPage::Front => &self.elements,
            LogicalPage::InsideLeft => &self.inside_left,
            LogicalPage::InsideRight => &self.inside_right,
            LogicalPage::Back => &self.back,
        }
    }

    /// Pages that should be printed: the front always, the others only
    /// when they carry at least one element.
    pub fn populated_pages(&self) -> Vec<LogicalPage> {
        LogicalPage::ALL
            .into_iter()
            .filter(|&p| p == LogicalPage::Front || !self.page(p).is_empty())
            .collect()
    }
}
