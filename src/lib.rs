//! # Cardpress - Card Rendering Library
//!
//! Cardpress turns a card description (a fixed-size canvas in millimeters
//! plus positioned text, image and shape elements) into:
//!
//! - **Preview**: a 150 DPI PNG of the front page
//! - **Print**: a 300 DPI PDF with one page per populated card face
//!
//! ## Quick Start
//!
//! ```no_run
//! use cardpress::{CardDescription, CardRenderer, RenderConfig, assets::PublicDir};
//! use std::sync::Arc;
//!
//! let card = CardDescription::from_json(r##"{
//!     "card_name": "Birthday",
//!     "elements": [
//!         {"type": "text", "text": "Happy Birthday", "x": 20, "y": 30, "font_size": 24, "color": "#c0392b"}
//!     ]
//! }"##)?;
//!
//! let renderer = CardRenderer::new(Arc::new(PublicDir::new("public")), RenderConfig::default());
//! std::fs::write("preview.png", renderer.render_preview(&card)?)?;
//! std::fs::write("print.pdf", renderer.render_print(&card)?)?;
//!
//! # Ok::<(), cardpress::CardpressError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`card`] | Card description, elements, colors |
//! | [`geometry`] | Millimeter/point/pixel conversion |
//! | [`render`] | Element drawing and page compositing |
//! | [`document`] | PNG/JPEG encoding and PDF assembly |
//! | [`orchestrator`] | Preview and print pipelines |
//! | [`storage`] | Order numbers and artifact files |
//! | [`assets`] | Font and image lookup |
//! | [`config`] | Resolution and encoding profiles |
//! | [`error`] | Error types |

pub mod assets;
pub mod card;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod orchestrator;
pub mod render;
pub mod storage;

// Re-exports for convenience
pub use card::CardDescription;
pub use config::RenderConfig;
pub use error::CardpressError;
pub use orchestrator::CardRenderer;
