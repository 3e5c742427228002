//! # Error Types
//!
//! This module defines error types used throughout the cardpress library.
//!
//! Only failures that abort a whole render live here. Missing fonts and
//! missing element images are absorbed by the renderer and logged instead.

use thiserror::Error;

/// Main error type for cardpress operations
#[derive(Debug, Error)]
pub enum CardpressError {
    /// Card description failed validation (dimensions, shape of input)
    #[error("Invalid card: {0}")]
    InvalidCard(String),

    /// Canvas could not be allocated
    #[error("Canvas error: {0}")]
    Canvas(String),

    /// Background image exists but could not be decoded
    #[error("Background error: {0}")]
    Background(String),

    /// Raster encoding error (PNG/JPEG)
    #[error("Encode error: {0}")]
    Encode(String),

    /// Paginated document assembly error
    #[error("Document error: {0}")]
    Document(String),

    /// Artifact could not be stored
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid render configuration
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
