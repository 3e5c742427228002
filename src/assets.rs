//! Asset lookup: font families and image references to raw bytes.
//!
//! Lookups are optional by contract. A `None` means "not available" and the
//! renderer degrades (default face, skipped image) instead of failing.
//! Decoding is the renderer's job, so a source only ever moves bytes.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Source of font and image bytes.
pub trait AssetSource: Send + Sync {
    /// Bytes of a TrueType/OpenType font for `family`.
    fn font_bytes(&self, family: &str) -> Option<Vec<u8>>;

    /// Bytes of an encoded image for `reference`.
    fn image_bytes(&self, reference: &str) -> Option<Vec<u8>>;
}

/// Resolves assets against a public directory.
///
/// ```text
/// <root>/fonts/<family>.ttf      font families
/// <root>/<reference>             images ("/storage/photos/a.jpg" → <root>/storage/photos/a.jpg)
/// ```
#[derive(Debug, Clone)]
pub struct PublicDir {
    root: PathBuf,
}

impl PublicDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a reference to a path under the root.
    ///
    /// Returns `None` for references that would escape the root.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }

    fn read(&self, path: &Path) -> Option<Vec<u8>> {
        match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::debug!("asset {} unavailable: {}", path.display(), e);
                None
            }
        }
    }
}

impl AssetSource for PublicDir {
    fn font_bytes(&self, family: &str) -> Option<Vec<u8>> {
        if family.is_empty() || family.contains(['/', '\\']) || family.contains("..") {
            return None;
        }
        let path = self.root.join("fonts").join(format!("{}.ttf", family));
        self.read(&path)
    }

    fn image_bytes(&self, reference: &str) -> Option<Vec<u8>> {
        let path = self.resolve(reference)?;
        self.read(&path)
    }
}

/// In-memory assets, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    fonts: HashMap<String, Vec<u8>>,
    images: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, family: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.fonts.insert(family.into(), bytes);
        self
    }

    pub fn with_image(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(reference.into(), bytes);
        self
    }
}

impl AssetSource for MemoryAssets {
    fn font_bytes(&self, family: &str) -> Option<Vec<u8>> {
        self.fonts.get(family).cloned()
    }

    fn image_bytes(&self, reference: &str) -> Option<Vec<u8>> {
        self.images.get(reference).cloned()
    }
}
