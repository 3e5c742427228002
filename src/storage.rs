//! # Artifact Storage
//!
//! Names and persists rendered artifacts under an order number.
//!
//! | Artifact | Path under the store root | Returned as |
//! |----------|---------------------------|-------------|
//! | preview | `previews/preview_{order}.{ext}` | `/storage/previews/...` |
//! | print | `print_files/print_{order}.{ext}` | `/storage/print_files/...` |
//!
//! Files are written next to their final name and renamed into place, so a
//! reader never observes a partial artifact.

use rand::Rng;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::card::CardDescription;
use crate::document::DocumentAssembler;
use crate::error::CardpressError;
use crate::orchestrator::CardRenderer;
use crate::render::PageRenderer;

/// Public URL prefix of stored artifacts.
pub const PUBLIC_PREFIX: &str = "/storage";

/// Fresh order number: `CARD-{unix seconds}-{6 upper-case hex}`.
pub fn new_order_number() -> String {
    let mut rng = rand::rng();
    let suffix: u32 = rng.random_range(0..0x100_0000);
    format!("CARD-{}-{:06X}", chrono::Utc::now().timestamp(), suffix)
}

/// Order numbers become file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_order_number(order: &str) -> Result<(), CardpressError> {
    let valid = !order.is_empty()
        && order
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CardpressError::Storage(format!("invalid order number '{}'", order)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Preview,
    Print,
}

impl ArtifactKind {
    pub fn directory(&self) -> &'static str {
        match self {
            ArtifactKind::Preview => "previews",
            ArtifactKind::Print => "print_files",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Preview => "preview",
            ArtifactKind::Print => "print",
        }
    }

    pub fn file_name(&self, order: &str, extension: &str) -> String {
        format!("{}_{}.{}", self.prefix(), order, extension)
    }
}

/// Destination for rendered artifacts.
pub trait ArtifactStore {
    /// Store `bytes` and return the artifact's public path.
    fn put(
        &self,
        kind: ArtifactKind,
        order: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, CardpressError>;

    /// Remove a stored artifact. Removing one that does not exist is not an
    /// error.
    fn discard(&self, kind: ArtifactKind, order: &str, extension: &str) -> Result<(), CardpressError>;
}

/// Filesystem store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(
        &self,
        kind: ArtifactKind,
        order: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, CardpressError> {
        validate_order_number(order)?;

        let dir = self.root.join(kind.directory());
        fs::create_dir_all(&dir)?;

        let name = kind.file_name(order, extension);
        let path = dir.join(&name);
        let tmp = dir.join(format!(".{}.tmp", name));

        if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(CardpressError::Storage(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            )));
        }

        log::info!("stored {} ({} bytes)", path.display(), bytes.len());
        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, kind.directory(), name))
    }

    fn discard(&self, kind: ArtifactKind, order: &str, extension: &str) -> Result<(), CardpressError> {
        validate_order_number(order)?;
        let path = self
            .root
            .join(kind.directory())
            .join(kind.file_name(order, extension));
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("discarded {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CardpressError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Result of [`CardGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCard {
    pub order_number: String,
    pub preview_path: String,
    pub print_path: Option<String>,
}

/// Renders a card and stores its artifacts under one order number.
pub struct CardGenerator<R, A, S = FsArtifactStore> {
    renderer: CardRenderer<R, A>,
    store: S,
}

impl<R: PageRenderer, A: DocumentAssembler, S: ArtifactStore> CardGenerator<R, A, S> {
    pub fn new(renderer: CardRenderer<R, A>, store: S) -> Self {
        Self { renderer, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Render the preview, and the print file when `with_print` is set,
    /// then store them.
    ///
    /// A fresh order number is drawn when `order` is `None`. Nothing is
    /// stored unless every requested artifact rendered; if storing the print
    /// file fails, the stored preview is removed again.
    pub fn generate(
        &self,
        card: &CardDescription,
        order: Option<&str>,
        with_print: bool,
    ) -> Result<GeneratedCard, CardpressError> {
        let order_number = match order {
            Some(o) => {
                validate_order_number(o)?;
                o.to_string()
            }
            None => new_order_number(),
        };
        log::info!("generating {} for '{}'", order_number, card.card_name);

        let preview = self.renderer.render_preview(card)?;
        let document = if with_print {
            Some(self.renderer.render_print(card)?)
        } else {
            None
        };

        let preview_ext = self.renderer.config().preview.format.extension();
        let preview_path = self
            .store
            .put(ArtifactKind::Preview, &order_number, preview_ext, &preview)?;

        let print_path = match document {
            Some(document) => {
                let ext = self.renderer.assembler().extension();
                match self.store.put(ArtifactKind::Print, &order_number, ext, &document) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        if let Err(cleanup) = self.store.discard(ArtifactKind::Preview, &order_number, preview_ext) {
                            log::warn!("could not remove preview for {}: {}", order_number, cleanup);
                        }
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        Ok(GeneratedCard {
            order_number,
            preview_path,
            print_path,
        })
    }
}
