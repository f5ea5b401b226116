//! The host services the packer talks to.
//!
//! The core never touches the file system. Whoever drives a batch supplies the
//! palette, reads the source files and persists the results.

use thiserror::Error;

use crate::compression::palette::Palette;
use crate::image::format::{ImageError, RasterImage};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Invalid image {path}")]
    Invalid {
        path: String,
        #[source]
        source: ImageError,
    },
}

#[derive(Error, Debug)]
#[error("Failed to write {name}: {source}")]
pub struct SinkError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

/// Supplies the active palette. `None` means nothing can be converted.
pub trait PaletteSupplier {
    fn palette(&self) -> Option<Palette>;
}

/// Reads source files. Shared across the workers of a batch.
pub trait AssetSource: Sync {
    fn read_image(&self, path: &str) -> Result<RasterImage, SourceError>;

    /// Raw contents of a non-image resource file.
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError>;
}

/// Persists one named buffer, atomically as far as the packer is concerned.
pub trait ByteSink {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError>;
}

impl PaletteSupplier for Palette {
    fn palette(&self) -> Option<Palette> {
        Some(self.clone())
    }
}

impl<T: PaletteSupplier> PaletteSupplier for Option<T> {
    fn palette(&self) -> Option<Palette> {
        self.as_ref().and_then(PaletteSupplier::palette)
    }
}
