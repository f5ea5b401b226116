use image::ImageError;
use lib_pak::pack::PackError;
use lib_pak::ports::{AssetSource, ByteSink, SinkError, SourceError};
use lib_pak::{Listing, PackConfig, Palette, PipelineError, RasterImage};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Invalid resource pack: {0}")]
    Pack(#[from] PackError),

    #[error("{0} batch(es) failed")]
    BatchesFailed(usize),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CliError + '_ {
    move |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads source files relative to a root directory.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsSource {
    fn read_image(&self, path: &str) -> Result<RasterImage, SourceError> {
        let full = self.root.join(path);
        let decoded = image::open(&full).map_err(|e| match e {
            ImageError::IoError(source) => SourceError::Io {
                path: path.to_string(),
                source,
            },
            other => SourceError::Decode {
                path: path.to_string(),
                reason: other.to_string(),
            },
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        RasterImage::new(width, height, rgba.into_raw()).map_err(|source| SourceError::Invalid {
            path: path.to_string(),
            source,
        })
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        fs::read(self.root.join(path)).map_err(|source| SourceError::Io {
            path: path.to_string(),
            source,
        })
    }
}

/// Writes named buffers relative to a root directory, creating parents.
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ByteSink for FsSink {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        let full = self.root.join(name);
        let sink_error = |source| SinkError {
            name: name.to_string(),
            source,
        };
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(sink_error)?;
        }
        fs::write(&full, bytes).map_err(sink_error)?;
        debug!("Wrote {} bytes to {}", bytes.len(), full.display());
        Ok(())
    }
}

pub fn load_palette(path: &Path) -> Result<Palette, CliError> {
    let data = fs::read(path).map_err(io_error(path))?;
    serde_json::from_slice(&data).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_config(path: &Path) -> Result<PackConfig, CliError> {
    let data = fs::read(path).map_err(io_error(path))?;
    serde_json::from_slice(&data).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Names of the entries of `dir` accepted by `keep`, sorted.
fn list_entries(dir: &Path, keep: impl Fn(&fs::FileType) -> bool) -> Result<Vec<String>, CliError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let file_type = entry.file_type().map_err(io_error(dir))?;
        if !keep(&file_type) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if !name.starts_with('.') => names.push(name),
            Ok(_) => {}
            Err(name) => warn!("Skipping non UTF-8 name {:?} in {}", name, dir.display()),
        }
    }
    names.sort();
    Ok(names)
}

pub fn list_files(dir: &Path) -> Result<Vec<String>, CliError> {
    list_entries(dir, |t| t.is_file())
}

pub fn list_dirs(dir: &Path) -> Result<Vec<String>, CliError> {
    list_entries(dir, |t| t.is_dir())
}

/// One listing per `<root>/<project>/<pack>/`, named `<project>/<pack>`.
pub fn pack_listings(root: &Path) -> Result<Vec<Listing>, CliError> {
    let mut listings = Vec::new();
    for project in list_dirs(root)? {
        for pack in list_dirs(&root.join(&project))? {
            let files = list_files(&root.join(&project).join(&pack))?;
            listings.push(Listing::new(format!("{}/{}", project, pack), files));
        }
    }
    Ok(listings)
}

/// One listing per `<root>/<project>/`, covering its loose files.
pub fn background_listings(root: &Path) -> Result<Vec<Listing>, CliError> {
    list_dirs(root)?
        .into_iter()
        .map(|project| {
            let files = list_files(&root.join(&project))?;
            Ok(Listing::new(project, files))
        })
        .collect()
}
