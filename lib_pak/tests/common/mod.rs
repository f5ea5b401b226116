#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use lib_pak::ports::{AssetSource, ByteSink, SinkError, SourceError};
use lib_pak::{Palette, RasterImage};

/// Index 0 is magenta, the rest a grey ramp so index `i` is `[i * 8; 3]`.
pub fn grey_palette() -> Palette {
    let mut colors = vec![[255, 0, 255]];
    colors.extend((1..32u8).map(|i| [i * 8, i * 8, i * 8]));
    Palette::new(colors).unwrap()
}

/// A raster whose pixels quantize back to `indices` against [`grey_palette`].
/// Index 0 becomes a clear pixel.
pub fn raster_from_indices(width: u32, height: u32, indices: &[u8]) -> RasterImage {
    let rgba = indices
        .iter()
        .flat_map(|&i| {
            if i == 0 {
                [0, 0, 0, 0]
            } else {
                [i * 8, i * 8, i * 8, 255]
            }
        })
        .collect();
    RasterImage::new(width, height, rgba).unwrap()
}

pub fn solid(width: u32, height: u32, index: u8) -> RasterImage {
    raster_from_indices(width, height, &vec![index; (width * height) as usize])
}

pub enum SourceFile {
    Image(RasterImage),
    Bytes(Vec<u8>),
    Unreadable,
}

#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, SourceFile>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(mut self, path: &str, image: RasterImage) -> Self {
        self.files.insert(path.to_string(), SourceFile::Image(image));
        self
    }

    pub fn bytes(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files
            .insert(path.to_string(), SourceFile::Bytes(bytes.to_vec()));
        self
    }

    pub fn unreadable(mut self, path: &str) -> Self {
        self.files.insert(path.to_string(), SourceFile::Unreadable);
        self
    }
}

fn missing(path: &str) -> SourceError {
    SourceError::Io {
        path: path.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    }
}

impl AssetSource for MemorySource {
    fn read_image(&self, path: &str) -> Result<RasterImage, SourceError> {
        match self.files.get(path) {
            Some(SourceFile::Image(image)) => Ok(image.clone()),
            Some(_) => Err(SourceError::Decode {
                path: path.to_string(),
                reason: "not a PNG".to_string(),
            }),
            None => Err(missing(path)),
        }
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        match self.files.get(path) {
            Some(SourceFile::Bytes(bytes)) => Ok(bytes.clone()),
            _ => Err(missing(path)),
        }
    }
}

#[derive(Default)]
pub struct MemorySink {
    written: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.written.lock().unwrap().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.written.lock().unwrap().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.written.lock().unwrap().is_empty()
    }
}

impl ByteSink for MemorySink {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        self.written
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

pub fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
