//! Runs one batch from source files to a written blob.
//!
//! Per-file work (read, quantize, optimize) runs on the rayon pool and the
//! batch waits for all of it. The first failure aborts the batch before
//! anything is written. Completion order never reaches the output: sprite
//! tables keep the discovery order of the file list and packs are sorted by
//! hash and size.

use log::{debug, error, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::compression::palette::Palette;
use crate::compression::{compress, depth, CompressionError};
use crate::config::PackConfig;
use crate::constants::{IMAGE_EXT, PACK_EXT, RGB565_EXT, SPRITE_HEADER_FILE, SPRITE_TABLE_FILE};
use crate::hash::{asset_stem, hash_name};
use crate::image::format::BitDepth;
use crate::image::rgb565::{self, Rgb565Error};
use crate::pack::{resource, sprite_table, AssetEntry, PackError, ResourceBatch, SpriteRecord};
use crate::ports::{AssetSource, ByteSink, PaletteSupplier, SinkError, SourceError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read source file: {0}")]
    Source(#[from] SourceError),
    #[error("Failed to compress {name}")]
    Compression {
        name: String,
        #[source]
        source: CompressionError,
    },
    #[error("Failed to convert {name} to RGB565")]
    Rgb565 {
        name: String,
        #[source]
        source: Rgb565Error,
    },
    #[error("Failed to assemble the batch: {0}")]
    Pack(#[from] PackError),
    #[error("Failed to write the batch: {0}")]
    Sink(#[from] SinkError),
}

/// What a batch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Buffers handed to the sink, with their sizes.
    Written(Vec<(String, usize)>),
    /// No eligible file; nothing written.
    Empty,
    /// No palette available; nothing attempted.
    Skipped,
}

/// A directory and the files found in it, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub dir: String,
    pub files: Vec<String>,
}

impl Listing {
    pub fn new(dir: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }
}

pub fn is_image(file: &str) -> bool {
    file.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(IMAGE_EXT))
}

fn join_path(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), file)
    }
}

/// Drives batches through the host ports.
pub struct Packer<'a> {
    palette: &'a dyn PaletteSupplier,
    source: &'a dyn AssetSource,
    sink: &'a dyn ByteSink,
    config: PackConfig,
}

impl<'a> Packer<'a> {
    pub fn new(
        palette: &'a dyn PaletteSupplier,
        source: &'a dyn AssetSource,
        sink: &'a dyn ByteSink,
        config: PackConfig,
    ) -> Self {
        Self {
            palette,
            source,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Converts every image of `listing` into the flat sprite table
    /// `assets.bin` plus its C header.
    pub fn export_sprites(&self, listing: &Listing) -> Result<BatchOutcome, PipelineError> {
        let Some(palette) = self.palette.palette() else {
            info!("No palette available, skipping sprite export");
            return Ok(BatchOutcome::Skipped);
        };

        let mut images: Vec<&String> = listing.files.iter().filter(|f| is_image(f)).collect();
        if images.len() > self.config.max_sprites {
            warn!(
                "{} images found, only the first {} are exported",
                images.len(),
                self.config.max_sprites
            );
            images.truncate(self.config.max_sprites);
        }
        if images.is_empty() {
            info!("No images in {}", listing.dir);
            return Ok(BatchOutcome::Empty);
        }
        info!("Converting {} sprites from {}", images.len(), listing.dir);

        let source = self.source;
        let palette = &palette;
        let records = images
            .par_iter()
            .map(|file| sprite_record(source, palette, &listing.dir, file))
            .collect::<Result<Vec<_>, _>>()?;

        let table = sprite_table::assemble(&records)?;
        let header = sprite_table::c_header("assets", SPRITE_TABLE_FILE);
        self.sink.write(SPRITE_TABLE_FILE, &table)?;
        self.sink.write(SPRITE_HEADER_FILE, header.as_bytes())?;

        info!("Sprite conversion complete!");
        Ok(BatchOutcome::Written(vec![
            (SPRITE_TABLE_FILE.to_string(), table.len()),
            (SPRITE_HEADER_FILE.to_string(), header.len()),
        ]))
    }

    /// Packs every file of `listing` into `<dir>.res`.
    ///
    /// Images are quantized and depth-optimized; anything else is stored as is
    /// under the hash of its full file name.
    pub fn build_resource_pack(&self, listing: &Listing) -> Result<BatchOutcome, PipelineError> {
        let Some(palette) = self.palette.palette() else {
            info!("No palette available, skipping {}", listing.dir);
            return Ok(BatchOutcome::Skipped);
        };

        let source = self.source;
        let palette = &palette;
        let config = &self.config;
        let produced = listing
            .files
            .par_iter()
            .map(|file| {
                if is_image(file) {
                    image_entries(source, palette, config, &listing.dir, file)
                } else {
                    misc_entry(source, &listing.dir, file).map(|entry| vec![entry])
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut batch = ResourceBatch::new();
        for entry in produced.into_iter().flatten() {
            batch.insert(entry)?;
        }
        if batch.is_empty() {
            info!("Nothing to pack in {}", listing.dir);
            return Ok(BatchOutcome::Empty);
        }

        let pack = resource::assemble(&batch)?;
        let name = format!("{}.{}", listing.dir.trim_end_matches('/'), PACK_EXT);
        self.sink.write(&name, &pack)?;

        info!("{} packaged!", listing.dir);
        Ok(BatchOutcome::Written(vec![(name, pack.len())]))
    }

    /// Builds one pack per listing. A failing pack is logged and does not stop
    /// the others.
    pub fn pack_directories(
        &self,
        listings: &[Listing],
    ) -> Vec<(String, Result<BatchOutcome, PipelineError>)> {
        listings
            .iter()
            .map(|listing| {
                let result = self.build_resource_pack(listing);
                if let Err(e) = &result {
                    error!("Packing {} failed: {}", listing.dir, e);
                }
                (listing.dir.clone(), result)
            })
            .collect()
    }

    /// Converts every image of `listing` to `<dir>/<stem>.565`.
    pub fn convert_backgrounds(&self, listing: &Listing) -> Result<BatchOutcome, PipelineError> {
        let images: Vec<&String> = listing.files.iter().filter(|f| is_image(f)).collect();
        if images.is_empty() {
            return Ok(BatchOutcome::Empty);
        }

        let source = self.source;
        let dumps = images
            .par_iter()
            .map(|file| -> Result<(String, Vec<u8>), PipelineError> {
                let raster = source.read_image(&join_path(&listing.dir, file))?;
                let values = rgb565::convert(&raster).map_err(|source| PipelineError::Rgb565 {
                    name: file.to_string(),
                    source,
                })?;
                let name = join_path(
                    &listing.dir,
                    &format!("{}.{}", asset_stem(file), RGB565_EXT),
                );
                Ok((name, rgb565::to_bytes(&values)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut written = Vec::with_capacity(dumps.len());
        for (name, bytes) in dumps {
            self.sink.write(&name, &bytes)?;
            written.push((name, bytes.len()));
        }

        info!("Conversion complete!");
        Ok(BatchOutcome::Written(written))
    }
}

fn sprite_record(
    source: &dyn AssetSource,
    palette: &Palette,
    dir: &str,
    file: &str,
) -> Result<SpriteRecord, PipelineError> {
    let raster = source.read_image(&join_path(dir, file))?;
    let compressed = compress(&raster, palette).map_err(|source| PipelineError::Compression {
        name: file.to_string(),
        source,
    })?;
    let key = hash_name(asset_stem(file));
    debug!("{} => {:#010x}", file, key);

    Ok(SpriteRecord {
        key,
        name: file.to_string(),
        image: compressed.indexed,
    })
}

/// The primary entry of an image plus, for small images, its full-detail key.
///
/// A full-detail 8bpp copy is only stored when the primary is narrower than
/// 8bpp; otherwise the full-detail key aliases the primary.
fn image_entries(
    source: &dyn AssetSource,
    palette: &Palette,
    config: &PackConfig,
    dir: &str,
    file: &str,
) -> Result<Vec<AssetEntry>, PipelineError> {
    let raster = source.read_image(&join_path(dir, file))?;
    let compressed = compress(&raster, palette).map_err(|source| PipelineError::Compression {
        name: file.to_string(),
        source,
    })?;

    let stem = asset_stem(file);
    let primary = AssetEntry::new(hash_name(stem), file, compressed.optimized.to_bytes());
    if compressed.indexed.area() >= config.dual_variant_area {
        return Ok(vec![primary]);
    }

    let variant_key = hash_name(&format!("{}{}", stem, config.variant_suffix));
    if compressed.optimized.depth == BitDepth::Eight {
        return Ok(vec![primary.with_alias(variant_key)]);
    }

    let full = depth::encode_full(&compressed.indexed).to_bytes();
    let variant = AssetEntry::new(variant_key, format!("{}{}", file, config.variant_suffix), full);
    Ok(vec![primary, variant])
}

fn misc_entry(source: &dyn AssetSource, dir: &str, file: &str) -> Result<AssetEntry, PipelineError> {
    let bytes = source.read_bytes(&join_path(dir, file))?;
    Ok(AssetEntry::new(hash_name(file), file, bytes))
}
