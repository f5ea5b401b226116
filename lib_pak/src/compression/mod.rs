pub mod bitpack;
pub mod depth;
pub mod palette;

use log::{debug, info};
use palette::{Palette, QuantizeError};
use thiserror::Error;

use crate::image::format::{EncodedImage, IndexedImage, RasterImage};

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Quantization failed")]
    QuantizationFailed(#[from] QuantizeError),
}

/// An image in both of its stored forms.
pub struct CompressionResult {
    /// Plain 8bpp indices, used by the sprite table and the full-detail variant.
    pub indexed: IndexedImage,
    /// Narrowest depth that keeps every index.
    pub optimized: EncodedImage,
}

pub fn compress(image: &RasterImage, palette: &Palette) -> Result<CompressionResult, CompressionError> {
    info!(
        "Starting compression of {}x{} image",
        image.width(),
        image.height()
    );

    // Step 1: Nearest palette color for every pixel
    let indexed = palette::quantize(image, palette)?;
    debug!("Quantized: {} indices", indexed.indices.len());

    // Step 2: Narrowest bit depth
    let optimized = depth::optimize(&indexed);
    debug!(
        "Depth optimized: {}bpp, {} payload bytes",
        optimized.depth.bits(),
        optimized.payload.len()
    );

    info!(
        "Compression completed: {} -> {} bytes",
        image.rgba_data().len(),
        EncodedImage::HEADER_SIZE + optimized.payload.len()
    );

    Ok(CompressionResult { indexed, optimized })
}
