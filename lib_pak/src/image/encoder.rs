use log::{debug, info};
use thiserror::Error;

use crate::compression::palette::{quantize, Palette};
use crate::compression::{compress, CompressionError};
use crate::image::format::RasterImage;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Failed to compress image data")]
    CompressionFailed(#[from] CompressionError),
}

/// Encodes an image as a depth-optimized payload: `[bias][depth][w][h][packed...]`.
pub fn encode(image: &RasterImage, palette: &Palette) -> Result<Vec<u8>, EncodingError> {
    info!("Starting encoding");

    let compressed = compress(image, palette)?;
    let encoded = compressed.optimized.to_bytes();
    debug!(
        "Header written:\nBias: {}\nDepth: {}\nWidth: {}\nHeight: {}",
        encoded[0], encoded[1], encoded[2], encoded[3]
    );

    info!("Encoding process completed successfully");
    Ok(encoded)
}

/// Encodes an image as plain 8bpp indices: `[w][h][indices...]`.
pub fn encode_indexed(image: &RasterImage, palette: &Palette) -> Result<Vec<u8>, EncodingError> {
    let indexed = quantize(image, palette).map_err(CompressionError::from)?;
    Ok(indexed.to_bytes())
}
