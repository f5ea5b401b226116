use log::{debug, error};
use thiserror::Error;

use super::format::{BitDepth, EncodedImage, IndexedImage};
use crate::compression::bitpack;
use crate::constants::TRANSPARENT_INDEX;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Payload too short for a header: {0} bytes")]
    Truncated(usize),
    #[error("Unknown depth tag {0}")]
    UnknownDepth(u8),
    #[error("Payload length {actual} does not match {expected} for a {depth}bpp {width}x{height} image")]
    LengthMismatch {
        depth: u8,
        width: u8,
        height: u8,
        expected: usize,
        actual: usize,
    },
}

/// Parses `[bias][depth][w][h][packed...]` without unpacking it.
pub fn parse(encoded_data: &[u8]) -> Result<EncodedImage, DecodeError> {
    if encoded_data.len() < EncodedImage::HEADER_SIZE {
        error!("Payload of {} bytes has no room for a header", encoded_data.len());
        return Err(DecodeError::Truncated(encoded_data.len()));
    }
    let (bias, tag, width, height) = (
        encoded_data[0],
        encoded_data[1],
        encoded_data[2],
        encoded_data[3],
    );
    let depth = BitDepth::from_tag(tag).ok_or_else(|| {
        error!("Unknown depth tag {}", tag);
        DecodeError::UnknownDepth(tag)
    })?;
    debug!(
        "Header read: bias={} depth={} width={} height={}",
        bias, tag, width, height
    );

    let payload = &encoded_data[EncodedImage::HEADER_SIZE..];
    let expected = depth.payload_len(width, height);
    if payload.len() != expected {
        error!(
            "Payload length {} does not match expected {}",
            payload.len(),
            expected
        );
        return Err(DecodeError::LengthMismatch {
            depth: tag,
            width,
            height,
            expected,
            actual: payload.len(),
        });
    }

    Ok(EncodedImage {
        bias,
        depth,
        width,
        height,
        payload: payload.to_vec(),
    })
}

/// Restores the 8bpp indices of a depth-optimized payload.
pub fn decode(encoded_data: &[u8]) -> Result<IndexedImage, DecodeError> {
    let encoded = parse(encoded_data)?;
    Ok(expand(&encoded))
}

/// Undoes the packing and the bias of an [`EncodedImage`].
pub fn expand(encoded: &EncodedImage) -> IndexedImage {
    let (w, h) = (encoded.width as usize, encoded.height as usize);
    let indices = match encoded.depth {
        BitDepth::Eight => encoded.payload.clone(),
        BitDepth::Four => bitpack::unpack(&encoded.payload, w * h, BitDepth::Four)
            .into_iter()
            .map(|c| restore(c, encoded.bias))
            .collect(),
        BitDepth::One => bitpack::unpack_rows(&encoded.payload, w, h, BitDepth::One)
            .into_iter()
            .map(|bit| restore(bit, encoded.bias))
            .collect(),
    };

    IndexedImage {
        width: encoded.width,
        height: encoded.height,
        indices,
    }
}

#[inline]
fn restore(value: u8, bias: u8) -> u8 {
    if value == TRANSPARENT_INDEX {
        TRANSPARENT_INDEX
    } else {
        value.wrapping_add(bias)
    }
}
