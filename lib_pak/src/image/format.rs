use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Invalid pixel data length: expected {expected} bytes for {width}x{height}, got {actual}")]
    InvalidBufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Index buffer length {actual} does not match {width}x{height}")]
    InvalidIndexLength { width: u8, height: u8, actual: usize },
}

/// An RGBA8 raster as handed over by the image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba_data: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgba_data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * 4;
        if rgba_data.len() != expected {
            return Err(ImageError::InvalidBufferLength {
                width,
                height,
                expected,
                actual: rgba_data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba_data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    /// RGBA of the pixel at (x, y). Caller keeps the coordinates in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba_data[i],
            self.rgba_data[i + 1],
            self.rgba_data[i + 2],
            self.rgba_data[i + 3],
        ]
    }

    /// The region covering the whole image.
    pub fn full_region(&self) -> Region {
        Region {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

/// A rectangular window into a [`RasterImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn fits_in(&self, image: &RasterImage) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= image.width())
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= image.height())
    }
}

/// Bits used per palette index in an encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BitDepth {
    One = 1,
    Four = 4,
    Eight = 8,
}

impl BitDepth {
    /// The tag stored in the second header byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(BitDepth::One),
            4 => Some(BitDepth::Four),
            8 => Some(BitDepth::Eight),
            _ => None,
        }
    }

    pub fn bits(self) -> usize {
        self as usize
    }

    pub fn pixels_per_byte(self) -> usize {
        8 / self.bits()
    }

    pub fn mask(self) -> u8 {
        match self {
            BitDepth::One => 0x01,
            BitDepth::Four => 0x0F,
            BitDepth::Eight => 0xFF,
        }
    }

    /// Payload size for an image of the given dimensions.
    ///
    /// 1bpp rows are padded to whole bytes; 4bpp nibbles run on across rows.
    pub fn payload_len(self, width: u8, height: u8) -> usize {
        let (w, h) = (width as usize, height as usize);
        match self {
            BitDepth::One => w.div_ceil(8) * h,
            BitDepth::Four => (w * h).div_ceil(2),
            BitDepth::Eight => w * h,
        }
    }
}

/// An 8bpp palette-index image: `[w][h][indices...]` once serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u8,
    pub height: u8,
    pub indices: Vec<u8>,
}

impl IndexedImage {
    pub const HEADER_SIZE: usize = 2;

    pub fn new(width: u8, height: u8, indices: Vec<u8>) -> Result<Self, ImageError> {
        if indices.len() != width as usize * height as usize {
            return Err(ImageError::InvalidIndexLength {
                width,
                height,
                actual: indices.len(),
            });
        }
        Ok(Self {
            width,
            height,
            indices,
        })
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::HEADER_SIZE + self.indices.len());
        bytes.push(self.width);
        bytes.push(self.height);
        bytes.extend_from_slice(&self.indices);
        bytes
    }
}

/// A depth-optimized payload: `[bias][depth][w][h][packed...]` once serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Subtracted from every non-zero index before packing; 0 for 8bpp.
    pub bias: u8,
    pub depth: BitDepth,
    pub width: u8,
    pub height: u8,
    pub payload: Vec<u8>,
}

impl EncodedImage {
    pub const HEADER_SIZE: usize = 4;

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::HEADER_SIZE + self.payload.len());
        bytes.push(self.bias);
        bytes.push(self.depth.tag());
        bytes.push(self.width);
        bytes.push(self.height);
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}
