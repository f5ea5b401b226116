//! Re-packs 8bpp index images at the narrowest depth that keeps every index.

use log::debug;

use super::bitpack;
use crate::constants::TRANSPARENT_INDEX;
use crate::image::format::{BitDepth, EncodedImage, IndexedImage};

/// Nibbles hold 0..=15 and 0 stays transparent, so shifted indices top out at 15.
const NIBBLE_MAX: u8 = 0x0F;

/// Smallest and largest non-transparent index used by an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub min: u8,
    pub max: u8,
}

impl IndexRange {
    /// Scans the indices, ignoring the transparent one. `None` if nothing is opaque.
    pub fn scan(indices: &[u8]) -> Option<Self> {
        indices
            .iter()
            .copied()
            .filter(|&c| c != TRANSPARENT_INDEX)
            .fold(None, |range, c| match range {
                None => Some(IndexRange { min: c, max: c }),
                Some(r) => Some(IndexRange {
                    min: r.min.min(c),
                    max: r.max.max(c),
                }),
            })
    }

    pub fn spread(&self) -> u8 {
        self.max - self.min
    }

    /// Value subtracted from non-zero indices so the smallest becomes 1.
    pub fn bias(&self) -> u8 {
        self.min - 1
    }
}

/// Picks the narrowest depth for `image` and re-encodes it.
pub fn optimize(image: &IndexedImage) -> EncodedImage {
    let range = IndexRange::scan(&image.indices);
    let encoded = match range {
        None => encode_mask(image, 0),
        Some(r) if r.spread() == 0 => encode_mask(image, r.bias()),
        // A spread of 15 would shift to 16 and overflow the nibble, so it goes to 8bpp.
        Some(r) if r.max - r.bias() <= NIBBLE_MAX => encode_nibbles(image, r.bias()),
        Some(_) => encode_full(image),
    };
    debug!(
        "Optimized {}x{} image: range {:?} -> {}bpp, bias {}",
        image.width,
        image.height,
        range,
        encoded.depth.bits(),
        encoded.bias
    );
    encoded
}

/// 1bpp: one bit per pixel set for any opaque index, rows padded to bytes.
pub fn encode_mask(image: &IndexedImage, bias: u8) -> EncodedImage {
    let bits: Vec<u8> = image
        .indices
        .iter()
        .map(|&c| u8::from(c != TRANSPARENT_INDEX))
        .collect();
    EncodedImage {
        bias,
        depth: BitDepth::One,
        width: image.width,
        height: image.height,
        payload: bitpack::pack_rows(&bits, image.width as usize, BitDepth::One),
    }
}

/// 4bpp: opaque indices shifted down by `bias`, two pixels per byte.
pub fn encode_nibbles(image: &IndexedImage, bias: u8) -> EncodedImage {
    let shifted: Vec<u8> = image
        .indices
        .iter()
        .map(|&c| if c == TRANSPARENT_INDEX { c } else { c - bias })
        .collect();
    EncodedImage {
        bias,
        depth: BitDepth::Four,
        width: image.width,
        height: image.height,
        payload: bitpack::pack(&shifted, BitDepth::Four),
    }
}

/// 8bpp: indices stored as they are.
pub fn encode_full(image: &IndexedImage) -> EncodedImage {
    EncodedImage {
        bias: 0,
        depth: BitDepth::Eight,
        width: image.width,
        height: image.height,
        payload: image.indices.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u8, height: u8, indices: Vec<u8>) -> IndexedImage {
        IndexedImage::new(width, height, indices).unwrap()
    }

    #[test]
    fn test_scan_ignores_transparent() {
        let range = IndexRange::scan(&[0, 9, 0, 4, 7]).unwrap();
        assert_eq!(range, IndexRange { min: 4, max: 9 });
        assert_eq!(range.spread(), 5);
        assert_eq!(range.bias(), 3);
        assert_eq!(IndexRange::scan(&[0, 0]), None);
    }

    #[test]
    fn test_single_index_becomes_mask() {
        let encoded = optimize(&image(3, 2, vec![5, 0, 5, 0, 5, 5]));
        assert_eq!(encoded.depth, BitDepth::One);
        assert_eq!(encoded.bias, 4);
        assert_eq!(encoded.payload, vec![0b1010_0000, 0b0110_0000]);
        assert_eq!(
            encoded.to_bytes(),
            vec![4, 1, 3, 2, 0b1010_0000, 0b0110_0000]
        );
    }

    #[test]
    fn test_all_transparent_becomes_empty_mask() {
        let encoded = optimize(&image(9, 1, vec![0; 9]));
        assert_eq!(encoded.depth, BitDepth::One);
        assert_eq!(encoded.bias, 0);
        assert_eq!(encoded.payload, vec![0, 0]);
    }

    #[test]
    fn test_only_index_one_has_zero_bias() {
        let encoded = optimize(&image(2, 1, vec![1, 1]));
        assert_eq!(encoded.depth, BitDepth::One);
        assert_eq!(encoded.bias, 0);
        assert_eq!(encoded.payload, vec![0b1100_0000]);
    }

    #[test]
    fn test_narrow_range_becomes_nibbles() {
        let encoded = optimize(&image(3, 1, vec![10, 0, 12]));
        assert_eq!(encoded.depth, BitDepth::Four);
        assert_eq!(encoded.bias, 9);
        assert_eq!(encoded.payload, vec![0x10, 0x30]);
        assert_eq!(encoded.to_bytes(), vec![9, 4, 3, 1, 0x10, 0x30]);
    }

    #[test]
    fn test_range_fourteen_fits_nibbles() {
        let encoded = optimize(&image(2, 1, vec![20, 34]));
        assert_eq!(encoded.depth, BitDepth::Four);
        assert_eq!(encoded.payload, vec![0x1F]);
    }

    #[test]
    fn test_range_fifteen_stays_full() {
        // 35 - 19 would need a sixteenth nibble value
        let encoded = optimize(&image(2, 1, vec![20, 35]));
        assert_eq!(encoded.depth, BitDepth::Eight);
        assert_eq!(encoded.bias, 0);
        assert_eq!(encoded.payload, vec![20, 35]);
    }

    #[test]
    fn test_wide_range_stays_full() {
        let indices = vec![1, 2, 200, 0];
        let encoded = optimize(&image(2, 2, indices.clone()));
        assert_eq!(encoded.depth, BitDepth::Eight);
        let mut expected = vec![0, 8, 2, 2];
        expected.extend(indices);
        assert_eq!(encoded.to_bytes(), expected);
    }

    #[test]
    fn test_payload_len_matches_depth() {
        let cases = [
            image(9, 3, vec![4; 27]),
            image(5, 3, (0..15).map(|i| (i % 3) + 1).collect()),
            image(4, 4, (0..16).map(|i| i * 15).collect()),
        ];
        for img in &cases {
            let encoded = optimize(img);
            assert_eq!(
                encoded.payload.len(),
                encoded.depth.payload_len(img.width, img.height)
            );
        }
    }
}
