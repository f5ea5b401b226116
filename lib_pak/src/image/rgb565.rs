//! Direct RGBA to RGB565 conversion for full-screen backgrounds.
//!
//! No palette is involved. The dump is `[w][h][pixel...]`, every element a
//! little-endian u16.

use thiserror::Error;

use super::format::RasterImage;
use crate::constants::{ALPHA_THRESHOLD, RGB565_TRANSPARENT};

#[derive(Error, Debug)]
pub enum Rgb565Error {
    #[error("Image {width}x{height} does not fit the 16-bit size header")]
    DimensionsTooLarge { width: u32, height: u32 },
}

/// Scales an 8-bit channel to `max` with truncation.
#[inline]
fn scale(channel: u8, max: u16) -> u16 {
    (f64::from(channel) / 255.0 * f64::from(max)) as u16
}

/// Packs one RGBA pixel. Alpha below 128 yields [`RGB565_TRANSPARENT`].
pub fn rgb565(rgba: [u8; 4]) -> u16 {
    let [r, g, b, a] = rgba;
    if a < ALPHA_THRESHOLD {
        return RGB565_TRANSPARENT;
    }
    (scale(r, 0x1F) << 11) | (scale(g, 0x3F) << 5) | scale(b, 0x1F)
}

/// Converts the image to `[w, h, pixels...]`, row-major.
pub fn convert(image: &RasterImage) -> Result<Vec<u16>, Rgb565Error> {
    let (width, height) = match (u16::try_from(image.width()), u16::try_from(image.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Rgb565Error::DimensionsTooLarge {
                width: image.width(),
                height: image.height(),
            })
        }
    };

    let mut out = Vec::with_capacity(2 + width as usize * height as usize);
    out.push(width);
    out.push(height);
    out.extend(
        image
            .rgba_data()
            .chunks_exact(4)
            .map(|p| rgb565([p[0], p[1], p[2], p[3]])),
    );
    Ok(out)
}

/// Serializes a converted dump as little-endian bytes.
pub fn to_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries() {
        assert_eq!(rgb565([255, 0, 0, 255]), 0xF800);
        assert_eq!(rgb565([0, 255, 0, 255]), 0x07E0);
        assert_eq!(rgb565([0, 0, 255, 255]), 0x001F);
        assert_eq!(rgb565([255, 255, 255, 255]), 0xFFFF);
        assert_eq!(rgb565([0, 0, 0, 128]), 0x0000);
    }

    #[test]
    fn test_truncates_channels() {
        // 128/255*31 = 15.58, 128/255*63 = 31.62
        assert_eq!(rgb565([128, 128, 128, 255]), (15 << 11) | (31 << 5) | 15);
        assert_eq!(rgb565([8, 4, 8, 255]), 0);
        assert_eq!(rgb565([9, 5, 9, 255]), (1 << 11) | (1 << 5) | 1);
    }

    #[test]
    fn test_transparent_sentinel() {
        assert_eq!(rgb565([12, 200, 7, 127]), 0xF81F);
        assert_eq!(rgb565([0, 0, 0, 0]), RGB565_TRANSPARENT);
    }

    #[test]
    fn test_convert_layout() {
        let pixels = vec![
            255, 0, 0, 255, // Red
            0, 0, 0, 0, // Clear
            0, 0, 255, 255, // Blue
        ];
        let image = RasterImage::new(3, 1, pixels).unwrap();
        let values = convert(&image).unwrap();
        assert_eq!(values, vec![3, 1, 0xF800, 0xF81F, 0x001F]);
        assert_eq!(
            to_bytes(&values),
            vec![3, 0, 1, 0, 0x00, 0xF8, 0x1F, 0xF8, 0x1F, 0x00]
        );
    }

    #[test]
    fn test_convert_too_wide() {
        let image = RasterImage::new(65536, 0, Vec::new()).unwrap();
        assert!(matches!(
            convert(&image),
            Err(Rgb565Error::DimensionsTooLarge { width: 65536, .. })
        ));
    }
}
