use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{ALPHA_THRESHOLD, MAX_PALETTE_SIZE, TRANSPARENT_INDEX};
use crate::image::format::{IndexedImage, RasterImage, Region};

#[derive(Error, Debug)]
pub enum QuantizeError {
    #[error("Palette overflow: maximum 256 colors supported, got {0}")]
    PaletteTooLarge(usize),
    #[error("Region {width}x{height} exceeds the 255x255 limit of indexed images")]
    DimensionsTooLarge { width: u32, height: u32 },
    #[error("Region {region:?} lies outside the {width}x{height} image")]
    RegionOutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },
}

pub type Rgb = [u8; 3];

/// The device palette. Index 0 is the transparent slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self, QuantizeError> {
        if colors.len() > MAX_PALETTE_SIZE {
            return Err(QuantizeError::PaletteTooLarge(colors.len()));
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Index of the closest opaque entry by squared RGB distance.
    ///
    /// Index 0 is skipped; ties keep the lowest index. Returns the transparent
    /// index when the palette has no opaque entries.
    pub fn nearest(&self, rgb: Rgb) -> u8 {
        let [r, g, b] = rgb.map(i32::from);
        let mut closest = TRANSPARENT_INDEX;
        let mut closest_dist = i32::MAX;

        for (index, color) in self.colors.iter().enumerate() {
            if index == TRANSPARENT_INDEX as usize {
                continue;
            }
            let [pr, pg, pb] = color.map(i32::from);
            let dist = (r - pr) * (r - pr) + (g - pg) * (g - pg) + (b - pb) * (b - pb);
            if dist < closest_dist {
                closest = index as u8;
                closest_dist = dist;
            }
        }

        closest
    }
}

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = QuantizeError;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        Palette::new(colors)
    }
}

impl From<Palette> for Vec<Rgb> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

/// Last resolved opaque color, reused for runs of identical pixels.
#[derive(Default)]
struct ColorCache {
    last: Option<(Rgb, u8)>,
}

impl ColorCache {
    fn resolve(&mut self, palette: &Palette, rgb: Rgb) -> u8 {
        match self.last {
            Some((color, index)) if color == rgb => index,
            _ => {
                let index = palette.nearest(rgb);
                self.last = Some((rgb, index));
                index
            }
        }
    }
}

/// Maps every pixel of `region` to a palette index.
///
/// Pixels with alpha below 128 always become the transparent index.
pub fn quantize_region(
    image: &RasterImage,
    region: Region,
    palette: &Palette,
) -> Result<IndexedImage, QuantizeError> {
    if !region.fits_in(image) {
        return Err(QuantizeError::RegionOutOfBounds {
            region,
            width: image.width(),
            height: image.height(),
        });
    }
    let (width, height) = match (u8::try_from(region.width), u8::try_from(region.height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(QuantizeError::DimensionsTooLarge {
                width: region.width,
                height: region.height,
            })
        }
    };

    let mut cache = ColorCache::default();
    let mut indices = Vec::with_capacity(width as usize * height as usize);

    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            let [r, g, b, a] = image.pixel(x, y);
            let index = if a < ALPHA_THRESHOLD {
                TRANSPARENT_INDEX
            } else {
                cache.resolve(palette, [r, g, b])
            };
            indices.push(index);
        }
    }

    Ok(IndexedImage {
        width,
        height,
        indices,
    })
}

/// Quantizes the whole image.
pub fn quantize(image: &RasterImage, palette: &Palette) -> Result<IndexedImage, QuantizeError> {
    quantize_region(image, image.full_region(), palette)
}
