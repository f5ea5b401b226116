/// Palette index reserved for transparent pixels. Never picked by the color search.
pub const TRANSPARENT_INDEX: u8 = 0;

/// Pixels with alpha below this value are transparent.
pub const ALPHA_THRESHOLD: u8 = 128;

pub const MAX_PALETTE_SIZE: usize = 256;

/// RGB565 value written for transparent pixels (R=0x1F, G=0, B=0x1F).
pub const RGB565_TRANSPARENT: u16 = 0xF81F;

pub const DEFAULT_MAX_SPRITES: usize = 3000;
pub const DEFAULT_DUAL_VARIANT_AREA: usize = 128 * 128;
pub const DEFAULT_VARIANT_SUFFIX: &str = ":8";

pub const IMAGE_EXT: &str = "png";
pub const PACK_EXT: &str = "res";
pub const RGB565_EXT: &str = "565";

pub const SPRITE_TABLE_FILE: &str = "assets.bin";
pub const SPRITE_HEADER_FILE: &str = "assets.h";
