use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DUAL_VARIANT_AREA, DEFAULT_MAX_SPRITES, DEFAULT_VARIANT_SUFFIX};

/// Tunables of a packing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Sprite table cap; files past it are dropped.
    pub max_sprites: usize,
    /// Images with `w * h` below this also get a full-detail key.
    pub dual_variant_area: usize,
    /// Appended to the stem before hashing the full-detail key.
    pub variant_suffix: String,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            max_sprites: DEFAULT_MAX_SPRITES,
            dual_variant_area: DEFAULT_DUAL_VARIANT_AREA,
            variant_suffix: DEFAULT_VARIANT_SUFFIX.to_string(),
        }
    }
}
