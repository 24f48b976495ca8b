// src/palette.rs

//! Expands base colors into brightness-scaled palette variants.
//!
//! Every base color yields one variant per multiplier. Variants are ordered
//! base-major, multiplier-minor, and that order is the index space of both the
//! dense lookup table and the rendered constant table:
//! `index = base_index * multipliers.len() + multiplier_index`.

use crate::color::Rgb;

/// Brightness multipliers applied to each base color, in index order.
pub const DEFAULT_MULTIPLIERS: [f32; 4] = [0.71, 0.86, 1.0, 0.53];

/// One (base color, multiplier) combination with its scaled channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteVariant {
    /// Position of the source color in the base palette.
    pub base_index: usize,
    /// Position of the multiplier in the multiplier list.
    pub multiplier_index: usize,
    /// Channels on the 0-255 scale after multiplication. Not rounded.
    pub rgb: [f32; 3],
}

impl PaletteVariant {
    /// Scales `base` by `multiplier` in single precision.
    pub fn new(base_index: usize, multiplier_index: usize, base: Rgb, multiplier: f32) -> Self {
        PaletteVariant {
            base_index,
            multiplier_index,
            rgb: base.channels().map(|c| c as f32 * multiplier),
        }
    }

    /// Builds a variant directly from already-scaled channels.
    pub fn from_rgb(base_index: usize, multiplier_index: usize, rgb: [f32; 3]) -> Self {
        PaletteVariant {
            base_index,
            multiplier_index,
            rgb,
        }
    }

    /// Channels mapped into `[0, 1]`.
    pub fn normalized(&self) -> [f32; 3] {
        self.rgb.map(|c| c / 255.0)
    }

    /// Squared Euclidean distance to a point on the 0-255 scale.
    #[inline]
    pub fn distance_squared(&self, point: [f32; 3]) -> f32 {
        distance_squared(self.rgb, point)
    }
}

#[inline]
pub(crate) fn distance_squared(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dr = b[0] - a[0];
    let dg = b[1] - a[1];
    let db = b[2] - a[2];
    dr * dr + dg * dg + db * db
}

/// Expands `base_colors` by `multipliers`.
///
/// Returns `base_colors.len() * multipliers.len()` variants; an empty input
/// gives an empty list.
pub fn expand(base_colors: &[Rgb], multipliers: &[f32]) -> Vec<PaletteVariant> {
    let mut variants = Vec::with_capacity(base_colors.len() * multipliers.len());
    for (base_index, &base) in base_colors.iter().enumerate() {
        for (multiplier_index, &multiplier) in multipliers.iter().enumerate() {
            variants.push(PaletteVariant::new(
                base_index,
                multiplier_index,
                base,
                multiplier,
            ));
        }
    }
    log::debug!(
        "Expanded {} base colors x {} multipliers into {} variants",
        base_colors.len(),
        multipliers.len(),
        variants.len()
    );
    variants
}
