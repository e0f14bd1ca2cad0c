//! Rasterizer / feature extractor.
//!
//! Downsamples the 280x280 drawing surface to the 28x28 grid the inference
//! model expects, producing a flat row-major vector of normalized grayscale
//! values. Extraction is a pure function of the surface contents: the same
//! pixels always yield a bit-identical vector.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::surface::{DrawingSurface, SURFACE_SIZE};

/// Side length of the output grid.
pub const GRID_SIZE: u32 = 28;

/// Total element count of a feature vector (28 * 28).
pub const FEATURE_LEN: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// Box-filter scale: each output pixel averages a block this wide.
const BLOCK: u32 = SURFACE_SIZE / GRID_SIZE;

/// An ordered sequence of exactly 784 grayscale values in [0, 1],
/// row-major over the 28x28 grid.
///
/// Produced fresh on every export tick and immutable once constructed.
/// Serializes transparently as a bare JSON array of floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// Build a feature vector from raw values, validating length and range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FeatureLength`] if `values` does not hold
    /// exactly 784 elements, or [`CoreError::FeatureRange`] if any element
    /// falls outside [0, 1].
    pub fn from_vec(values: Vec<f32>) -> CoreResult<Self> {
        if values.len() != FEATURE_LEN {
            return Err(CoreError::FeatureLength {
                expected: FEATURE_LEN,
                actual: values.len(),
            });
        }
        for (index, &value) in values.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::FeatureRange { index, value });
            }
        }
        Ok(Self(values))
    }

    /// The values in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Value at the given grid cell.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is outside the 28x28 grid.
    #[must_use]
    pub fn at(&self, row: u32, col: u32) -> f32 {
        self.0[(row * GRID_SIZE + col) as usize]
    }

    /// Fraction of cells with any ink (value above the background).
    ///
    /// Cheap observability for the export loop; not part of the wire data.
    #[must_use]
    pub fn coverage(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let inked = self.0.iter().filter(|&&v| v > 0.0).count() as f32;
        #[allow(clippy::cast_precision_loss)]
        let total = FEATURE_LEN as f32;
        inked / total
    }
}

/// Extract a feature vector from the surface.
///
/// One deterministic pass: each 10x10 block of surface pixels is reduced to
/// the unweighted mean of its R, G and B channel values (alpha ignored),
/// normalized by 255. A blank surface yields the background's normalized
/// grayscale (0.0 for black) everywhere.
#[must_use]
pub fn extract(surface: &DrawingSurface) -> FeatureVector {
    let mut values = Vec::with_capacity(FEATURE_LEN);

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let mut sum: u32 = 0;
            for y in row * BLOCK..(row + 1) * BLOCK {
                for x in col * BLOCK..(col + 1) * BLOCK {
                    let px = surface.pixel(x, y);
                    sum += u32::from(px[0]) + u32::from(px[1]) + u32::from(px[2]);
                }
            }
            // Mean over 3 channels and BLOCK^2 pixels, normalized by 255.
            #[allow(clippy::cast_precision_loss)]
            let gray = sum as f32 / (3 * BLOCK * BLOCK) as f32 / 255.0;
            values.push(gray);
        }
    }

    FeatureVector(values)
}
