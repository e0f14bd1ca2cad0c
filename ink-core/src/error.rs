//! Error types for core pipeline operations.

use thiserror::Error;

/// Result type for core pipeline operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the capture-to-feature pipeline.
///
/// Nothing in this pipeline is fatal: every failure path in the running
/// system degrades to a dropped message or a no-op. These variants exist
/// so the edges (deserialization, externally supplied vectors) can report
/// what they rejected.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A feature vector had the wrong number of elements.
    #[error("Feature vector must hold {expected} values, got {actual}")]
    FeatureLength {
        /// Required element count (28 * 28).
        expected: usize,
        /// Element count actually supplied.
        actual: usize,
    },

    /// A feature vector element fell outside the normalized [0, 1] range.
    #[error("Feature value {value} at index {index} is outside [0, 1]")]
    FeatureRange {
        /// Index of the offending element.
        index: usize,
        /// The out-of-range value.
        value: f32,
    },

    /// Wire payload failed to parse or validate.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
