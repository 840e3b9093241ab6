//! Error types for hotspot.

use thiserror::Error;

/// Result alias for hotspot operations.
pub type HotspotResult<T> = std::result::Result<T, HotspotError>;

/// Errors that can occur when decoding detections or rendering density maps.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HotspotError {
    /// The raw output tensor does not have the expected layout.
    #[error("malformed tensor (rank {rank}): {reason}")]
    MalformedTensor {
        /// What was wrong with the tensor.
        reason: &'static str,
        /// Rank of the offending shape.
        rank: usize,
    },
    /// Only single-image batches are decoded.
    #[error("unsupported batch size {batch}, expected 1")]
    UnsupportedBatch {
        /// Batch dimension found in the shape.
        batch: usize,
    },
    /// The backing buffer is shorter than the declared shape requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall {
        /// Number of elements required by the shape.
        needed: usize,
        /// Number of elements available.
        got: usize,
    },
    /// Image or grid dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Width in pixels.
        width: usize,
        /// Height in pixels.
        height: usize,
    },
    /// A detection box failed validation.
    #[error("invalid box: {reason}")]
    InvalidBox {
        /// Why the box was rejected.
        reason: &'static str,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image decoding or encoding failed.
    #[error("image io error: {reason}")]
    ImageIo {
        /// Error message reported by the image backend.
        reason: String,
    },
}
