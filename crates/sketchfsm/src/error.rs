//! Error types for the extraction pipeline.
//!
//! Detection emptiness is deliberately not an error: a stage that finds
//! nothing yields empty sequences and the run completes. Only unusable
//! input aborts a run.

use thiserror::Error;

/// Failure of one extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input raster has a zero dimension; no edge map can be produced.
    #[error("empty input image ({width}x{height})")]
    EmptyImage {
        /// Input width in pixels.
        width: u32,
        /// Input height in pixels.
        height: u32,
    },

    /// The image file could not be opened or decoded.
    #[error("failed to load image")]
    ImageLoad(#[from] image::ImageError),
}
