//! High-level extraction API.
//!
//! [`Extractor`] is the primary entry point: it wraps an [`ExtractConfig`]
//! and exposes convenience methods for the common input kinds (decoded
//! image, grayscale buffer, file path).

use image::{DynamicImage, GrayImage};
use std::path::Path;

use crate::error::ExtractError;
use crate::pipeline::{self, ExtractConfig, ExtractionResult};

/// Primary extraction interface.
///
/// Create once, extract from many images.
///
/// # Examples
///
/// ```no_run
/// use sketchfsm::Extractor;
/// use image::GrayImage;
///
/// let extractor = Extractor::new();
/// let photo = GrayImage::new(640, 480);
/// let result = extractor.extract_gray(&photo).unwrap();
/// println!("found {} states", result.automaton.nodes().len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Create an extractor with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with full config control.
    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut ExtractConfig {
        &mut self.config
    }

    /// Extract an automaton from a decoded image of any pixel format.
    pub fn extract(&self, image: &DynamicImage) -> Result<ExtractionResult, ExtractError> {
        pipeline::extract(image, &self.config)
    }

    /// Extract an automaton from an 8-bit grayscale image.
    pub fn extract_gray(&self, gray: &GrayImage) -> Result<ExtractionResult, ExtractError> {
        pipeline::extract_gray(gray, &self.config)
    }

    /// Load an image file and extract an automaton from it.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractionResult, ExtractError> {
        let image = image::open(path)?;
        self.extract(&image)
    }
}
