//! sketchfsm — extract finite-automaton graphs from photographs of
//! hand-drawn diagrams, and render them as clean graphs.
//!
//! The pipeline stages are:
//!
//! 1. **Preprocess** – grayscale conversion, Gaussian blur, morphological
//!    opening, adaptive binarization, Canny edge extraction.
//! 2. **Nodes** – Hough circular-feature search with radius gating and
//!    proximity deduplication.
//! 3. **Transitions** – line-segment search, endpoint-to-nearest-node
//!    association, self-loop rejection.
//! 4. **Assemble** – nodes and transitions published as one atomic graph.
//! 5. **Render** – viewport-fitting transform, transitions-then-nodes
//!    rasterization.
//!
//! # Public API
//! - [`Extractor`] as primary entry point, [`ExtractConfig`] for tuning
//! - [`Automaton`] / [`Node`] / [`Transition`] graph model
//! - [`render`] / [`fit_transform`] / [`RenderStyle`] for display

pub mod detect;
mod error;
mod extractor;
mod graph;
mod pipeline;
pub mod preprocess;
pub mod render;
#[cfg(test)]
mod test_utils;

pub use detect::{CircleDetectConfig, SegmentDetectConfig};
pub use error::ExtractError;
pub use extractor::Extractor;
pub use graph::{Automaton, Node, NodeId, PLACEHOLDER_SYMBOL, Transition};
pub use pipeline::{
    ExtractConfig, ExtractionResult, LatestGraph, Presenter, extract, extract_gray,
};
pub use preprocess::PreprocessConfig;
pub use render::{FitTransform, RenderStyle, Viewport, fit_transform, render};
