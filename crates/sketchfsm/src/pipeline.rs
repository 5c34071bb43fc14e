//! Extraction pipeline: preprocess → nodes → transitions → assemble.
//!
//! This is the glue layer that wires the stages together in their fixed
//! order. Each stage fully consumes its input before the next begins, every
//! intermediate buffer is owned by the one in-flight run, and the assembled
//! graph is published as a single value.

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use crate::detect::{
    CircleDetectConfig, SegmentDetectConfig, circles, segments,
};
use crate::error::ExtractError;
use crate::graph::Automaton;
use crate::preprocess::{self, PreprocessConfig};

/// Top-level extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Preprocessing chain parameters.
    pub preprocess: PreprocessConfig,
    /// Circular node detection parameters.
    pub circles: CircleDetectConfig,
    /// Line-segment detection parameters.
    pub segments: SegmentDetectConfig,
}

/// Full extraction result for a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The assembled graph.
    pub automaton: Automaton,
    /// Input dimensions [width, height].
    pub image_size: [u32; 2],
}

/// Receives each newly assembled graph as one replace-all update.
///
/// The pipeline never publishes nodes and transitions separately, so an
/// implementor can never observe halves of two different detection runs.
pub trait Presenter {
    /// Replace whatever was previously displayed with `result`.
    fn present(&mut self, result: &ExtractionResult);
}

/// Minimal presenter holding the latest published result.
#[derive(Debug, Default)]
pub struct LatestGraph {
    current: Option<ExtractionResult>,
}

impl LatestGraph {
    /// The most recently published result, if any.
    pub fn current(&self) -> Option<&ExtractionResult> {
        self.current.as_ref()
    }
}

impl Presenter for LatestGraph {
    fn present(&mut self, result: &ExtractionResult) {
        self.current = Some(result.clone());
    }
}

/// Extract an automaton from an arbitrary raster image.
pub fn extract(image: &DynamicImage, config: &ExtractConfig) -> Result<ExtractionResult, ExtractError> {
    extract_gray(&image.to_luma8(), config)
}

/// Extract an automaton from an 8-bit grayscale image.
///
/// Zero detections at any stage is a valid empty result; only unusable
/// input fails the run.
pub fn extract_gray(
    gray: &GrayImage,
    config: &ExtractConfig,
) -> Result<ExtractionResult, ExtractError> {
    let (width, height) = gray.dimensions();
    let edges = preprocess::edge_map(gray, &config.preprocess)?;
    let nodes = circles::detect_nodes(&edges, &config.circles);
    let transitions = segments::detect_transitions(&edges, &nodes, &config.segments);
    tracing::info!(
        n_nodes = nodes.len(),
        n_transitions = transitions.len(),
        "extraction complete"
    );

    Ok(ExtractionResult {
        automaton: Automaton::new(nodes, transitions),
        image_size: [width, height],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::drawn_two_state_page;
    use std::collections::BTreeSet;

    #[test]
    fn blank_page_extracts_an_empty_graph() {
        let gray = GrayImage::from_pixel(320, 240, image::Luma([230]));
        let result = extract_gray(&gray, &ExtractConfig::default()).unwrap();
        assert!(result.automaton.is_empty());
        assert!(result.automaton.transitions().is_empty());
        assert_eq!(result.image_size, [320, 240]);
    }

    #[test]
    fn two_state_page_extracts_two_linked_nodes() {
        let page = drawn_two_state_page();
        let result = extract_gray(&page, &ExtractConfig::default()).unwrap();
        let graph = &result.automaton;

        assert_eq!(graph.nodes().len(), 2, "nodes: {:?}", graph.nodes());
        for (center_x, center_y) in [(150.0f32, 200.0f32), (450.0, 200.0)] {
            assert!(
                graph
                    .nodes()
                    .iter()
                    .any(|n| (n.x - center_x).abs() < 10.0 && (n.y - center_y).abs() < 10.0),
                "no node near ({center_x}, {center_y}): {:?}",
                graph.nodes()
            );
        }

        assert!(!graph.transitions().is_empty());
        for t in graph.transitions() {
            assert_ne!(t.from, t.to);
            let involved: BTreeSet<&str> = [
                graph.node(t.from).name.as_str(),
                graph.node(t.to).name.as_str(),
            ]
            .into();
            assert_eq!(involved, BTreeSet::from(["q0", "q1"]));
        }
    }

    #[test]
    fn presenter_only_ever_sees_whole_graphs() {
        let mut display = LatestGraph::default();
        assert!(display.current().is_none());

        let first = extract_gray(
            &GrayImage::from_pixel(64, 64, image::Luma([230])),
            &ExtractConfig::default(),
        )
        .unwrap();
        display.present(&first);
        assert!(display.current().unwrap().automaton.is_empty());

        let second = extract_gray(&drawn_two_state_page(), &ExtractConfig::default()).unwrap();
        display.present(&second);
        let shown = display.current().unwrap();
        assert_eq!(shown.automaton.nodes().len(), 2);
        assert_eq!(shown.image_size, [640, 480]);
    }
}
