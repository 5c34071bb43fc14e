//! Feature detectors over the binary edge map.
//!
//! `circles` finds circular node candidates by gradient Hough voting,
//! `dedup` merges repeated detections of one drawn circle, and `segments`
//! finds straight strokes and associates their endpoints with nodes.

pub mod circles;
pub mod dedup;
pub mod segments;

pub use circles::{CircleCandidate, CircleDetectConfig, detect_circles, detect_nodes};
pub use segments::{
    Segment, SegmentDetectConfig, associate_segments, detect_segments, detect_transitions,
};
