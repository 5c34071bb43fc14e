//! Straight-stroke detection and endpoint-to-node association.
//!
//! A full rho/theta Hough accumulation over the edge map yields candidate
//! lines; each candidate is then walked across the image, collecting edge
//! runs that tolerate small gaps, so the output is finite segments with
//! endpoints rather than infinite lines. Endpoints associate to the nearest
//! detected node; segments whose endpoints land on one node are self-loops
//! and are dropped.
//!
//! No deduplication is performed on the result: parallel strokes between one
//! node pair produce redundant transitions. That mirrors the drawing (two
//! strokes were detected) and is documented, asserted behavior.

use image::GrayImage;

use crate::graph::{Node, NodeId, Transition};

/// Configuration for line-segment detection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SegmentDetectConfig {
    /// Rho (signed line offset) resolution in pixels.
    pub rho_resolution: f32,
    /// Theta resolution in radians.
    pub theta_resolution: f32,
    /// Minimum accumulator votes for a candidate line.
    pub vote_threshold: u32,
    /// Minimum accepted segment length in pixels.
    pub min_length: f32,
    /// Maximum run of missing edge pixels tolerated inside one segment.
    pub max_gap: f32,
}

impl Default for SegmentDetectConfig {
    fn default() -> Self {
        Self {
            rho_resolution: 1.0,
            theta_resolution: std::f32::consts::PI / 180.0,
            vote_threshold: 50,
            min_length: 50.0,
            max_gap: 10.0,
        }
    }
}

/// A detected straight stroke with two endpoints.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// First endpoint (walk order along the line).
    pub start: [f32; 2],
    /// Second endpoint.
    pub end: [f32; 2],
}

impl Segment {
    /// Euclidean endpoint distance.
    pub fn length(&self) -> f32 {
        ((self.end[0] - self.start[0]).powi(2) + (self.end[1] - self.start[1]).powi(2)).sqrt()
    }
}

/// Detect straight segments in a binary edge map.
pub fn detect_segments(edges: &GrayImage, config: &SegmentDetectConfig) -> Vec<Segment> {
    let (w, h) = edges.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let points: Vec<[f32; 2]> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| [x as f32, y as f32])
        .collect();
    if points.is_empty() {
        return Vec::new();
    }

    let diag = ((w as f32).powi(2) + (h as f32).powi(2)).sqrt();
    let n_theta = (std::f32::consts::PI / config.theta_resolution).round() as usize;
    let n_rho = (2.0 * diag / config.rho_resolution).ceil() as usize + 1;
    let trig: Vec<(f32, f32)> = (0..n_theta)
        .map(|t| {
            let theta = t as f32 * config.theta_resolution;
            (theta.cos(), theta.sin())
        })
        .collect();

    let mut accum = vec![0u32; n_theta * n_rho];
    for p in &points {
        for (t, &(cos_t, sin_t)) in trig.iter().enumerate() {
            let rho = p[0] * cos_t + p[1] * sin_t;
            let r = ((rho + diag) / config.rho_resolution).round() as usize;
            if r < n_rho {
                accum[t * n_rho + r] += 1;
            }
        }
    }

    // Strongest-first greedy peak selection. A small suppression window
    // swallows the accumulator "butterfly" of one line without touching
    // parallel strokes a few pixels apart.
    let mut cells: Vec<(u32, usize)> = accum
        .iter()
        .enumerate()
        .filter(|&(_, &votes)| votes >= config.vote_threshold)
        .map(|(idx, &votes)| (votes, idx))
        .collect();
    cells.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut peaks: Vec<(usize, usize)> = Vec::new();
    for (_, idx) in cells {
        let t = idx / n_rho;
        let r = idx % n_rho;
        let suppressed = peaks.iter().any(|&(pt, pr)| {
            pt.abs_diff(t) <= 2 && pr.abs_diff(r) <= 2
        });
        if !suppressed {
            peaks.push((t, r));
        }
    }

    let mut segments = Vec::new();
    for (t, r) in peaks {
        let (cos_t, sin_t) = trig[t];
        let rho = r as f32 * config.rho_resolution - diag;
        trace_line(edges, rho, cos_t, sin_t, config, &mut segments);
    }
    segments
}

/// Walk one Hough line across the image, emitting edge runs that satisfy
/// the gap and length gates.
fn trace_line(
    edges: &GrayImage,
    rho: f32,
    cos_t: f32,
    sin_t: f32,
    config: &SegmentDetectConfig,
    out: &mut Vec<Segment>,
) {
    let (w, h) = edges.dimensions();
    let base = [rho * cos_t, rho * sin_t];
    let dir = [-sin_t, cos_t];

    // Parameter range covering the image: project the corners onto the line.
    let mut s_min = f32::INFINITY;
    let mut s_max = f32::NEG_INFINITY;
    for corner in [
        [0.0, 0.0],
        [(w - 1) as f32, 0.0],
        [0.0, (h - 1) as f32],
        [(w - 1) as f32, (h - 1) as f32],
    ] {
        let s = (corner[0] - base[0]) * dir[0] + (corner[1] - base[1]) * dir[1];
        s_min = s_min.min(s);
        s_max = s_max.max(s);
    }

    let on_line = |x: f32, y: f32| -> bool {
        // The pixel itself or a one-pixel perpendicular neighbor, absorbing
        // rasterization jitter.
        for k in [0.0f32, 1.0, -1.0] {
            let xi = (x + k * cos_t).round();
            let yi = (y + k * sin_t).round();
            if xi >= 0.0
                && yi >= 0.0
                && (xi as u32) < w
                && (yi as u32) < h
                && edges.get_pixel(xi as u32, yi as u32)[0] > 0
            {
                return true;
            }
        }
        false
    };

    let mut run_start: Option<[f32; 2]> = None;
    let mut last_on: Option<(f32, [f32; 2])> = None;
    let mut s = s_min;
    while s <= s_max {
        let x = base[0] + s * dir[0];
        let y = base[1] + s * dir[1];
        let inside = x >= 0.0 && y >= 0.0 && x < w as f32 && y < h as f32;
        if inside && on_line(x, y) {
            if let Some((prev_s, _)) = last_on {
                if s - prev_s > config.max_gap {
                    close_run(run_start.take(), last_on, config.min_length, out);
                    run_start = Some([x, y]);
                }
            } else {
                run_start = Some([x, y]);
            }
            last_on = Some((s, [x, y]));
        }
        s += 1.0;
    }
    close_run(run_start, last_on, config.min_length, out);
}

fn close_run(
    start: Option<[f32; 2]>,
    last_on: Option<(f32, [f32; 2])>,
    min_length: f32,
    out: &mut Vec<Segment>,
) {
    if let (Some(start), Some((_, end))) = (start, last_on) {
        let seg = Segment { start, end };
        if seg.length() >= min_length {
            out.push(seg);
        }
    }
}

/// Index of the node whose center is nearest to `(x, y)`, if any.
fn nearest_node(x: f32, y: f32, nodes: &[Node]) -> Option<NodeId> {
    let mut best: Option<(f32, usize)> = None;
    for (index, node) in nodes.iter().enumerate() {
        let dist = ((node.x - x).powi(2) + (node.y - y).powi(2)).sqrt();
        match best {
            Some((min, _)) if min <= dist => {}
            _ => best = Some((dist, index)),
        }
    }
    best.map(|(_, index)| NodeId(index))
}

/// Turn segments into transitions by nearest-node endpoint association.
///
/// A segment is kept only when both endpoints found a node and the two nodes
/// differ; self-loop strokes are silently dropped. Redundant segments between
/// one node pair all survive (no dedup).
pub fn associate_segments(segments: &[Segment], nodes: &[Node]) -> Vec<Transition> {
    segments
        .iter()
        .filter_map(|seg| {
            let from = nearest_node(seg.start[0], seg.start[1], nodes)?;
            let to = nearest_node(seg.end[0], seg.end[1], nodes)?;
            (from != to).then(|| Transition::placeholder(from, to))
        })
        .collect()
}

/// Detect line segments and associate them with the detected nodes.
pub fn detect_transitions(
    edges: &GrayImage,
    nodes: &[Node],
    config: &SegmentDetectConfig,
) -> Vec<Transition> {
    let segments = detect_segments(edges, config);
    let transitions = associate_segments(&segments, nodes);
    tracing::debug!(
        n_segments = segments.len(),
        n_transitions = transitions.len(),
        "segment detection complete"
    );
    transitions
}
