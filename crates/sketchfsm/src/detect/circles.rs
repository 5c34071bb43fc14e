//! Gradient-voting Hough search for circular node features.
//!
//! Every edge pixel with a strong Scharr gradient casts votes along the
//! gradient direction (both ways) at every radius in the search range.
//! Drawn circles produce accumulator peaks at their centers because the rim
//! gradients converge radially; the radius of an accepted center is then
//! recovered from a per-center distance histogram over the same pixels.

use image::GrayImage;

use super::dedup::dedup_candidates;
use crate::graph::Node;

/// Configuration for circular node detection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CircleDetectConfig {
    /// Accumulator downscale ratio relative to the image.
    pub accum_ratio: f32,
    /// Fraction of `min(width, height)` used as the minimum separation
    /// between accepted centers; scales sensitivity with resolution.
    pub min_dist_frac: f32,
    /// Scharr gradient magnitude gate for voting pixels.
    pub grad_threshold: f32,
    /// Minimum accumulator votes at an accepted center peak.
    pub vote_threshold: f32,
    /// Minimum search radius (pixels).
    pub r_min: f32,
    /// Maximum search radius (pixels).
    pub r_max: f32,
    /// Tighter acceptance range applied to the recovered radius.
    pub accept_r_min: f32,
    /// Upper bound of the acceptance range.
    pub accept_r_max: f32,
    /// A candidate closer than this multiple of its radius to an accepted
    /// node is treated as another detection of the same drawn circle.
    pub dedup_radius_factor: f32,
}

impl Default for CircleDetectConfig {
    fn default() -> Self {
        Self {
            accum_ratio: 1.5,
            min_dist_frac: 0.2,
            grad_threshold: 100.0,
            vote_threshold: 40.0,
            r_min: 30.0,
            r_max: 70.0,
            accept_r_min: 20.0,
            accept_r_max: 70.0,
            dedup_radius_factor: 2.5,
        }
    }
}

/// A circular node candidate before deduplication.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct CircleCandidate {
    /// Center x (pixels).
    pub x: f32,
    /// Center y (pixels).
    pub y: f32,
    /// Recovered rim radius (pixels).
    pub radius: f32,
    /// Accumulator votes at the center peak.
    pub score: f32,
}

/// Deposit a vote into the accumulator using bilinear interpolation.
#[inline]
fn bilinear_add_in_bounds(accum: &mut [f32], stride: usize, x: f32, y: f32, weight: f32) {
    let x0 = x as usize;
    let y0 = y as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let base = y0 * stride + x0;
    accum[base] += weight * (1.0 - fx) * (1.0 - fy);
    accum[base + 1] += weight * fx * (1.0 - fy);
    accum[base + stride] += weight * (1.0 - fx) * fy;
    accum[base + stride + 1] += weight * fx * fy;
}

/// Detect circular features in a binary edge map.
///
/// Returns candidates sorted by vote score (highest first), separated by at
/// least `min_dist_frac * min(width, height)` pixels, with radii inside the
/// search range. Zero detections is a valid, silent result.
pub fn detect_circles(edges: &GrayImage, config: &CircleDetectConfig) -> Vec<CircleCandidate> {
    let (w, h) = edges.dimensions();
    if w < 4 || h < 4 || config.r_max < config.r_min {
        return Vec::new();
    }

    let gx = imageproc::gradients::horizontal_scharr(edges);
    let gy = imageproc::gradients::vertical_scharr(edges);
    let gx_raw = gx.as_raw();
    let gy_raw = gy.as_raw();
    let threshold_sq = config.grad_threshold * config.grad_threshold;

    let ratio = config.accum_ratio.max(1.0);
    let aw = (w as f32 / ratio).ceil() as usize + 1;
    let ah = (h as f32 / ratio).ceil() as usize + 1;
    let mut accum = vec![0.0f32; aw * ah];

    let mut radii = Vec::new();
    let mut r = config.r_min;
    while r <= config.r_max {
        radii.push(r);
        r += 1.0;
    }
    if radii.is_empty() {
        return Vec::new();
    }

    // Voting pass; remember the gated pixels for radius recovery later.
    let stride = w as usize;
    let ax_limit = (aw - 1) as f32;
    let ay_limit = (ah - 1) as f32;
    let mut gated: Vec<[f32; 2]> = Vec::new();
    for y in 0..h as usize {
        let yf = y as f32;
        for x in 0..stride {
            let idx = y * stride + x;
            let gxv = gx_raw[idx] as f32;
            let gyv = gy_raw[idx] as f32;
            let mag_sq = gxv * gxv + gyv * gyv;
            if mag_sq < threshold_sq {
                continue;
            }

            let inv_mag = 1.0 / mag_sq.sqrt();
            let dx = gxv * inv_mag;
            let dy = gyv * inv_mag;
            let xf = x as f32;
            gated.push([xf, yf]);

            for &r in &radii {
                for dir in [1.0f32, -1.0] {
                    let cx = (xf + dir * dx * r) / ratio;
                    let cy = (yf + dir * dy * r) / ratio;
                    if cx >= 0.0 && cx < ax_limit && cy >= 0.0 && cy < ay_limit {
                        bilinear_add_in_bounds(&mut accum, aw, cx, cy, 1.0);
                    }
                }
            }
        }
    }

    // Peak extraction: local maxima above the vote gate, strongest first,
    // kept only when min_dist away from every stronger accepted center.
    let mut peaks: Vec<(f32, usize)> = Vec::new();
    for ay in 1..ah - 1 {
        for ax in 1..aw - 1 {
            let idx = ay * aw + ax;
            let votes = accum[idx];
            if votes < config.vote_threshold {
                continue;
            }
            let mut is_max = true;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nidx = (idx as i32 + dy * aw as i32 + dx) as usize;
                    if accum[nidx] > votes || (accum[nidx] == votes && nidx < idx) {
                        is_max = false;
                    }
                }
            }
            if is_max {
                peaks.push((votes, idx));
            }
        }
    }
    peaks.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then(a.1.cmp(&b.1)));

    let min_dist = config.min_dist_frac * w.min(h) as f32;
    let mut candidates: Vec<CircleCandidate> = Vec::new();
    for (votes, idx) in peaks {
        let cx = ((idx % aw) as f32 + 0.5) * ratio;
        let cy = ((idx / aw) as f32 + 0.5) * ratio;
        let too_close = candidates.iter().any(|c| {
            let dx = c.x - cx;
            let dy = c.y - cy;
            (dx * dx + dy * dy).sqrt() < min_dist
        });
        if too_close {
            continue;
        }
        if let Some(radius) = recover_radius(&gated, cx, cy, config.r_min, config.r_max) {
            candidates.push(CircleCandidate {
                x: cx,
                y: cy,
                radius,
                score: votes,
            });
        }
    }
    candidates
}

/// Histogram the center-to-edge distances of gated pixels and return the
/// most supported radius in the search range.
fn recover_radius(gated: &[[f32; 2]], cx: f32, cy: f32, r_min: f32, r_max: f32) -> Option<f32> {
    let n_bins = (r_max - r_min).round() as usize + 1;
    let mut bins = vec![0u32; n_bins];
    for p in gated {
        let d = ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt();
        if d >= r_min - 0.5 && d <= r_max + 0.5 {
            let bin = ((d - r_min).round().max(0.0) as usize).min(n_bins - 1);
            bins[bin] += 1;
        }
    }
    let (best_bin, &best_count) = bins
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
    (best_count > 0).then(|| r_min + best_bin as f32)
}

/// Detect, filter, and deduplicate circles, naming survivors in acceptance
/// order.
pub fn detect_nodes(edges: &GrayImage, config: &CircleDetectConfig) -> Vec<Node> {
    let raw = detect_circles(edges, config);
    let n_raw = raw.len();
    let in_range: Vec<CircleCandidate> = raw
        .into_iter()
        .filter(|c| c.radius >= config.accept_r_min && c.radius <= config.accept_r_max)
        .collect();
    let unique = dedup_candidates(in_range, config.dedup_radius_factor);
    tracing::debug!(
        n_raw,
        n_unique = unique.len(),
        "circle detection complete"
    );

    unique
        .into_iter()
        .enumerate()
        .map(|(index, c)| Node::at(format!("q{index}"), c.x, c.y))
        .collect()
}
