//! Shared helpers for image-based unit tests.
//!
//! Consolidated here so detector and pipeline tests draw their synthetic
//! strokes and edge maps the same way.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

/// Mark a one-pixel circle rim in an edge map.
pub(crate) fn stroke_circle(edges: &mut GrayImage, center: (i32, i32), radius: i32) {
    draw_hollow_circle_mut(edges, center, radius, Luma([255]));
}

/// Mark a one-pixel straight stroke in an edge map.
pub(crate) fn stroke_line(edges: &mut GrayImage, from: (f32, f32), to: (f32, f32)) {
    draw_line_segment_mut(edges, from, to, Luma([255]));
}

/// Render a synthetic "photograph" of a hand-drawn two-state diagram:
/// dark pen strokes on a bright page, two circles joined by a line.
///
/// Circle centers are (150, 200) and (450, 200) with rim radius 40.
pub(crate) fn drawn_two_state_page() -> GrayImage {
    let mut page = GrayImage::from_pixel(640, 480, Luma([235]));
    let ink = Luma([25]);
    for (cx, cy) in [(150, 200), (450, 200)] {
        // A few concentric rims approximate a pen stroke a few pixels wide.
        for r in 38..=42 {
            draw_hollow_circle_mut(&mut page, (cx, cy), r, ink);
        }
    }
    for dy in -2..=2i32 {
        let y = (200 + dy) as f32;
        draw_line_segment_mut(&mut page, (195.0, y), (405.0, y), ink);
    }
    page
}
