//! Graph layout and rasterization.
//!
//! The renderer fits the detected coordinate range into a caller-sized
//! viewport: an isotropic scale about the bounding-box center (smaller axis
//! ratio, 10% margin, so the diagram never stretches) followed by a
//! centering translation. Transitions are drawn first, then nodes, so rings
//! and labels sit on top of the lines.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut,
};

use crate::graph::{Automaton, Node};

/// Target raster dimensions for one rendering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Build a viewport.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Minimum bounding-box extent. Keeps the scale finite when every node
/// shares one coordinate.
const MIN_EXTENT: f32 = 1.0;

/// Fraction of the viewport filled by the diagram; the rest is margin.
const FIT_MARGIN: f32 = 0.9;

/// Viewport-fitting transform: isotropic scale about the bounding-box
/// center, then a centering translation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitTransform {
    /// Centering translation.
    pub offset: [f32; 2],
    /// Isotropic scale factor.
    pub scale: f32,
    /// Scale pivot (bounding-box center, detected coordinates).
    pub pivot: [f32; 2],
}

impl FitTransform {
    /// Map a point from detected image coordinates to viewport coordinates.
    pub fn apply(&self, x: f32, y: f32) -> [f32; 2] {
        [
            (x - self.pivot[0]) * self.scale + self.pivot[0] + self.offset[0],
            (y - self.pivot[1]) * self.scale + self.pivot[1] + self.offset[1],
        ]
    }
}

/// Compute the viewport-fitting transform for a graph.
///
/// Returns `None` for an empty graph (nothing to fit). Extents are clamped
/// to [`MIN_EXTENT`] so collinear node sets cannot divide the scale by zero.
pub fn fit_transform(automaton: &Automaton, viewport: Viewport) -> Option<FitTransform> {
    let first = automaton.nodes().first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for node in automaton.nodes() {
        min_x = min_x.min(node.x);
        max_x = max_x.max(node.x);
        min_y = min_y.min(node.y);
        max_y = max_y.max(node.y);
    }

    let w = (max_x - min_x).max(MIN_EXTENT);
    let h = (max_y - min_y).max(MIN_EXTENT);
    let vw = viewport.width as f32;
    let vh = viewport.height as f32;

    Some(FitTransform {
        offset: [(vw - w) / 2.0 - min_x, (vh - h) / 2.0 - min_y],
        scale: (vw / w).min(vh / h) * FIT_MARGIN,
        pivot: [min_x + w / 2.0, min_y + h / 2.0],
    })
}

/// Immutable drawing style passed into the stateless drawing calls.
///
/// Lengths are in model units (detected coordinates) and scale with the
/// diagram; stroke thickness is in viewport pixels.
pub struct RenderStyle {
    /// Background fill.
    pub background: Rgb<u8>,
    /// Node ring stroke color.
    pub node_color: Rgb<u8>,
    /// Node ring radius, model units.
    pub node_radius: f32,
    /// Ring stroke thickness in pixels.
    pub ring_thickness: i32,
    /// Transition line and arrowhead color.
    pub transition_color: Rgb<u8>,
    /// Arrowhead arm length, model units.
    pub arrow_length: f32,
    /// Label color.
    pub text_color: Rgb<u8>,
    /// Label size, model units.
    pub text_size: f32,
    /// Label baseline offset below the node center, model units.
    pub text_dy: f32,
    /// Center marker dot color.
    pub dot_color: Rgb<u8>,
    /// Center marker dot radius, model units.
    pub dot_radius: f32,
    /// Label font. `None` skips label drawing.
    pub font: Option<FontVec>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Rgb([0, 0, 0]),
            node_color: Rgb([255, 0, 0]),
            node_radius: 50.0,
            ring_thickness: 5,
            transition_color: Rgb([0, 255, 0]),
            arrow_length: 6.0,
            text_color: Rgb([255, 255, 255]),
            text_size: 30.0,
            text_dy: 20.0,
            dot_color: Rgb([255, 255, 0]),
            dot_radius: 5.0,
            font: None,
        }
    }
}

impl RenderStyle {
    /// Default style with a font loaded from common system locations.
    ///
    /// Falls back to the fontless default (labels skipped) when none loads.
    pub fn with_system_font() -> Self {
        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/System/Library/Fonts/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];
        for path in font_paths {
            if let Ok(data) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(data) {
                    tracing::debug!(path, "loaded system font");
                    return Self {
                        font: Some(font),
                        ..Self::default()
                    };
                }
            }
        }
        tracing::debug!("no system font found, labels will be skipped");
        Self::default()
    }
}

/// Render a graph into a freshly allocated viewport-sized image.
///
/// An empty graph produces only the background fill.
pub fn render(automaton: &Automaton, viewport: Viewport, style: &RenderStyle) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(viewport.width, viewport.height, style.background);
    let Some(transform) = fit_transform(automaton, viewport) else {
        return canvas;
    };

    for transition in automaton.transitions() {
        draw_transition(
            &mut canvas,
            automaton.node(transition.from),
            automaton.node(transition.to),
            &transform,
            style,
        );
    }
    for node in automaton.nodes() {
        draw_node(&mut canvas, node, &transform, style);
    }
    canvas
}

/// Straight line plus a V-shaped arrowhead at the target, arms rotated
/// 30 degrees off the line direction.
fn draw_transition(
    canvas: &mut RgbImage,
    from: &Node,
    to: &Node,
    transform: &FitTransform,
    style: &RenderStyle,
) {
    let p0 = transform.apply(from.x, from.y);
    let p1 = transform.apply(to.x, to.y);
    draw_line_segment_mut(canvas, (p0[0], p0[1]), (p1[0], p1[1]), style.transition_color);

    let angle = (to.y - from.y).atan2(to.x - from.x);
    for rotation in [-std::f32::consts::FRAC_PI_6, std::f32::consts::FRAC_PI_6] {
        let theta = angle + rotation;
        let arm = transform.apply(
            to.x - style.arrow_length * theta.cos(),
            to.y - style.arrow_length * theta.sin(),
        );
        draw_line_segment_mut(canvas, (p1[0], p1[1]), (arm[0], arm[1]), style.transition_color);
    }
}

/// Stroke ring, centered label, and a small filled center-marker dot.
fn draw_node(canvas: &mut RgbImage, node: &Node, transform: &FitTransform, style: &RenderStyle) {
    let center = transform.apply(node.x, node.y);
    let cx = center[0].round() as i32;
    let cy = center[1].round() as i32;

    let radius = (style.node_radius * transform.scale).round().max(1.0) as i32;
    let half = style.ring_thickness / 2;
    for dr in -half..=half {
        let r = radius + dr;
        if r > 0 {
            draw_hollow_circle_mut(canvas, (cx, cy), r, style.node_color);
        }
    }

    if let Some(font) = &style.font {
        let scale = PxScale::from(style.text_size * transform.scale);
        let width = text_width(font, scale, &node.name);
        let baseline = center[1] + style.text_dy * transform.scale;
        let top = baseline - font.as_scaled(scale).ascent();
        draw_text_mut(
            canvas,
            style.text_color,
            (center[0] - width / 2.0).round() as i32,
            top.round() as i32,
            scale,
            font,
            &node.name,
        );
    }

    let dot_radius = (style.dot_radius * transform.scale).round().max(1.0) as i32;
    draw_filled_circle_mut(canvas, (cx, cy), dot_radius, style.dot_color);
}

/// Total advance width of `text` at `scale`.
fn text_width(font: &FontVec, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    text.chars()
        .map(|c| scaled.h_advance(scaled.scaled_glyph(c).id))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeId, Transition};

    fn two_node_graph() -> Automaton {
        Automaton::new(
            vec![Node::at("q0", 100.0, 100.0), Node::at("q1", 400.0, 100.0)],
            vec![Transition::placeholder(NodeId(0), NodeId(1))],
        )
    }

    fn has_color_near(canvas: &RgbImage, x: i32, y: i32, radius: i32, color: Rgb<u8>) -> bool {
        let (w, h) = canvas.dimensions();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let px = x + dx;
                let py = y + dy;
                if px >= 0
                    && py >= 0
                    && (px as u32) < w
                    && (py as u32) < h
                    && *canvas.get_pixel(px as u32, py as u32) == color
                {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn empty_graph_renders_background_only() {
        let style = RenderStyle::default();
        let canvas = render(&Automaton::default(), Viewport::new(320, 240), &style);
        assert_eq!(canvas.dimensions(), (320, 240));
        assert!(canvas.pixels().all(|p| *p == style.background));
        assert!(fit_transform(&Automaton::default(), Viewport::new(320, 240)).is_none());
    }

    #[test]
    fn transform_parameters_match_hand_computation() {
        // Bbox 300x0 -> height clamps to 1; viewport 800x600.
        let t = fit_transform(&two_node_graph(), Viewport::new(800, 600)).unwrap();
        assert_eq!(t.offset, [150.0, 199.5]);
        assert_eq!(t.pivot, [250.0, 100.5]);
        assert!((t.scale - 2.4).abs() < 1e-5, "scale {}", t.scale);
    }

    #[test]
    fn bounding_box_center_maps_to_viewport_center() {
        let t = fit_transform(&two_node_graph(), Viewport::new(800, 600)).unwrap();
        assert_eq!(t.apply(t.pivot[0], t.pivot[1]), [400.0, 300.0]);
    }

    #[test]
    fn rendering_is_idempotent() {
        let graph = two_node_graph();
        let viewport = Viewport::new(800, 600);
        assert_eq!(
            fit_transform(&graph, viewport),
            fit_transform(&graph, viewport)
        );

        let style = RenderStyle::default();
        let a = render(&graph, viewport, &style);
        let b = render(&graph, viewport, &style);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn shrinking_the_viewport_never_increases_scale() {
        let graph = two_node_graph();
        let mut previous = f32::INFINITY;
        for (w, h) in [(1600, 1200), (800, 600), (400, 300), (200, 150), (50, 40)] {
            let t = fit_transform(&graph, Viewport::new(w, h)).unwrap();
            assert!(
                t.scale <= previous,
                "scale {} grew at {w}x{h} (was {previous})",
                t.scale
            );
            previous = t.scale;
        }
    }

    #[test]
    fn collinear_nodes_keep_the_scale_finite() {
        // All nodes share y = 200: zero height extent.
        let graph = Automaton::new(
            vec![
                Node::at("q0", 100.0, 200.0),
                Node::at("q1", 250.0, 200.0),
                Node::at("q2", 400.0, 200.0),
            ],
            Vec::new(),
        );
        let t = fit_transform(&graph, Viewport::new(800, 600)).unwrap();
        assert!(t.scale.is_finite() && t.scale > 0.0);

        // A degenerate single-node graph as well.
        let single = Automaton::new(vec![Node::at("q0", 42.0, 7.0)], Vec::new());
        let t = fit_transform(&single, Viewport::new(800, 600)).unwrap();
        assert!(t.scale.is_finite() && t.scale > 0.0);
    }

    #[test]
    fn transition_line_and_arrowhead_land_near_the_target() {
        let style = RenderStyle::default();
        let graph = two_node_graph();
        let canvas = render(&graph, Viewport::new(800, 600), &style);

        // Transformed endpoints: (40, 298.8) and (760, 298.8); the line
        // midpoint sits at x = 400 and stays visible left of the target's
        // center dot.
        assert!(has_color_near(&canvas, 400, 299, 2, style.transition_color));
        assert!(has_color_near(&canvas, 700, 299, 2, style.transition_color));

        // Arrowhead arm tip: model (394.8, 97) -> viewport (747.5, 291.6),
        // clearly off the main line.
        assert!(has_color_near(&canvas, 748, 292, 3, style.transition_color));

        // Ring and center dot of the source node at viewport (40, 299),
        // ring radius 120.
        assert!(has_color_near(&canvas, 160, 299, 3, style.node_color));
        assert!(has_color_near(&canvas, 40, 299, 3, style.dot_color));
    }

    #[test]
    fn nodes_draw_on_top_of_transitions() {
        let style = RenderStyle::default();
        let graph = two_node_graph();
        let canvas = render(&graph, Viewport::new(800, 600), &style);
        // The target center dot covers the line terminus.
        assert_eq!(*canvas.get_pixel(760, 299), style.dot_color);
    }
}
