use eframe::egui;
use egui::{pos2, vec2, Pos2, Rect};

use causal::{CausalNode, PortKind};

use crate::gui::node_ui;

/// Straight run out of a port before the curve starts, px.
pub const PORT_EXIT_RUN: f32 = 8.0;
/// Bounds for the bezier control offset, px.
pub const MIN_CURVE: f32 = 24.0;
pub const MAX_CURVE: f32 = 160.0;
const BEZIER_STEPS: usize = 24;

/// Port circle center on a laid-out node body.
pub fn port_anchor(body: Rect, port: PortKind) -> Pos2 {
    match port {
        PortKind::Top => body.center_top(),
        PortKind::Bottom => body.center_bottom(),
    }
}

/// Anchor derived from the stored position alone, for connections whose
/// node produced no rect this frame.
pub fn approx_port_anchor(node: &CausalNode, port: PortKind) -> Pos2 {
    let x = node.x + node_ui::NODE_WIDTH * 0.5;
    match port {
        PortKind::Top => pos2(x, node.y),
        PortKind::Bottom => pos2(x, node.y + node_ui::NODE_HEIGHT),
    }
}

/// Samples the connection curve between two port anchors: a short exit run
/// in each port's natural direction joined by a cubic bezier. Pure and
/// deterministic, so paths re-derive cheaply every frame.
pub fn smooth_path(
    source: Pos2,
    target: Pos2,
    source_port: PortKind,
    target_port: PortKind,
    curviness: f32,
) -> Vec<Pos2> {
    assert!(curviness.is_finite(), "curviness must be finite");
    assert!(curviness > 0.0, "curviness must be positive");

    let exit = source + vec2(0.0, source_port.direction_y() * PORT_EXIT_RUN);
    let entry = target + vec2(0.0, target_port.direction_y() * PORT_EXIT_RUN);

    let span = (target.x - source.x).abs();
    let offset = (span * curviness).clamp(MIN_CURVE, MAX_CURVE);
    let control_a = exit + vec2(0.0, source_port.direction_y() * offset);
    let control_b = entry + vec2(0.0, target_port.direction_y() * offset);

    let mut points = Vec::with_capacity(BEZIER_STEPS + 3);
    points.push(source);
    points.extend(sample_cubic_bezier(
        exit,
        control_a,
        control_b,
        entry,
        BEZIER_STEPS,
    ));
    points.push(target);
    points
}

fn sample_cubic_bezier(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, steps: usize) -> Vec<Pos2> {
    assert!(steps >= 2, "bezier sampling steps must be at least 2");
    let mut points = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let one_minus = 1.0 - t;
        let a = one_minus * one_minus * one_minus;
        let b = 3.0 * one_minus * one_minus * t;
        let c = 3.0 * one_minus * t * t;
        let d = t * t * t;
        let x = a * p0.x + b * p1.x + c * p2.x + d * p3.x;
        let y = a * p0.y + b * p1.y + c * p2.y + d * p3.y;
        points.push(pos2(x, y));
    }
    points
}

/// Min distance from a point to the sampled polyline, for hit-testing.
pub fn distance_to_path(path: &[Pos2], pos: Pos2) -> f32 {
    path.windows(2)
        .map(|pair| point_segment_distance(pos, pair[0], pair[1]))
        .fold(f32::INFINITY, f32::min)
}

fn point_segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}
