//! Quadratic Bezier helpers for stroke smoothing

use glam::Vec2;

use crate::constants::{BEZIER_T_STEP, CONTROL_POINT_RATIO};

/// Single control point from three consecutive samples
#[inline]
pub fn control_point(prev: Vec2, prev_prev: Vec2, candidate: Vec2) -> Vec2 {
    prev + (candidate - prev_prev) * CONTROL_POINT_RATIO
}

#[inline]
pub fn quadratic_bezier(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

/// Points along the curve whose chord from the previously emitted point is
/// at least `space`. The start point itself is not emitted.
pub fn equidistant_bezier_points(start: Vec2, control: Vec2, end: Vec2, space: f32) -> Vec<Vec2> {
    // Integer steps so t lands exactly on 1.0
    let steps = (1.0 / BEZIER_T_STEP).round() as u32;
    let mut points = Vec::new();
    let mut last = start;

    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let p = quadratic_bezier(start, control, end, t);
        if p.distance(last) >= space {
            points.push(p);
            last = p;
        }
    }
    points
}
