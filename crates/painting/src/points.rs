//! Point generation: turns sparse pointer samples into evenly spaced stamps
//!
//! Samples that moved less than one spacing step (plus the lag distance) are
//! absorbed. Accepted samples are pulled back by [`LAG_DISTANCE`] along the
//! direction of travel and the gap to the previous point is filled either
//! along a smoothed quadratic curve or along a straight line.

use stampbrush_config::{BrushConfig, StrokeSettings};
use tracing::debug;

use crate::constants::{LAG_DISTANCE, MIN_SPACE_PIXEL};
use crate::curve::{control_point, equidistant_bezier_points};
use crate::types::RawPoint;

/// Remembers the last two accepted points of the current stroke
#[derive(Debug, Clone, Default)]
pub struct PointGenerator {
    prev: Option<RawPoint>,
    prev_prev: Option<RawPoint>,
}

impl PointGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the stroke so the next sample starts fresh
    pub fn reset(&mut self) {
        self.prev = None;
        self.prev_prev = None;
    }

    pub fn prev(&self) -> Option<RawPoint> {
        self.prev
    }

    /// Raw points to stamp for a new sample. Empty when the sample is dropped.
    pub fn generate(&mut self, sample: RawPoint, base: &BrushConfig, settings: &StrokeSettings) -> Vec<RawPoint> {
        let Some(prev) = self.prev.filter(|_| settings.spacing) else {
            self.advance(sample);
            return vec![sample];
        };

        let mut distance = sample.distance(&prev);
        let space = base.space().max(MIN_SPACE_PIXEL);
        if (distance / space).floor() <= 0.0 || distance < space + LAG_DISTANCE {
            return Vec::new();
        }

        let from = prev.position();
        let direction = (sample.position() - from) / distance;
        let target = from + direction * (distance - LAG_DISTANCE);
        distance -= LAG_DISTANCE;

        let pressure_at = |t: f32| prev.pressure + (sample.pressure - prev.pressure) * t;

        let points: Vec<RawPoint> = if settings.smoothing {
            let prev_prev = self.prev_prev.unwrap_or(prev).position();
            let control = control_point(from, prev_prev, target);
            let curve = equidistant_bezier_points(from, control, target, space);
            let len = curve.len() as f32;
            curve
                .into_iter()
                .enumerate()
                .map(|(i, p)| RawPoint::new(p.x, p.y, pressure_at(i as f32 / len)))
                .collect()
        } else {
            let steps = (distance / space).floor() as u32;
            (1..=steps)
                .map(|step| {
                    let along = step as f32 * space;
                    let p = from + direction * along;
                    RawPoint::new(p.x, p.y, pressure_at(along / distance))
                })
                .collect()
        };

        let last = points
            .last()
            .copied()
            .unwrap_or(RawPoint::new(target.x, target.y, sample.pressure));
        self.advance(last);

        debug!("sample ({:.1}, {:.1}) -> {} points", sample.x, sample.y, points.len());
        points
    }

    fn advance(&mut self, point: RawPoint) {
        self.prev_prev = self.prev;
        self.prev = Some(point);
    }
}
