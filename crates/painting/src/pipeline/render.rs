//! Stroke renderer: draws one queued point per step

use std::f32::consts::TAU;

use glam::{Affine2, Vec2};
use tracing::debug;

use crate::color::parse_color;
use crate::constants::RENDER_BATCH_SIZE;
use crate::error::BrushError;
use crate::types::{BlendMode, ResolvedPoint};

use super::stroke::run_callback;
use super::{Brush, ShapeMask};

impl ShapeMask {
    /// Recolor the mask, keeping its alpha, when the color changed
    ///
    /// Only the RGB part is applied; the color's alpha belongs to the stamp.
    pub(crate) fn tint(&mut self, color: [f32; 4]) {
        let opaque = [color[0], color[1], color[2], 1.0];
        if self.tint == opaque {
            return;
        }
        let (width, height) = (self.surface.width, self.surface.height);
        self.surface.fill_rect(0, 0, width, height, opaque, BlendMode::SourceAtop);
        self.tint = opaque;
    }

    /// Stamp transform: centered on the point, rotated, scaled to
    /// `size * roundness` by `size / aspect_ratio`
    fn transform(&self, point: &ResolvedPoint, rotation: f32) -> Affine2 {
        let config = &point.config;
        let width = config.size * config.roundness;
        let height = config.size / self.surface.aspect_ratio();
        let scale = Vec2::new(
            width / self.surface.width as f32,
            height / self.surface.height as f32,
        );

        Affine2::from_translation(Vec2::new(point.x, point.y))
            * Affine2::from_angle(rotation)
            * Affine2::from_translation(Vec2::new(-width / 2.0, -height / 2.0))
            * Affine2::from_scale(scale)
    }
}

impl Brush {
    /// Draw the next queued point. Returns false when the queue is empty.
    pub(crate) fn draw_next(&mut self) -> Result<bool, BrushError> {
        self.ensure_bound()?;
        let Some(mut point) = self.queue.pop_front() else {
            return Ok(false);
        };

        self.stamp(&point)?;

        if self.queue.is_empty() || self.draw_count >= RENDER_BATCH_SIZE {
            self.composite()?;
            self.draw_count = 0;
        } else {
            self.draw_count += 1;
        }

        if point.stroke_end {
            self.commit()?;
        }
        if let Some(callback) = point.callback.take() {
            run_callback(callback);
        }
        Ok(true)
    }

    /// Draw one stamp (or ellipse) into the stroke buffer
    fn stamp(&mut self, point: &ResolvedPoint) -> Result<(), BrushError> {
        let buffers = self.buffers.as_mut().ok_or(BrushError::SurfaceUnbound)?;
        let config = &point.config;
        let alpha = config.opacity * config.flow;
        let color = parse_color(&config.color);
        let rotation = -config.angle * TAU;

        let affected = match self.shape.as_mut() {
            Some(shape) => {
                shape.tint(color);
                let transform = shape.transform(point, rotation);
                buffers.stroke.draw_surface_transformed(
                    &shape.surface,
                    transform,
                    alpha * color[3],
                    BlendMode::SourceOver,
                )
            }
            None => buffers.stroke.fill_ellipse(
                point.x,
                point.y,
                config.size,
                config.size * config.roundness,
                rotation,
                color,
                alpha,
                BlendMode::SourceOver,
            ),
        };

        if affected.is_none() {
            debug!("stamp at ({:.1}, {:.1}) outside surface", point.x, point.y);
        }
        Ok(())
    }
}
