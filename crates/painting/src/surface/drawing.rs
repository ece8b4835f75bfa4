//! Drawing primitives: surface blits, transformed stamps, rects and ellipses

use glam::{Affine2, Vec2};
use tracing::debug;

use super::{CpuSurface, Filter, composite};
use crate::types::BlendMode;

/// How a source surface is drawn onto a destination
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions<'a> {
    /// Global alpha multiplied into every source pixel
    pub alpha: f32,
    pub blend_mode: BlendMode,
    pub filter: Option<&'a Filter>,
}

impl Default for DrawOptions<'_> {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            blend_mode: BlendMode::SourceOver,
            filter: None,
        }
    }
}

impl<'a> DrawOptions<'a> {
    pub fn with_blend(blend_mode: BlendMode, filter: Option<&'a Filter>) -> Self {
        Self {
            alpha: 1.0,
            blend_mode,
            filter,
        }
    }
}

impl CpuSurface {
    /// Draw another surface at an integer offset
    pub fn draw_surface(&mut self, src: &CpuSurface, x: i32, y: i32, options: DrawOptions<'_>) {
        let alpha = options.alpha.clamp(0.0, 1.0);
        let mode = options.blend_mode;
        let filter = options.filter.filter(|f| !f.is_none());

        let shade = |px: [f32; 4]| {
            let mut px = match filter {
                Some(filter) => filter.apply(px),
                None => px,
            };
            px[3] *= alpha;
            px
        };

        let visit_all = !mode.keeps_destination_under_transparent_source();
        let (x_start, y_start, x_end, y_end) = if visit_all {
            (0, 0, self.width as i64, self.height as i64)
        } else {
            (
                (x as i64).max(0),
                (y as i64).max(0),
                (x as i64 + src.width as i64).min(self.width as i64),
                (y as i64 + src.height as i64).min(self.height as i64),
            )
        };

        for py in y_start..y_end {
            for px in x_start..x_end {
                let sx = px - x as i64;
                let sy = py - y as i64;
                let source = if sx >= 0 && sy >= 0 {
                    src.get_pixel(sx as u32, sy as u32)
                } else {
                    None
                };
                let source = source.map(shade).unwrap_or([0.0; 4]);
                if source[3] <= 0.0 && !visit_all {
                    continue;
                }
                self.composite_pixel(px as u32, py as u32, source, mode);
            }
        }
    }

    /// Sample with bilinear filtering at a continuous pixel position
    ///
    /// Interpolates premultiplied values so transparent neighbors do not
    /// darken edges. Positions are clamped to the surface.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> [f32; 4] {
        if self.is_empty() {
            return [0.0; 4];
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let fx = (x - 0.5).clamp(0.0, max_x);
        let fy = (y - 0.5).clamp(0.0, max_y);
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let mut acc = [0.0f32; 4];
        for (sx, sy, w) in [
            (x0, y0, (1.0 - tx) * (1.0 - ty)),
            (x1, y0, tx * (1.0 - ty)),
            (x0, y1, (1.0 - tx) * ty),
            (x1, y1, tx * ty),
        ] {
            let p = self.pixels[self.index(sx, sy)];
            acc[0] += p[0] * p[3] * w;
            acc[1] += p[1] * p[3] * w;
            acc[2] += p[2] * p[3] * w;
            acc[3] += p[3] * w;
        }

        if acc[3] <= f32::EPSILON {
            return [0.0; 4];
        }
        [acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3]]
    }

    /// Draw a surface through an affine transform (source pixels -> destination pixels)
    ///
    /// Every destination pixel inside the transformed bounds is mapped back
    /// into the source and sampled bilinearly.
    /// Returns bounding box of affected region (x, y, width, height), or None
    /// if nothing was drawn.
    pub fn draw_surface_transformed(
        &mut self,
        src: &CpuSurface,
        transform: Affine2,
        alpha: f32,
        mode: BlendMode,
    ) -> Option<(u32, u32, u32, u32)> {
        if src.is_empty() || alpha <= 0.0 || transform.matrix2.determinant().abs() < 1e-8 {
            return None;
        }

        let w = src.width as f32;
        let h = src.height as f32;
        let corners = [
            transform.transform_point2(Vec2::ZERO),
            transform.transform_point2(Vec2::new(w, 0.0)),
            transform.transform_point2(Vec2::new(0.0, h)),
            transform.transform_point2(Vec2::new(w, h)),
        ];
        let min = corners.iter().fold(Vec2::splat(f32::MAX), |acc, c| acc.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::MIN), |acc, c| acc.max(*c));

        let (x_min, y_min, x_max, y_max) = self.clamp_bounds(min, max)?;
        let inverse = transform.inverse();
        let alpha = alpha.min(1.0);

        for py in y_min..y_max {
            for px in x_min..x_max {
                let s = inverse.transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                if s.x < 0.0 || s.y < 0.0 || s.x >= w || s.y >= h {
                    continue;
                }
                let mut color = src.sample_bilinear(s.x, s.y);
                color[3] *= alpha;
                if color[3] <= 0.0 {
                    continue;
                }
                self.composite_pixel(px, py, color, mode);
            }
        }

        Some((x_min, y_min, x_max - x_min, y_max - y_min))
    }

    /// Fill a rectangle with a solid color (clamped to bounds)
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: [f32; 4], mode: BlendMode) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.composite_pixel(px, py, color, mode);
            }
        }
    }

    /// Fill a rotated ellipse
    ///
    /// # Arguments
    /// * `center_x`, `center_y` - Center in pixel coordinates
    /// * `radius_x`, `radius_y` - Semi-axes before rotation
    /// * `rotation` - Rotation in radians (clockwise on a y-down surface)
    /// * `color` - Fill color
    /// * `alpha` - Global alpha multiplied into the color
    /// * `mode` - How to combine with existing pixels
    ///
    /// # Returns
    /// Bounding box of affected region (x, y, width, height), or None if outside surface.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_ellipse(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        color: [f32; 4],
        alpha: f32,
        mode: BlendMode,
    ) -> Option<(u32, u32, u32, u32)> {
        if radius_x <= 0.0 || radius_y <= 0.0 || alpha <= 0.0 {
            debug!("fill_ellipse: skipped degenerate ellipse rx={radius_x:.2} ry={radius_y:.2}");
            return None;
        }

        // Bounding box of an ellipse with semi-axes a, b rotated by θ:
        //   half_w = sqrt(a² cos²θ + b² sin²θ)
        //   half_h = sqrt(a² sin²θ + b² cos²θ)
        let cos_a = rotation.cos();
        let sin_a = rotation.sin();
        let rx_sq = radius_x * radius_x;
        let ry_sq = radius_y * radius_y;
        let half_w = (rx_sq * cos_a * cos_a + ry_sq * sin_a * sin_a).sqrt() + 1.0;
        let half_h = (rx_sq * sin_a * sin_a + ry_sq * cos_a * cos_a).sqrt() + 1.0;

        let center = Vec2::new(center_x, center_y);
        let (x_min, y_min, x_max, y_max) =
            self.clamp_bounds(center - Vec2::new(half_w, half_h), center + Vec2::new(half_w, half_h))?;

        // Edge antialiasing width, measured along the shorter axis
        let edge = radius_x.min(radius_y);

        for py in y_min..y_max {
            for px in x_min..x_max {
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;

                // Rotate point by -rotation to align with ellipse axes
                let local_x = dx * cos_a + dy * sin_a;
                let local_y = -dx * sin_a + dy * cos_a;

                let nx = local_x / radius_x;
                let ny = local_y / radius_y;
                let dist = (nx * nx + ny * ny).sqrt();

                let coverage = ((1.0 - dist) * edge + 0.5).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let mut src = color;
                src[3] *= alpha * coverage;
                self.composite_pixel(px, py, src, mode);
            }
        }

        Some((x_min, y_min, x_max - x_min, y_max - y_min))
    }

    /// Clamp a float bounding box to whole pixels inside the surface
    fn clamp_bounds(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let x_min = (min.x.floor().max(0.0) as u32).min(self.width);
        let y_min = (min.y.floor().max(0.0) as u32).min(self.height);
        let x_max = (max.x.ceil().max(0.0) as u32).min(self.width);
        let y_max = (max.y.ceil().max(0.0) as u32).min(self.height);

        if x_min >= x_max || y_min >= y_max {
            return None;
        }
        Some((x_min, y_min, x_max, y_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FilterFn;
    use std::f32::consts::FRAC_PI_2;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_draw_surface_offset() {
        let mut dst = CpuSurface::new(10, 10);
        let mut src = CpuSurface::new(2, 2);
        src.fill(RED);

        dst.draw_surface(&src, 3, 4, DrawOptions::default());
        assert_eq!(dst.get_pixel(3, 4), Some(RED));
        assert_eq!(dst.get_pixel(4, 5), Some(RED));
        assert_eq!(dst.get_pixel(5, 5), Some([0.0; 4]));

        // Partially outside is clipped without panicking
        dst.draw_surface(&src, -1, 9, DrawOptions::default());
        assert_eq!(dst.get_pixel(0, 9), Some(RED));
    }

    #[test]
    fn test_draw_surface_alpha_and_filter() {
        let mut dst = CpuSurface::new(2, 2);
        let mut src = CpuSurface::new(2, 2);
        src.fill(WHITE);
        let filter = Filter::new(vec![FilterFn::Invert(1.0)]);

        dst.draw_surface(
            &src,
            0,
            0,
            DrawOptions {
                alpha: 0.5,
                blend_mode: BlendMode::SourceOver,
                filter: Some(&filter),
            },
        );
        let px = dst.get_pixel(0, 0).unwrap();
        assert!(px[0].abs() < 1e-5);
        assert!((px[3] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_destination_in_clears_outside_source() {
        let mut dst = CpuSurface::new(4, 4);
        dst.fill(WHITE);
        let mut mask = CpuSurface::new(2, 2);
        mask.fill(RED);

        dst.draw_surface(&mask, 0, 0, DrawOptions::with_blend(BlendMode::DestinationIn, None));
        assert_eq!(dst.get_pixel(1, 1), Some(WHITE));
        assert_eq!(dst.get_pixel(3, 3), Some([0.0; 4]));
    }

    #[test]
    fn test_draw_surface_transformed_scale() {
        let mut dst = CpuSurface::new(20, 20);
        let mut src = CpuSurface::new(2, 2);
        src.fill(RED);

        let transform = Affine2::from_translation(Vec2::new(5.0, 5.0)) * Affine2::from_scale(Vec2::splat(4.0));
        let bounds = dst.draw_surface_transformed(&src, transform, 1.0, BlendMode::SourceOver);

        assert_eq!(bounds, Some((5, 5, 8, 8)));
        for (x, y) in [(5, 5), (6, 6), (12, 12)] {
            let px = dst.get_pixel(x, y).unwrap();
            assert!((px[0] - 1.0).abs() < 1e-4 && (px[3] - 1.0).abs() < 1e-4);
        }
        assert_eq!(dst.get_pixel(13, 13), Some([0.0; 4]));
        assert_eq!(dst.get_pixel(4, 4), Some([0.0; 4]));
    }

    #[test]
    fn test_draw_surface_transformed_degenerate() {
        let mut dst = CpuSurface::new(10, 10);
        let mut src = CpuSurface::new(2, 2);
        src.fill(RED);
        let flat = Affine2::from_scale(Vec2::new(0.0, 1.0));
        assert_eq!(dst.draw_surface_transformed(&src, flat, 1.0, BlendMode::SourceOver), None);
        assert_eq!(dst.draw_surface_transformed(&src, Affine2::IDENTITY, 0.0, BlendMode::SourceOver), None);
    }

    #[test]
    fn test_fill_rect_source_atop_recolors() {
        let mut surface = CpuSurface::new(4, 4);
        surface.set_pixel(1, 1, [0.0, 0.0, 0.0, 0.5]);

        surface.fill_rect(0, 0, 4, 4, RED, BlendMode::SourceAtop);
        let px = surface.get_pixel(1, 1).unwrap();
        assert!((px[0] - 1.0).abs() < 1e-5);
        assert!((px[3] - 0.5).abs() < 1e-5);
        assert_eq!(surface.get_pixel(0, 0), Some([0.0; 4]));
    }

    #[test]
    fn test_fill_ellipse_circular() {
        let mut surface = CpuSurface::new(64, 64);
        surface.fill(WHITE);

        let result = surface.fill_ellipse(32.0, 32.0, 10.0, 10.0, 0.0, RED, 1.0, BlendMode::SourceOver);
        assert!(result.is_some());

        let center = surface.get_pixel(32, 32).unwrap();
        assert!((center[1]).abs() < 0.01);
        let outside = surface.get_pixel(32, 45).unwrap();
        assert!((outside[1] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_fill_ellipse_rotated() {
        let mut surface = CpuSurface::new(64, 64);

        // 20 wide, 5 tall; rotated a quarter turn it becomes 5 wide, 20 tall
        surface.fill_ellipse(32.0, 32.0, 20.0, 5.0, FRAC_PI_2, RED, 1.0, BlendMode::SourceOver);

        let along_y = surface.get_pixel(32, 47).unwrap();
        assert!(along_y[3] > 0.9);
        let along_x = surface.get_pixel(47, 32).unwrap();
        assert!(along_x[3] < 0.01);
    }

    #[test]
    fn test_fill_ellipse_degenerate() {
        let mut surface = CpuSurface::new(16, 16);
        assert!(surface.fill_ellipse(8.0, 8.0, 4.0, 0.0, 0.0, RED, 1.0, BlendMode::SourceOver).is_none());
        assert!(surface.fill_ellipse(100.0, 100.0, 4.0, 4.0, 0.0, RED, 1.0, BlendMode::SourceOver).is_none());
    }
}
