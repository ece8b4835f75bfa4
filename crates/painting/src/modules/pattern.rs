//! Texture fill: tiles a pattern image over the stroke

use serde::{Deserialize, Serialize};

use super::BrushModule;
use crate::surface::{CpuSurface, DrawOptions};
use crate::types::BlendMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatternConfig {
    /// Tile scale; 2.0 draws every pattern pixel as 2x2
    pub scale: f32,
    /// Added to every channel, in [-1, 1]
    pub brightness: f32,
    /// Spread around mid-gray, in [-1, 1]
    pub contrast: f32,
    pub blend_mode: BlendMode,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            brightness: 0.0,
            contrast: 0.0,
            blend_mode: BlendMode::SourceOver,
        }
    }
}

/// Textures the stroke with a repeating pattern surface
#[derive(Debug, Clone)]
pub struct Pattern {
    pub config: PatternConfig,
    resource: CpuSurface,
}

impl Pattern {
    pub fn new(resource: CpuSurface, config: PatternConfig) -> Self {
        Self { config, resource }
    }

    pub fn resource(&self) -> &CpuSurface {
        &self.resource
    }

    pub fn set_resource(&mut self, resource: CpuSurface) {
        self.resource = resource;
    }

    fn adjust(&self, mut px: [f32; 4]) -> [f32; 4] {
        let contrast = 1.0 + self.config.contrast;
        for c in &mut px[..3] {
            *c = ((*c - 0.5) * contrast + 0.5 + self.config.brightness).clamp(0.0, 1.0);
        }
        px
    }

    /// Pattern repeated over a `width` x `height` area
    fn tile(&self, width: u32, height: u32) -> CpuSurface {
        let scale = self.config.scale.max(1e-3);
        let (pw, ph) = (self.resource.width as f32, self.resource.height as f32);
        let mut layer = CpuSurface::new(width, height);

        for y in 0..height {
            let sy = ((y as f32 + 0.5) / scale).floor().rem_euclid(ph) as u32;
            for x in 0..width {
                let sx = ((x as f32 + 0.5) / scale).floor().rem_euclid(pw) as u32;
                if let Some(px) = self.resource.get_pixel(sx, sy) {
                    layer.set_pixel(x, y, self.adjust(px));
                }
            }
        }
        layer
    }
}

impl BrushModule for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    fn on_mixin_canvas(&mut self, surface: &CpuSurface) -> Option<CpuSurface> {
        if self.resource.is_empty() || surface.is_empty() {
            return None;
        }

        let mut layer = self.tile(surface.width, surface.height);
        layer.draw_surface(surface, 0, 0, DrawOptions::with_blend(BlendMode::DestinationIn, None));

        let mut out = surface.clone();
        out.draw_surface(&layer, 0, 0, DrawOptions::with_blend(self.config.blend_mode, None));
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke_square() -> CpuSurface {
        let mut stroke = CpuSurface::new(4, 4);
        stroke.fill_rect(0, 0, 2, 2, [1.0, 0.0, 0.0, 1.0], BlendMode::SourceOver);
        stroke
    }

    fn solid(color: [f32; 4]) -> CpuSurface {
        let mut surface = CpuSurface::new(2, 2);
        surface.fill(color);
        surface
    }

    #[test]
    fn test_pattern_only_inside_stroke() {
        let mut module = Pattern::new(solid([0.0, 0.0, 1.0, 1.0]), PatternConfig::default());
        let out = module.on_mixin_canvas(&stroke_square()).unwrap();

        let inside = out.get_pixel(1, 1).unwrap();
        assert!((inside[2] - 1.0).abs() < 1e-4);
        assert!(inside[0].abs() < 1e-4);
        assert!((inside[3] - 1.0).abs() < 1e-4);

        assert_eq!(out.get_pixel(3, 3).unwrap()[3], 0.0);
    }

    #[test]
    fn test_brightness_and_contrast() {
        let module = Pattern::new(
            solid([0.5, 0.5, 0.5, 1.0]),
            PatternConfig {
                brightness: 0.25,
                ..Default::default()
            },
        );
        let px = module.tile(3, 3).get_pixel(2, 2).unwrap();
        assert!((px[0] - 0.75).abs() < 1e-5);

        let module = Pattern::new(
            solid([0.75, 0.75, 0.75, 1.0]),
            PatternConfig {
                contrast: 1.0,
                ..Default::default()
            },
        );
        let px = module.tile(1, 1).get_pixel(0, 0).unwrap();
        assert!((px[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tiling_repeats() {
        let mut resource = CpuSurface::new(2, 1);
        resource.set_pixel(0, 0, [1.0, 1.0, 1.0, 1.0]);
        resource.set_pixel(1, 0, [0.0, 0.0, 0.0, 1.0]);
        let module = Pattern::new(
            resource,
            PatternConfig {
                scale: 2.0,
                ..Default::default()
            },
        );
        let layer = module.tile(8, 1);
        let reds: Vec<f32> = (0..8).map(|x| layer.get_pixel(x, 0).unwrap()[0]).collect();
        assert_eq!(reds, vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_resource_passes_through() {
        let mut module = Pattern::new(CpuSurface::new(0, 0), PatternConfig::default());
        assert!(module.on_mixin_canvas(&stroke_square()).is_none());
    }
}
