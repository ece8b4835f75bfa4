//! CPU raster surface for painting - straight-alpha RGBA storage
//!
//! This is the raster provider the brush draws through. Every buffer the
//! brush owns (persisted, stroke, display, shape mask) is a [`CpuSurface`].

mod compositing;
mod drawing;
mod filter;

pub use compositing::composite;
pub use drawing::DrawOptions;
pub use filter::{Filter, FilterError, FilterFn};

use image::RgbaImage;

use crate::error::BrushError;

/// A CPU RGBA surface
/// Stores pixels as non-premultiplied [f32; 4] in 0.0..=1.0
#[derive(Clone, PartialEq)]
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order, each pixel is [r, g, b, a] as f32
    pixels: Vec<[f32; 4]>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Full copy of a surface's pixels, used for undo history
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSnapshot {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 4]>,
}

impl SurfaceSnapshot {
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }
}

impl CpuSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 0.0]; pixel_count],
        }
    }

    /// True when either dimension is zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height (1.0 for empty surfaces)
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    /// Reset a rectangular region to transparent (clamped to bounds)
    pub fn clear_region(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for row in y..y_end {
            for col in x..x_end {
                let index = self.index(col, row);
                self.pixels[index] = [0.0; 4];
            }
        }
    }

    /// Fill the whole surface with a solid color, replacing its content
    pub fn fill(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Composite a color onto an existing pixel with the given operator
    #[inline]
    pub fn composite_pixel(
        &mut self,
        x: u32,
        y: u32,
        color: [f32; 4],
        mode: crate::types::BlendMode,
    ) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = composite(color, self.pixels[index], mode);
    }

    /// Copy all pixels out for later restoration
    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }

    /// Replace all pixels with a snapshot of the same size
    pub fn restore(&mut self, snapshot: &SurfaceSnapshot) -> Result<(), BrushError> {
        if snapshot.width != self.width || snapshot.height != self.height {
            return Err(BrushError::SizeMismatch {
                expected: (self.width, self.height),
                actual: (snapshot.width, snapshot.height),
            });
        }
        self.pixels.copy_from_slice(&snapshot.pixels);
        Ok(())
    }

    /// Convert a decoded 8-bit image into a surface
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| {
                [
                    p.0[0] as f32 / 255.0,
                    p.0[1] as f32 / 255.0,
                    p.0[2] as f32 / 255.0,
                    p.0[3] as f32 / 255.0,
                ]
            })
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Quantize the surface into an 8-bit image
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for (dst, src) in image.pixels_mut().zip(self.pixels.iter()) {
            dst.0 = src.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
        image
    }

    /// Get raw pixel data for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Get direct access to pixel data
    #[inline]
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Get mutable access to pixel data
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlendMode;

    #[test]
    fn test_new_surface() {
        let surface = CpuSurface::new(100, 100);
        assert_eq!(surface.width, 100);
        assert_eq!(surface.height, 100);
        assert_eq!(surface.pixel_count(), 10000);
        assert!(!surface.is_empty());
        assert!(CpuSurface::new(0, 10).is_empty());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut surface = CpuSurface::new(10, 10);
        let color = [1.0, 0.5, 0.25, 1.0];

        surface.set_pixel(5, 5, color);
        assert_eq!(surface.get_pixel(5, 5), Some(color));

        // Out of bounds should return None
        assert_eq!(surface.get_pixel(100, 100), None);
    }

    #[test]
    fn test_fill_and_clear_region() {
        let mut surface = CpuSurface::new(10, 10);
        let white = [1.0, 1.0, 1.0, 1.0];
        surface.fill(white);

        surface.clear_region(8, 8, 50, 50);
        assert_eq!(surface.get_pixel(9, 9), Some([0.0; 4]));
        assert_eq!(surface.get_pixel(7, 7), Some(white));

        surface.clear();
        assert!(surface.pixels().iter().all(|p| p[3] == 0.0));
    }

    #[test]
    fn test_composite_pixel() {
        let mut surface = CpuSurface::new(10, 10);
        surface.fill([1.0, 1.0, 1.0, 1.0]);

        surface.composite_pixel(5, 5, [1.0, 0.0, 0.0, 0.5], BlendMode::SourceOver);

        let result = surface.get_pixel(5, 5).unwrap();
        assert!((result[0] - 1.0).abs() < 0.01);
        assert!((result[1] - 0.5).abs() < 0.01);
        assert!((result[2] - 0.5).abs() < 0.01);
        assert!((result[3] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut surface = CpuSurface::new(4, 4);
        surface.set_pixel(1, 1, [0.2, 0.4, 0.6, 1.0]);
        let snapshot = surface.snapshot();

        surface.clear();
        surface.restore(&snapshot).unwrap();
        assert_eq!(surface.get_pixel(1, 1), Some([0.2, 0.4, 0.6, 1.0]));

        let mut other = CpuSurface::new(2, 2);
        assert!(matches!(
            other.restore(&snapshot),
            Err(BrushError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_rgba_image_conversion() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(1, 0, image::Rgba([255, 0, 0, 255]));

        let surface = CpuSurface::from_rgba_image(&image);
        assert_eq!(surface.get_pixel(1, 0), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(surface.get_pixel(0, 0), Some([0.0; 4]));
        assert_eq!(surface.to_rgba_image(), image);
    }

    #[test]
    fn test_as_bytes() {
        let surface = CpuSurface::new(2, 2);
        let bytes = surface.as_bytes();
        // 4 pixels * 4 components * 4 bytes per f32 = 64 bytes
        assert_eq!(bytes.len(), 64);
    }
}
