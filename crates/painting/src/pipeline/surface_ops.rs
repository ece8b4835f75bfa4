//! Surface operations for the brush: binding, clearing, shape masks, filters

use std::sync::Arc;

use image::RgbaImage;
use tracing::{info, warn};

use crate::color::FALLBACK_COLOR;
use crate::error::BrushError;
use crate::mask::{self, MaskError, ResourceFetcher, ShapeSource};
use crate::surface::{CpuSurface, Filter};
use crate::types::BlendMode;

use super::{Brush, ShapeMask, StrokeBuffers};

impl Brush {
    /// Bind the surface to paint on
    ///
    /// The surface becomes the persisted buffer. Pending points are dropped
    /// and history restarts from the surface's current content.
    pub fn bind_surface(&mut self, surface: CpuSurface) {
        info!("Binding surface {}x{}", surface.width, surface.height);
        let buffers = StrokeBuffers::new(surface);
        self.history.reset(buffers.persisted.snapshot());
        self.buffers = Some(buffers);
        self.queue.clear();
        self.generator.reset();
        self.draw_count = 0;
    }

    /// Clear all buffers, pending points and history
    pub fn clear(&mut self) -> Result<(), BrushError> {
        let buffers = self.buffers.as_mut().ok_or(BrushError::SurfaceUnbound)?;
        buffers.persisted.clear();
        buffers.stroke.clear();
        buffers.display.clear();
        self.history.reset(buffers.persisted.snapshot());

        self.queue.clear();
        self.generator.reset();
        self.draw_count = 0;
        info!("Cleared brush surfaces");
        Ok(())
    }

    /// Load the stamp shape
    ///
    /// A zero-size source is not an error: the brush falls back to ellipse
    /// stamps. On any other failure the previous shape stays active.
    pub fn load_shape(&mut self, source: ShapeSource, fetcher: &dyn ResourceFetcher) -> Result<(), BrushError> {
        let result = mask::load_shape(source, fetcher);
        self.install_shape(result)
    }

    /// Awaitable variant of [`Brush::load_shape`]
    pub async fn load_shape_async(
        &mut self,
        source: ShapeSource,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Result<(), BrushError> {
        let result = mask::load_shape_async(source, fetcher).await;
        self.install_shape(result)
    }

    fn install_shape(&mut self, result: Result<CpuSurface, MaskError>) -> Result<(), BrushError> {
        match result {
            Ok(mut surface) => {
                let (width, height) = (surface.width, surface.height);
                surface.fill_rect(0, 0, width, height, FALLBACK_COLOR, BlendMode::SourceAtop);
                info!("Loaded shape mask {}x{}", width, height);
                self.shape = Some(ShapeMask {
                    surface,
                    tint: FALLBACK_COLOR,
                });
                Ok(())
            }
            Err(e) if e.is_zero_size() => {
                warn!("{e}; using ellipse stamps");
                self.shape = None;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Go back to ellipse stamps
    pub fn remove_shape(&mut self) {
        if self.shape.take().is_some() {
            info!("Removed shape mask");
        }
    }

    pub fn has_shape(&self) -> bool {
        self.shape.is_some()
    }

    /// Current shape mask, as tinted for the last stamp
    pub fn shape(&self) -> Option<&CpuSurface> {
        self.shape.as_ref().map(|s| &s.surface)
    }

    /// Set the filter applied when the stroke is blended
    ///
    /// Accepts `"none"` or a list of filter functions. On error the previous
    /// filter stays active.
    pub fn set_filter(&mut self, filter: &str) -> Result<(), BrushError> {
        match filter.parse::<Filter>() {
            Ok(parsed) => {
                self.filter = parsed;
                Ok(())
            }
            Err(e) => {
                warn!("Rejected filter {filter:?}: {e}");
                Err(e.into())
            }
        }
    }

    /// What the user sees
    pub fn display(&self) -> Option<&CpuSurface> {
        self.buffers.as_ref().map(|b| &b.display)
    }

    /// Committed drawing
    pub fn persisted(&self) -> Option<&CpuSurface> {
        self.buffers.as_ref().map(|b| &b.persisted)
    }

    /// Raw display data as bytes (for texture upload)
    pub fn display_bytes(&self) -> Option<&[u8]> {
        self.display().map(CpuSurface::as_bytes)
    }

    /// Display converted to 8-bit RGBA
    pub fn display_image(&self) -> Option<RgbaImage> {
        self.display().map(CpuSurface::to_rgba_image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::NoFetcher;

    #[test]
    fn test_loaded_shape_is_tinted_black() {
        let mut brush = Brush::new();
        let mut mask = CpuSurface::new(2, 2);
        mask.set_pixel(0, 0, [1.0, 1.0, 1.0, 0.5]);
        brush.load_shape(ShapeSource::Surface(mask), &NoFetcher).unwrap();

        let shape = brush.shape().unwrap();
        let px = shape.get_pixel(0, 0).unwrap();
        assert!(px[0].abs() < 1e-5);
        assert!((px[3] - 0.5).abs() < 1e-5);

        brush.remove_shape();
        assert!(!brush.has_shape());
    }

    #[test]
    fn test_zero_size_shape_clears_previous() {
        let mut brush = Brush::new();
        brush
            .load_shape(ShapeSource::Surface(CpuSurface::new(2, 2)), &NoFetcher)
            .unwrap();
        brush
            .load_shape(ShapeSource::Image(RgbaImage::new(0, 3)), &NoFetcher)
            .unwrap();
        assert!(!brush.has_shape());
    }

    #[tokio::test]
    async fn test_load_shape_async() {
        let mut brush = Brush::new();
        let fetcher: Arc<dyn ResourceFetcher> = Arc::new(NoFetcher);

        brush
            .load_shape_async(ShapeSource::Surface(CpuSurface::new(3, 3)), fetcher.clone())
            .await
            .unwrap();
        assert!(brush.has_shape());

        let err = brush
            .load_shape_async(ShapeSource::Reference("brushes/missing".into()), fetcher)
            .await
            .unwrap_err();
        assert!(matches!(err, BrushError::Mask(MaskError::Fetch(_))));
        assert!(brush.has_shape());
    }

    #[test]
    fn test_display_image() {
        let mut surface = CpuSurface::new(2, 1);
        surface.set_pixel(1, 0, [1.0, 0.0, 0.0, 1.0]);
        let brush = Brush::with_surface(surface);
        let image = brush.display_image().unwrap();
        assert_eq!(image.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert!(Brush::new().display_image().is_none());
    }
}
