//! Shape-mask loading
//!
//! Turns an image source into a [`CpuSurface`] the brush can stamp with.
//! Decoding goes through the `image` crate; references (URLs, asset keys)
//! are resolved by a caller-supplied [`ResourceFetcher`], so the core never
//! touches the network or the file system itself.

use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::surface::CpuSurface;

#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    #[error("Shape source has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },

    #[error("Failed to decode shape image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to fetch shape resource: {0}")]
    Fetch(String),

    #[error("Shape loading task failed: {0}")]
    Join(String),
}

impl MaskError {
    /// Zero-size inputs are warnings, not failures
    pub fn is_zero_size(&self) -> bool {
        matches!(self, MaskError::ZeroSize { .. })
    }
}

/// Where a brush shape comes from
#[derive(Debug, Clone)]
pub enum ShapeSource {
    /// An already decoded raster
    Image(RgbaImage),
    /// An in-memory surface, used as-is
    Surface(CpuSurface),
    /// Encoded bytes (PNG, ...) to decode
    Encoded(Vec<u8>),
    /// A handle resolved through a [`ResourceFetcher`]
    Reference(String),
}

/// Resolves [`ShapeSource::Reference`] handles into encoded bytes
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, MaskError>;
}

/// Fetcher for callers that never use references
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

impl ResourceFetcher for NoFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, MaskError> {
        Err(MaskError::Fetch(format!("no fetcher configured for {reference}")))
    }
}

fn non_empty(surface: CpuSurface) -> Result<CpuSurface, MaskError> {
    if surface.is_empty() {
        return Err(MaskError::ZeroSize {
            width: surface.width,
            height: surface.height,
        });
    }
    Ok(surface)
}

fn decode(bytes: &[u8]) -> Result<CpuSurface, MaskError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    debug!("decoded shape image {}x{}", image.width(), image.height());
    non_empty(CpuSurface::from_rgba_image(&image))
}

/// Load a shape synchronously
pub fn load_shape(source: ShapeSource, fetcher: &dyn ResourceFetcher) -> Result<CpuSurface, MaskError> {
    match source {
        ShapeSource::Image(image) => non_empty(CpuSurface::from_rgba_image(&image)),
        ShapeSource::Surface(surface) => non_empty(surface),
        ShapeSource::Encoded(bytes) => decode(&bytes),
        ShapeSource::Reference(reference) => {
            let bytes = fetcher.fetch(&reference)?;
            decode(&bytes)
        }
    }
}

/// Awaitable variant of [`load_shape`]; fetching and decoding run on the
/// blocking pool
pub async fn load_shape_async(
    source: ShapeSource,
    fetcher: Arc<dyn ResourceFetcher>,
) -> Result<CpuSurface, MaskError> {
    tokio::task::spawn_blocking(move || load_shape(source, fetcher.as_ref()))
        .await
        .map_err(|e| MaskError::Join(e.to_string()))?
}
