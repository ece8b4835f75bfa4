//! Error types for brush operations.

use crate::mask::MaskError;
use crate::surface::FilterError;

/// Errors surfaced by [`crate::Brush`] operations.
#[derive(Debug, thiserror::Error)]
pub enum BrushError {
    #[error("No surface bound - call bind_surface() first")]
    SurfaceUnbound,

    #[error("Surface size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Shape mask error: {0}")]
    Mask(#[from] MaskError),
}
