//! Compositor: rebuilds the display buffer from persisted + mixed stroke

use tracing::debug;

use crate::error::BrushError;
use crate::surface::DrawOptions;

use super::Brush;

impl Brush {
    /// Redraw the display buffer
    ///
    /// Never touches the persisted buffer; only commit writes there.
    pub(crate) fn composite(&mut self) -> Result<(), BrushError> {
        let buffers = self.buffers.as_mut().ok_or(BrushError::SurfaceUnbound)?;

        buffers.display.clear();
        buffers
            .display
            .draw_surface(&buffers.persisted, 0, 0, DrawOptions::default());

        let mixed = self.modules.mixin(&buffers.stroke);
        buffers.display.draw_surface(
            &mixed,
            0,
            0,
            DrawOptions::with_blend(self.blend_mode, Some(&self.filter)),
        );

        debug!("Composited display ({} blend, filter {})", self.blend_mode, self.filter);
        Ok(())
    }
}
