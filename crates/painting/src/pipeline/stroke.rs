//! Stroke handling: sample intake, stroke end and commit

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::error::BrushError;
use crate::surface::DrawOptions;
use crate::types::{RawPoint, ResolvedPoint, StrokeCallback};

use super::Brush;

impl Brush {
    /// Feed a pointer sample
    ///
    /// The sample may produce no points at all (too little movement), one
    /// point, or several interpolated and fanned-out points, all queued for
    /// the renderer with their resolved configs.
    pub fn put_point(&mut self, x: f32, y: f32, pressure: f32) -> Result<(), BrushError> {
        self.ensure_bound()?;

        let sample = RawPoint::new(x, y, pressure);
        let generated = self.generator.generate(sample, &self.config, &self.settings);
        for raw in generated {
            for point in self.modules.transform_point(raw, &self.config) {
                let config = self.modules.resolve_config(&self.config, point.pressure);
                self.queue.push_back(ResolvedPoint::new(point, config));
            }
        }
        Ok(())
    }

    /// End the current stroke
    ///
    /// The last queued point is marked so that drawing it commits the stroke,
    /// and carries `callback`. With nothing queued the stroke is committed and
    /// the callback invoked right away.
    pub fn finalize_stroke(&mut self, callback: Option<StrokeCallback>) -> Result<(), BrushError> {
        self.ensure_bound()?;
        self.generator.reset();

        if self.queue.is_empty() {
            self.commit()?;
            if let Some(callback) = callback {
                run_callback(callback);
            }
            return Ok(());
        }

        if let Some(last) = self.queue.back_mut() {
            last.stroke_end = true;
            if let Some(callback) = callback {
                last.callback = Some(match last.callback.take() {
                    Some(previous) => Box::new(move || {
                        previous()?;
                        callback()
                    }) as StrokeCallback,
                    None => callback,
                });
            }
        }
        Ok(())
    }

    /// Merge the stroke buffer into the persisted buffer and record history
    pub(crate) fn commit(&mut self) -> Result<(), BrushError> {
        let buffers = self.buffers.as_mut().ok_or(BrushError::SurfaceUnbound)?;
        {
            let mixed = self.modules.mixin(&buffers.stroke);
            buffers.persisted.draw_surface(
                &mixed,
                0,
                0,
                DrawOptions::with_blend(self.blend_mode, Some(&self.filter)),
            );
        }
        buffers.stroke.clear();

        if self.settings.history_enabled() {
            self.history
                .push(buffers.persisted.snapshot(), self.settings.max_undo_redo_stack_size);
        } else {
            // Keep the cursor entry in sync so re-enabling history starts from here
            self.history.reset(buffers.persisted.snapshot());
        }
        self.modules.end_stroke();

        debug!(
            "Committed stroke (history {} entries, cursor {})",
            self.history.len(),
            self.history.cursor()
        );
        Ok(())
    }
}

/// Invoke a completion callback; failures and panics are logged, never propagated
pub(crate) fn run_callback(callback: StrokeCallback) {
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Stroke callback failed: {e:#}"),
        Err(payload) => error!("Stroke callback panicked: {}", panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
