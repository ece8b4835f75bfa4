//! Undo/redo history for the brush

use tracing::debug;

use crate::error::BrushError;
use crate::surface::SurfaceSnapshot;

use super::Brush;

/// Full snapshots of the persisted buffer plus a cursor
///
/// The entry under the cursor always matches the persisted buffer.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: Vec<SurfaceSnapshot>,
    cursor: usize,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all history and start from a single snapshot
    pub fn reset(&mut self, initial: SurfaceSnapshot) {
        self.entries = vec![initial];
        self.cursor = 0;
    }

    /// Record a new state. Entries after the cursor are discarded first;
    /// the oldest entry is dropped once the stack exceeds `max_size`.
    pub fn push(&mut self, snapshot: SurfaceSnapshot, max_size: usize) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > max_size {
            self.entries.remove(0);
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back; returns the snapshot to restore
    pub fn undo(&mut self) -> Option<&SurfaceSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward; returns the snapshot to restore
    pub fn redo(&mut self) -> Option<&SurfaceSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Brush {
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the last committed stroke
    ///
    /// Returns true if an undo was performed, false at the oldest entry
    pub fn undo(&mut self) -> Result<bool, BrushError> {
        let buffers = self.buffers.as_mut().ok_or(BrushError::SurfaceUnbound)?;
        let Some(snapshot) = self.history.undo() else {
            debug!("Undo: no entries available");
            return Ok(false);
        };
        buffers.persisted.restore(snapshot)?;
        buffers.display.restore(snapshot)?;
        debug!("Undo: cursor at {}", self.history.cursor());
        Ok(true)
    }

    /// Redo the last undone stroke
    ///
    /// Returns true if a redo was performed, false at the newest entry
    pub fn redo(&mut self) -> Result<bool, BrushError> {
        let buffers = self.buffers.as_mut().ok_or(BrushError::SurfaceUnbound)?;
        let Some(snapshot) = self.history.redo() else {
            debug!("Redo: no entries available");
            return Ok(false);
        };
        buffers.persisted.restore(snapshot)?;
        buffers.display.restore(snapshot)?;
        debug!("Redo: cursor at {}", self.history.cursor());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CpuSurface;

    fn snapshot(value: f32) -> SurfaceSnapshot {
        let mut surface = CpuSurface::new(1, 1);
        surface.set_pixel(0, 0, [value; 4]);
        surface.snapshot()
    }

    fn value(snapshot: Option<&SurfaceSnapshot>) -> Option<f32> {
        snapshot.map(|s| s.pixels()[0][0])
    }

    #[test]
    fn test_cursor_moves() {
        let mut stack = UndoStack::new();
        stack.reset(snapshot(0.0));
        stack.push(snapshot(0.5), 10);
        stack.push(snapshot(1.0), 10);

        assert_eq!(value(stack.undo()), Some(0.5));
        assert_eq!(value(stack.undo()), Some(0.0));
        assert_eq!(value(stack.undo()), None);
        assert_eq!(value(stack.redo()), Some(0.5));
        assert_eq!(value(stack.redo()), Some(1.0));
        assert_eq!(value(stack.redo()), None);
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        let mut stack = UndoStack::new();
        stack.reset(snapshot(0.0));
        stack.push(snapshot(0.25), 10);
        stack.push(snapshot(0.5), 10);
        stack.undo();

        stack.push(snapshot(0.75), 10);
        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 3);
        assert_eq!(value(stack.undo()), Some(0.25));
    }

    #[test]
    fn test_push_drops_oldest() {
        let mut stack = UndoStack::new();
        stack.reset(snapshot(0.0));
        for i in 1..=5 {
            stack.push(snapshot(i as f32 / 10.0), 3);
        }
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.cursor(), 2);
        assert_eq!(value(stack.undo()), Some(0.4));
        assert_eq!(value(stack.undo()), Some(0.3));
        assert!(!stack.can_undo());
    }
}
