//! Cooperative render scheduler
//!
//! Queued points are drawn in batches of [`RENDER_BATCH_SIZE`]. Between
//! batches the loop yields to the host through a [`FramePacer`]; the host
//! calls [`Brush::render_frame`] on its next frame. Without a pacer (or when
//! the pacer declines) the queue is drained synchronously.

use tracing::debug;

use crate::constants::RENDER_BATCH_SIZE;
use crate::error::BrushError;

use super::Brush;

/// Host frame scheduling primitive
pub trait FramePacer {
    /// Ask the host to call [`Brush::render_frame`] on its next frame.
    /// Returns false if no frame can be scheduled.
    fn request_frame(&mut self) -> bool;
}

impl Brush {
    pub fn set_frame_pacer(&mut self, pacer: Box<dyn FramePacer>) {
        self.pacer = Some(pacer);
    }

    pub fn clear_frame_pacer(&mut self) {
        self.pacer = None;
    }

    /// Start drawing queued points. A no-op while a render loop is running.
    pub fn render(&mut self) -> Result<(), BrushError> {
        self.ensure_bound()?;
        if self.running {
            debug!("render: already running");
            return Ok(());
        }
        self.running = true;
        self.tick()
    }

    /// Host frame callback; resumes a render loop that yielded
    pub fn render_frame(&mut self) -> Result<(), BrushError> {
        if !self.running {
            return Ok(());
        }
        self.tick()
    }

    fn tick(&mut self) -> Result<(), BrushError> {
        loop {
            let drawn = match self.draw_batch() {
                Ok(drawn) => drawn,
                Err(e) => {
                    self.running = false;
                    return Err(e);
                }
            };
            debug!("render: drew {} points, {} pending", drawn, self.queue.len());

            if self.queue.is_empty() {
                self.running = false;
                return Ok(());
            }
            if self.request_frame() {
                return Ok(());
            }
        }
    }

    fn draw_batch(&mut self) -> Result<usize, BrushError> {
        let mut drawn = 0;
        while drawn < RENDER_BATCH_SIZE && self.draw_next()? {
            drawn += 1;
        }
        Ok(drawn)
    }

    fn request_frame(&mut self) -> bool {
        self.pacer.as_mut().is_some_and(|pacer| pacer.request_frame())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::surface::CpuSurface;

    struct CountingPacer {
        requests: Rc<RefCell<u32>>,
        accept: bool,
    }

    impl FramePacer for CountingPacer {
        fn request_frame(&mut self) -> bool {
            *self.requests.borrow_mut() += 1;
            self.accept
        }
    }

    fn brush_with_points(count: usize) -> Brush {
        let mut brush = Brush::with_surface(CpuSurface::new(8, 8));
        brush.settings_mut().spacing = false;
        brush.config_mut().size = 1.0;
        for i in 0..count {
            brush.put_point((i % 8) as f32, 4.0, 0.5).unwrap();
        }
        brush
    }

    #[test]
    fn test_sync_drain_without_pacer() {
        let mut brush = brush_with_points(RENDER_BATCH_SIZE + 10);
        brush.render().unwrap();
        assert_eq!(brush.pending_points(), 0);
        assert!(!brush.is_rendering());
    }

    #[test]
    fn test_pacer_yields_between_batches() {
        let requests = Rc::new(RefCell::new(0));
        let mut brush = brush_with_points(RENDER_BATCH_SIZE + 10);
        brush.set_frame_pacer(Box::new(CountingPacer {
            requests: requests.clone(),
            accept: true,
        }));

        brush.render().unwrap();
        assert_eq!(brush.pending_points(), 10);
        assert!(brush.is_rendering());
        assert_eq!(*requests.borrow(), 1);

        // Guarded while running
        brush.render().unwrap();
        assert_eq!(brush.pending_points(), 10);

        brush.render_frame().unwrap();
        assert_eq!(brush.pending_points(), 0);
        assert!(!brush.is_rendering());
        assert_eq!(*requests.borrow(), 1);

        // Stray frames after the loop ended do nothing
        brush.render_frame().unwrap();
    }

    #[test]
    fn test_declining_pacer_drains_synchronously() {
        let requests = Rc::new(RefCell::new(0));
        let mut brush = brush_with_points(RENDER_BATCH_SIZE * 2 + 1);
        brush.set_frame_pacer(Box::new(CountingPacer {
            requests: requests.clone(),
            accept: false,
        }));

        brush.render().unwrap();
        assert_eq!(brush.pending_points(), 0);
        assert_eq!(*requests.borrow(), 2);
    }

    #[test]
    fn test_clear_mid_render_ends_loop() {
        let requests = Rc::new(RefCell::new(0));
        let mut brush = brush_with_points(RENDER_BATCH_SIZE + 10);
        brush.set_frame_pacer(Box::new(CountingPacer {
            requests,
            accept: true,
        }));

        brush.render().unwrap();
        brush.clear().unwrap();
        brush.render_frame().unwrap();
        assert!(!brush.is_rendering());
    }
}
