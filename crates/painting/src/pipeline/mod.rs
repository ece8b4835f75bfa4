//! The brush: stroke pipeline from pointer samples to pixels
//!
//! This module connects:
//! - Point generation (spacing, lag correction, smoothing)
//! - Brush modules (config jitter, point fan-out, surface mixins)
//! - The stroke renderer (stamps or ellipses into the stroke buffer)
//! - The compositor (persisted + mixed stroke into the display buffer)
//! - Stroke commit and undo/redo history
//! - The cooperative render scheduler
//!
//! Everything is single-threaded. The host drives rendering either
//! synchronously or through a [`FramePacer`].

mod compositor;
mod render;
mod scheduler;
mod stroke;
mod surface_ops;
mod undo;

use std::collections::VecDeque;
use std::fmt;

use stampbrush_config::{BrushConfig, BrushConfigPatch, StrokeSettings};

use crate::error::BrushError;
use crate::modules::{BrushModule, ModuleId, ModulePipeline};
use crate::points::PointGenerator;
use crate::surface::{CpuSurface, Filter};
use crate::types::{BlendMode, ResolvedPoint};

pub use scheduler::FramePacer;
pub use undo::UndoStack;

/// The three buffers a bound brush paints through
pub(crate) struct StrokeBuffers {
    /// Committed drawing, survives across strokes
    pub(crate) persisted: CpuSurface,
    /// Current stroke only, cleared on commit
    pub(crate) stroke: CpuSurface,
    /// What the user sees
    pub(crate) display: CpuSurface,
}

impl StrokeBuffers {
    fn new(surface: CpuSurface) -> Self {
        let (width, height) = (surface.width, surface.height);
        Self {
            display: surface.clone(),
            persisted: surface,
            stroke: CpuSurface::new(width, height),
        }
    }
}

/// Stamp image plus the color it is currently tinted with
#[derive(Clone)]
pub(crate) struct ShapeMask {
    pub(crate) surface: CpuSurface,
    pub(crate) tint: [f32; 4],
}

/// A stamp-based brush
///
/// Typical use:
/// 1. `bind_surface` (or [`Brush::with_surface`])
/// 2. `put_point` for every pointer sample, `render` to draw queued points
/// 3. `finalize_stroke` on pointer up
pub struct Brush {
    /// None until a surface is bound
    pub(crate) buffers: Option<StrokeBuffers>,
    pub(crate) shape: Option<ShapeMask>,
    pub(crate) queue: VecDeque<ResolvedPoint>,
    pub(crate) modules: ModulePipeline,
    pub(crate) generator: PointGenerator,
    pub(crate) config: BrushConfig,
    pub(crate) settings: StrokeSettings,
    pub(crate) blend_mode: BlendMode,
    pub(crate) filter: Filter,
    /// Stamps drawn since the last composite
    pub(crate) draw_count: usize,
    pub(crate) history: UndoStack,
    /// Render loop guard
    pub(crate) running: bool,
    pub(crate) pacer: Option<Box<dyn FramePacer>>,
}

impl Default for Brush {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Brush {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Brush")
            .field("bound", &self.buffers.is_some())
            .field("shape", &self.shape.as_ref().map(|s| (s.surface.width, s.surface.height)))
            .field("pending_points", &self.queue.len())
            .field("modules", &self.modules)
            .field("config", &self.config)
            .field("settings", &self.settings)
            .field("blend_mode", &self.blend_mode)
            .field("filter", &self.filter)
            .field("running", &self.running)
            .finish()
    }
}

impl Brush {
    /// Create an unbound brush. Drawing operations fail until a surface is bound.
    pub fn new() -> Self {
        Self {
            buffers: None,
            shape: None,
            queue: VecDeque::new(),
            modules: ModulePipeline::new(),
            generator: PointGenerator::new(),
            config: BrushConfig::default(),
            settings: StrokeSettings::default(),
            blend_mode: BlendMode::SourceOver,
            filter: Filter::none(),
            draw_count: 0,
            history: UndoStack::new(),
            running: false,
            pacer: None,
        }
    }

    /// Create a brush bound to a surface
    pub fn with_surface(surface: CpuSurface) -> Self {
        let mut brush = Self::new();
        brush.bind_surface(surface);
        brush
    }

    pub fn config(&self) -> &BrushConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BrushConfig {
        &mut self.config
    }

    /// Overwrite only the fields present in the patch
    pub fn load_config(&mut self, patch: &BrushConfigPatch) {
        self.config.apply(patch);
    }

    pub fn settings(&self) -> &StrokeSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut StrokeSettings {
        &mut self.settings
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Register a module. Returns the existing id when a module with the
    /// same dedup key is already registered.
    pub fn use_module(&mut self, module: Box<dyn BrushModule>) -> ModuleId {
        self.modules.register(module)
    }

    pub fn remove_module(&mut self, id: ModuleId) -> bool {
        self.modules.remove(id)
    }

    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut (dyn BrushModule + 'static)> {
        self.modules.get_mut(id)
    }

    pub fn modules(&self) -> &ModulePipeline {
        &self.modules
    }

    /// Points queued but not yet drawn
    pub fn pending_points(&self) -> usize {
        self.queue.len()
    }

    pub fn is_rendering(&self) -> bool {
        self.running
    }

    pub fn is_bound(&self) -> bool {
        self.buffers.is_some()
    }

    pub(crate) fn ensure_bound(&self) -> Result<(), BrushError> {
        if self.buffers.is_none() {
            return Err(BrushError::SurfaceUnbound);
        }
        Ok(())
    }
}
