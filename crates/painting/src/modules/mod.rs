//! Brush modules - pluggable modifiers consulted while painting
//!
//! A module implements any subset of four hooks. The pipeline applies them
//! with fixed ordering rules:
//! - [`BrushModule::on_change_config`] - chained, every module in
//!   registration order, each seeing the previous mutations
//! - [`BrushModule::on_change_point`] - first match wins; the first module
//!   that handles the point replaces it and no other module is asked
//! - [`BrushModule::on_mixin_canvas`] - chained, each module receives the
//!   previous module's output surface
//! - [`BrushModule::on_end_stroke`] - broadcast once per committed stroke
//!
//! Built-in modules:
//! - [`DynamicShape`] - size, angle and roundness jitter
//! - [`DynamicTransparency`] - opacity and flow jitter
//! - [`Spread`] - scatters each point into several
//! - [`Pattern`] - fills the stroke with a repeating texture

mod dynamic_shape;
mod dynamic_transparency;
mod jitter;
mod pattern;
mod spread;

pub use dynamic_shape::{DynamicShape, DynamicShapeConfig};
pub use dynamic_transparency::{DynamicTransparency, DynamicTransparencyConfig};
pub use jitter::{JitterTrigger, random_normal, random_round};
pub use pattern::{Pattern, PatternConfig};
pub use spread::{Spread, SpreadConfig};

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use stampbrush_config::BrushConfig;
use tracing::{debug, info};

use crate::surface::CpuSurface;
use crate::types::RawPoint;

/// Opaque handle returned by module registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module-{}", self.0)
    }
}

/// Explicit identity used to collapse duplicate registrations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleKey(String);

impl ModuleKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key derived from a module kind and its serialized state, for modules
    /// that want two identically configured instances to register once
    pub fn from_state<T: Serialize>(kind: &str, state: &T) -> Result<Self, serde_json::Error> {
        Ok(Self(format!("{kind}:{}", serde_json::to_string(state)?)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A brush modifier. Every hook is optional.
pub trait BrushModule {
    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Registration key; `None` means every instance registers separately
    fn dedup_key(&self) -> Option<ModuleKey> {
        None
    }

    /// Mutate a per-point config clone before it is clamped and frozen
    fn on_change_config(&mut self, _config: &mut BrushConfig, _pressure: f32) {}

    /// Replace a generated point with zero, one or many points.
    /// Returning `None` means the module does not handle points.
    fn on_change_point(&mut self, _point: RawPoint, _config: &BrushConfig) -> Option<Vec<RawPoint>> {
        None
    }

    /// Transform the stroke surface before it is blended.
    /// Returning `None` passes the input through unchanged.
    fn on_mixin_canvas(&mut self, _surface: &CpuSurface) -> Option<CpuSurface> {
        None
    }

    /// Notified after a stroke is committed
    fn on_end_stroke(&mut self) {}
}

struct ModuleEntry {
    id: ModuleId,
    key: Option<ModuleKey>,
    module: Box<dyn BrushModule>,
}

/// Ordered collection of registered modules
#[derive(Default)]
pub struct ModulePipeline {
    entries: Vec<ModuleEntry>,
    next_id: u64,
}

impl fmt::Debug for ModulePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.id, e.module.name())))
            .finish()
    }
}

impl ModulePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, or return the id of an already registered module
    /// with the same key
    pub fn register(&mut self, module: Box<dyn BrushModule>) -> ModuleId {
        let key = module.dedup_key();
        if let Some(key) = &key {
            if let Some(existing) = self.entries.iter().find(|e| e.key.as_ref() == Some(key)) {
                debug!("module {} already registered as {}", key.as_str(), existing.id);
                return existing.id;
            }
        }

        let id = ModuleId(self.next_id);
        self.next_id += 1;
        info!("registered module {} as {}", module.name(), id);
        self.entries.push(ModuleEntry { id, key, module });
        id
    }

    /// Remove a module by id. Returns false if no such module exists.
    pub fn remove(&mut self, id: ModuleId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        info!("removed module {} ({})", entry.module.name(), id);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<ModuleId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Mutable access to a registered module, e.g. to retune it
    pub fn get_mut(&mut self, id: ModuleId) -> Option<&mut (dyn BrushModule + 'static)> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| e.module.as_mut())
    }

    /// Clone the base config, run every config hook in order, clamp the
    /// rendering fields
    pub fn resolve_config(&mut self, base: &BrushConfig, pressure: f32) -> BrushConfig {
        let mut config = base.clone();
        for entry in &mut self.entries {
            entry.module.on_change_config(&mut config, pressure);
        }
        config.clamp_unit_fields();
        config
    }

    /// Pass a point to the first module that handles points
    pub fn transform_point(&mut self, point: RawPoint, base: &BrushConfig) -> Vec<RawPoint> {
        for entry in &mut self.entries {
            if let Some(points) = entry.module.on_change_point(point, base) {
                return points;
            }
        }
        vec![point]
    }

    /// Chain every surface hook over the stroke surface
    pub fn mixin<'a>(&mut self, stroke: &'a CpuSurface) -> Cow<'a, CpuSurface> {
        let mut current: Option<CpuSurface> = None;
        for entry in &mut self.entries {
            let input = current.as_ref().unwrap_or(stroke);
            if let Some(next) = entry.module.on_mixin_canvas(input) {
                current = Some(next);
            }
        }
        match current {
            Some(surface) => Cow::Owned(surface),
            None => Cow::Borrowed(stroke),
        }
    }

    /// Broadcast the end of a stroke
    pub fn end_stroke(&mut self) {
        for entry in &mut self.entries {
            entry.module.on_end_stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct AddSize(f32);

    impl BrushModule for AddSize {
        fn on_change_config(&mut self, config: &mut BrushConfig, _pressure: f32) {
            config.size += self.0;
            config.opacity = config.size;
        }
    }

    struct Offset(f32);

    impl BrushModule for Offset {
        fn on_change_point(&mut self, point: RawPoint, _config: &BrushConfig) -> Option<Vec<RawPoint>> {
            Some(vec![RawPoint::new(point.x + self.0, point.y, point.pressure)])
        }
    }

    struct Keyed(&'static str);

    impl BrushModule for Keyed {
        fn dedup_key(&self) -> Option<ModuleKey> {
            Some(ModuleKey::new(self.0))
        }
    }

    struct FillAlpha(f32);

    impl BrushModule for FillAlpha {
        fn on_mixin_canvas(&mut self, surface: &CpuSurface) -> Option<CpuSurface> {
            let mut out = surface.clone();
            for px in out.pixels_mut() {
                px[3] += self.0;
            }
            Some(out)
        }
    }

    struct EndCounter(Rc<RefCell<u32>>);

    impl BrushModule for EndCounter {
        fn on_end_stroke(&mut self) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_config_hooks_chain_and_clamp() {
        let mut pipeline = ModulePipeline::new();
        pipeline.register(Box::new(AddSize(1.0)));
        pipeline.register(Box::new(AddSize(2.0)));

        let base = BrushConfig::default();
        let resolved = pipeline.resolve_config(&base, 0.5);

        // Second module saw the first one's mutation
        assert_eq!(resolved.size, base.size + 3.0);
        // Opacity was set far above 1 by the modules, then clamped
        assert_eq!(resolved.opacity, 1.0);
        // The base config is untouched
        assert_eq!(base.size, 20.0);
    }

    #[test]
    fn test_point_hook_first_match_wins() {
        let mut pipeline = ModulePipeline::new();
        let base = BrushConfig::default();
        let p = RawPoint::new(1.0, 2.0, 0.5);

        assert_eq!(pipeline.transform_point(p, &base), vec![p]);

        pipeline.register(Box::new(AddSize(1.0)));
        pipeline.register(Box::new(Offset(10.0)));
        pipeline.register(Box::new(Offset(100.0)));

        let out = pipeline.transform_point(p, &base);
        assert_eq!(out, vec![RawPoint::new(11.0, 2.0, 0.5)]);
    }

    #[test]
    fn test_mixin_chains_and_borrows_when_idle() {
        let mut pipeline = ModulePipeline::new();
        let stroke = CpuSurface::new(2, 2);

        assert!(matches!(pipeline.mixin(&stroke), Cow::Borrowed(_)));

        pipeline.register(Box::new(FillAlpha(0.25)));
        pipeline.register(Box::new(FillAlpha(0.5)));
        let mixed = pipeline.mixin(&stroke);
        assert_eq!(mixed.get_pixel(0, 0).unwrap()[3], 0.75);
        // Stroke itself is unchanged
        assert_eq!(stroke.get_pixel(0, 0).unwrap()[3], 0.0);
    }

    #[test]
    fn test_register_dedup_by_key_only() {
        let mut pipeline = ModulePipeline::new();

        let a = pipeline.register(Box::new(Keyed("pattern")));
        let b = pipeline.register(Box::new(Keyed("pattern")));
        let c = pipeline.register(Box::new(Keyed("other")));
        assert_eq!(a, b);
        assert_ne!(a, c);

        // Unkeyed modules with identical state stay independent
        let d = pipeline.register(Box::new(Offset(1.0)));
        let e = pipeline.register(Box::new(Offset(1.0)));
        assert_ne!(d, e);
        assert_eq!(pipeline.len(), 4);
    }

    #[test]
    fn test_remove() {
        let mut pipeline = ModulePipeline::new();
        let id = pipeline.register(Box::new(Offset(1.0)));

        assert!(pipeline.contains(id));
        assert!(pipeline.remove(id));
        assert!(!pipeline.remove(id));
        assert!(pipeline.is_empty());

        // Ids are never reused
        let next = pipeline.register(Box::new(Offset(1.0)));
        assert_ne!(next, id);
    }

    #[test]
    fn test_end_stroke_broadcast() {
        let counter = Rc::new(RefCell::new(0));
        let mut pipeline = ModulePipeline::new();
        pipeline.register(Box::new(EndCounter(counter.clone())));
        pipeline.register(Box::new(EndCounter(counter.clone())));

        pipeline.end_stroke();
        assert_eq!(*counter.borrow(), 2);
    }

    #[test]
    fn test_module_key_from_state() {
        let a = ModuleKey::from_state("spread", &SpreadConfig::default()).unwrap();
        let b = ModuleKey::from_state("spread", &SpreadConfig::default()).unwrap();
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("spread:"));
    }
}
