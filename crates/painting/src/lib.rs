//! Stampbrush - a stamp-based digital painting brush engine
//!
//! This crate turns pointer samples into brush stamps on CPU raster surfaces:
//! - [`pipeline`] - The [`Brush`]: stroke queue, renderer, compositor,
//!   commit, undo/redo and the cooperative render scheduler
//! - [`points`] - Spacing, lag correction and smoothing of samples
//! - [`curve`] - Quadratic Bezier helpers used for smoothing
//! - [`modules`] - Pluggable brush modules and the built-in ones
//! - [`surface`] - CPU RGBA surface, blend modes and filters
//! - [`mask`] - Shape-mask loading from images, bytes or references
//! - [`color`] - Color string parsing
//! - [`pressure`] - Pressure simulation for mouse input
//!
//! Brush parameters live in the `stampbrush-config` crate and are
//! re-exported here.

pub mod color;
pub mod constants;
pub mod curve;
pub mod error;
pub mod mask;
pub mod modules;
pub mod pipeline;
pub mod points;
pub mod pressure;
pub mod surface;
pub mod types;

pub use color::*;
pub use constants::*;
pub use error::*;
pub use mask::*;
pub use modules::*;
pub use pipeline::*;
pub use points::*;
pub use pressure::*;
pub use surface::*;
pub use types::*;

pub use stampbrush_config::{BrushConfig, BrushConfigPatch, ConfigError, StrokeSettings};
