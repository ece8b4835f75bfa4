//! Shared configuration for stampbrush
//!
//! This crate is the single source of truth for brush parameters and the
//! per-brush stroke settings, together with their defaults. Every type
//! round-trips through serde so hosts can keep presets as JSON.

use serde::{Deserialize, Serialize};

/// Default stamp size in pixels
pub const DEFAULT_SIZE: f32 = 20.0;

/// Default opacity (0.0-1.0)
pub const DEFAULT_OPACITY: f32 = 1.0;

/// Default flow (0.0-1.0)
pub const DEFAULT_FLOW: f32 = 1.0;

/// Default stamp color
pub const DEFAULT_COLOR: &str = "#000000";

/// Default stamp angle as a fraction of a full turn
pub const DEFAULT_ANGLE: f32 = 0.0;

/// Default roundness (minor/major axis ratio)
pub const DEFAULT_ROUNDNESS: f32 = 1.0;

/// Default spacing as a ratio of size
pub const DEFAULT_SPACING: f32 = 0.5;

/// Default number of undo/redo snapshots kept (0 disables history)
pub const DEFAULT_MAX_UNDO_REDO_STACK_SIZE: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Brush parameters
///
/// Values are stored as given. Out-of-range opacity, flow, angle and
/// roundness are clamped per point when the engine resolves them, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Stamp size in pixels
    pub size: f32,
    /// 0.00-1.00
    pub opacity: f32,
    /// 0.00-1.00
    pub flow: f32,
    /// Color string (`#rrggbb`, `rgb(...)`, ...)
    pub color: String,
    /// 0.00-1.00, fraction of a full turn
    pub angle: f32,
    /// 0.00-1.00, minor/major axis ratio
    pub roundness: f32,
    /// Ratio of size; values >= 1 leave gaps between stamps
    pub spacing: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            opacity: DEFAULT_OPACITY,
            flow: DEFAULT_FLOW,
            color: DEFAULT_COLOR.to_string(),
            angle: DEFAULT_ANGLE,
            roundness: DEFAULT_ROUNDNESS,
            spacing: DEFAULT_SPACING,
        }
    }
}

impl BrushConfig {
    /// Parse a full config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Distance between two stamps in pixels, before the engine's floor
    pub fn space(&self) -> f32 {
        self.spacing * self.size
    }

    /// Overwrite only the fields the patch provides
    pub fn apply(&mut self, patch: &BrushConfigPatch) {
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(flow) = patch.flow {
            self.flow = flow;
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(angle) = patch.angle {
            self.angle = angle;
        }
        if let Some(roundness) = patch.roundness {
            self.roundness = roundness;
        }
        if let Some(spacing) = patch.spacing {
            self.spacing = spacing;
        }
    }

    /// Clamp the rendering fields into [0, 1]
    ///
    /// Size and spacing are left alone; callers own their sanity.
    pub fn clamp_unit_fields(&mut self) {
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.flow = self.flow.clamp(0.0, 1.0);
        self.angle = self.angle.clamp(0.0, 1.0);
        self.roundness = self.roundness.clamp(0.0, 1.0);
    }
}

/// Partial brush config, used to modify a few fields at once
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfigPatch {
    pub size: Option<f32>,
    pub opacity: Option<f32>,
    pub flow: Option<f32>,
    pub color: Option<String>,
    pub angle: Option<f32>,
    pub roundness: Option<f32>,
    pub spacing: Option<f32>,
}

impl BrushConfigPatch {
    /// Parse a patch from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-brush stroke generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeSettings {
    /// Follow a quadratic curve between samples instead of a straight line
    pub smoothing: bool,
    /// Interpolate stamps between samples; when off every sample is one stamp
    pub spacing: bool,
    /// Maximum number of undo/redo snapshots (0 disables history)
    pub max_undo_redo_stack_size: usize,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            smoothing: true,
            spacing: true,
            max_undo_redo_stack_size: DEFAULT_MAX_UNDO_REDO_STACK_SIZE,
        }
    }
}

impl StrokeSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether completed strokes are snapshotted for undo
    pub fn history_enabled(&self) -> bool {
        self.max_undo_redo_stack_size > 0
    }
}
