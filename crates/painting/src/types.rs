use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use stampbrush_config::BrushConfig;

/// Compositing operators, named after their canvas counterparts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum BlendMode {
    /// Source drawn over destination ("normal")
    #[default]
    SourceOver = 0,
    /// Source color where destination exists; destination alpha kept
    SourceAtop = 1,
    /// Destination kept only where source is opaque
    DestinationIn = 2,
    /// Destination removed where source is opaque (erase)
    DestinationOut = 3,
    /// Additive
    Lighter = 4,
    Multiply = 5,
    Screen = 6,
}

impl BlendMode {
    pub const ALL: [BlendMode; 7] = [
        BlendMode::SourceOver,
        BlendMode::SourceAtop,
        BlendMode::DestinationIn,
        BlendMode::DestinationOut,
        BlendMode::Lighter,
        BlendMode::Multiply,
        BlendMode::Screen,
    ];

    /// Canvas name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::SourceAtop => "source-atop",
            BlendMode::DestinationIn => "destination-in",
            BlendMode::DestinationOut => "destination-out",
            BlendMode::Lighter => "lighter",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown blend mode: {0}")]
pub struct UnknownBlendMode(pub String);

impl FromStr for BlendMode {
    type Err = UnknownBlendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "normal" {
            return Ok(BlendMode::SourceOver);
        }
        BlendMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .ok_or(UnknownBlendMode(s.to_string()))
    }
}

/// A pointer sample or an interpolated point before config resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
}

impl RawPoint {
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self { x, y, pressure }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn distance(&self, other: &RawPoint) -> f32 {
        self.position().distance(other.position())
    }
}

/// Called once the point it is attached to has been drawn
pub type StrokeCallback = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// A queued point with its frozen, clamped brush parameters
pub struct ResolvedPoint {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    /// Snapshot after module mutation and clamping
    pub config: BrushConfig,
    /// Last point of a stroke; drawing it commits the stroke
    pub stroke_end: bool,
    pub callback: Option<StrokeCallback>,
}

impl ResolvedPoint {
    pub fn new(point: RawPoint, config: BrushConfig) -> Self {
        Self {
            x: point.x,
            y: point.y,
            pressure: point.pressure,
            config,
            stroke_end: false,
            callback: None,
        }
    }

    pub fn raw(&self) -> RawPoint {
        RawPoint::new(self.x, self.y, self.pressure)
    }
}

impl fmt::Debug for ResolvedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPoint")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("pressure", &self.pressure)
            .field("config", &self.config)
            .field("stroke_end", &self.stroke_end)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
