//! Size, angle and roundness jitter

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use stampbrush_config::BrushConfig;

use super::jitter::{JitterTrigger, random_round};
use super::BrushModule;

/// Jitter amounts are fractions of the current value; angle jitter is a
/// fraction of a full turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DynamicShapeConfig {
    pub size_jitter: f32,
    pub size_jitter_trigger: JitterTrigger,
    /// Smallest size as a fraction of the configured size
    pub min_diameter: f32,
    pub angle_jitter: f32,
    pub angle_jitter_trigger: JitterTrigger,
    pub round_jitter: f32,
    pub round_jitter_trigger: JitterTrigger,
    pub min_roundness: f32,
}

/// Varies size, angle and roundness per point
#[derive(Debug, Clone)]
pub struct DynamicShape {
    pub config: DynamicShapeConfig,
    rng: StdRng,
}

impl DynamicShape {
    pub fn new(config: DynamicShapeConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic instance for reproducible strokes
    pub fn with_seed(config: DynamicShapeConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn change_size(&mut self, size: f32, pressure: f32) -> f32 {
        let mut new_size = size;
        if self.config.size_jitter_trigger.is_pressure() {
            new_size = size * pressure * 2.0;
        }
        let jitter = new_size * self.config.size_jitter;
        new_size = random_round(&mut self.rng, new_size - jitter, new_size, 100.0).clamp(0.0, new_size.max(0.0));
        new_size.max(size * self.config.min_diameter)
    }

    fn change_angle(&mut self, angle: f32, pressure: f32) -> f32 {
        let mut new_angle = angle;
        if self.config.angle_jitter_trigger.is_pressure() {
            new_angle = (new_angle + (0.5 - pressure)).rem_euclid(1.0);
        }
        let jitter = self.config.angle_jitter;
        random_round(&mut self.rng, new_angle - jitter, new_angle + jitter, 100.0).rem_euclid(1.0)
    }

    fn change_roundness(&mut self, roundness: f32, pressure: f32) -> f32 {
        let mut new_roundness = roundness;
        if self.config.round_jitter_trigger.is_pressure() {
            new_roundness = roundness * pressure * 2.0;
        }
        let jitter = new_roundness * self.config.round_jitter;
        new_roundness = random_round(&mut self.rng, new_roundness - jitter, new_roundness, 100.0)
            .clamp(0.0, new_roundness.max(0.0));
        new_roundness.max(self.config.min_roundness)
    }
}

impl BrushModule for DynamicShape {
    fn name(&self) -> &str {
        "dynamic-shape"
    }

    fn on_change_config(&mut self, config: &mut BrushConfig, pressure: f32) {
        config.size = self.change_size(config.size, pressure);
        config.angle = self.change_angle(config.angle, pressure);
        config.roundness = self.change_roundness(config.roundness, pressure);
    }
}
