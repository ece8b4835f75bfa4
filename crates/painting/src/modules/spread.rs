//! Scatter: fans one point out into several copies around it

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use stampbrush_config::BrushConfig;

use super::jitter::{JitterTrigger, random_normal, random_round};
use super::{BrushModule, ModuleKey};
use crate::types::RawPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpreadConfig {
    /// Scatter radius as a fraction of brush size
    pub spread_range: f32,
    pub spread_trigger: JitterTrigger,
    pub count: u32,
    pub count_jitter: f32,
    pub count_jitter_trigger: JitterTrigger,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            spread_range: 0.0,
            spread_trigger: JitterTrigger::None,
            count: 1,
            count_jitter: 0.0,
            count_jitter_trigger: JitterTrigger::None,
        }
    }
}

/// Replaces every point with a scattered cluster
#[derive(Debug, Clone)]
pub struct Spread {
    pub config: SpreadConfig,
    rng: StdRng,
    /// Collapse duplicate registrations of identically configured instances
    dedup: bool,
}

impl Spread {
    pub fn new(config: SpreadConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
            dedup: false,
        }
    }

    pub fn with_seed(config: SpreadConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            dedup: false,
        }
    }

    /// Register at most once per distinct config
    pub fn deduplicated(mut self) -> Self {
        self.dedup = true;
        self
    }

    fn point_count(&mut self, pressure: f32) -> u32 {
        let mut count = self.config.count as f32;
        if self.config.count_jitter_trigger.is_pressure() {
            count -= (count * (1.0 - pressure * 2.0)).round();
        }
        let jitter = (count * self.config.count_jitter).round();
        let jittered = random_round(&mut self.rng, count - jitter, count, 1.0);
        jittered.min(count).max(1.0) as u32
    }

    fn spread(&mut self, size: f32, point: RawPoint) -> Vec<RawPoint> {
        let count = self.point_count(point.pressure);
        let size = if self.config.spread_trigger.is_pressure() {
            size * point.pressure * 2.0
        } else {
            size
        };
        let std_dev = size * self.config.spread_range / 2.0;

        (0..count)
            .map(|_| {
                let x = random_normal(&mut self.rng, point.x, std_dev);
                let y = random_normal(&mut self.rng, point.y, std_dev);
                RawPoint::new(x, y, point.pressure)
            })
            .collect()
    }
}

impl BrushModule for Spread {
    fn name(&self) -> &str {
        "spread"
    }

    fn dedup_key(&self) -> Option<ModuleKey> {
        if !self.dedup {
            return None;
        }
        ModuleKey::from_state("spread", &self.config).ok()
    }

    fn on_change_point(&mut self, point: RawPoint, config: &BrushConfig) -> Option<Vec<RawPoint>> {
        Some(self.spread(config.size, point))
    }
}
