//! Opacity and flow jitter

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use stampbrush_config::BrushConfig;

use super::jitter::{JitterTrigger, random_round};
use super::BrushModule;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DynamicTransparencyConfig {
    pub opacity_jitter: f32,
    pub opacity_jitter_trigger: JitterTrigger,
    /// Floor as a fraction of the configured opacity
    pub min_opacity_jitter: f32,
    pub flow_jitter: f32,
    pub flow_jitter_trigger: JitterTrigger,
    /// Floor as a fraction of the configured flow
    pub min_flow_jitter: f32,
}

/// Varies opacity and flow per point
#[derive(Debug, Clone)]
pub struct DynamicTransparency {
    pub config: DynamicTransparencyConfig,
    rng: StdRng,
}

impl DynamicTransparency {
    pub fn new(config: DynamicTransparencyConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(config: DynamicTransparencyConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn jitter(&mut self, value: f32, pressure: f32, amount: f32, trigger: JitterTrigger, floor: f32) -> f32 {
        let mut new_value = value;
        if trigger.is_pressure() {
            new_value = value * pressure * 2.0;
        }
        let jitter = new_value * amount;
        new_value = random_round(&mut self.rng, new_value - jitter, new_value, 100.0).clamp(0.0, 1.0);
        new_value.max(floor * value)
    }
}

impl BrushModule for DynamicTransparency {
    fn name(&self) -> &str {
        "dynamic-transparency"
    }

    fn on_change_config(&mut self, config: &mut BrushConfig, pressure: f32) {
        let c = self.config.clone();
        config.opacity = self.jitter(
            config.opacity,
            pressure,
            c.opacity_jitter,
            c.opacity_jitter_trigger,
            c.min_opacity_jitter,
        );
        config.flow = self.jitter(config.flow, pressure, c.flow_jitter, c.flow_jitter_trigger, c.min_flow_jitter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_trigger() {
        let mut module = DynamicTransparency::with_seed(
            DynamicTransparencyConfig {
                opacity_jitter_trigger: JitterTrigger::Pressure,
                ..Default::default()
            },
            5,
        );
        let mut config = BrushConfig::default();
        module.on_change_config(&mut config, 0.25);
        assert!((config.opacity - 0.5).abs() < 1e-3);
        assert!((config.flow - 1.0).abs() < 1e-3);

        // Heavy pressure doubles, then clamps to 1
        let mut config = BrushConfig::default();
        module.on_change_config(&mut config, 1.0);
        assert!(config.opacity <= 1.0);
    }

    #[test]
    fn test_default_config_is_identity() {
        let mut module = DynamicTransparency::with_seed(DynamicTransparencyConfig::default(), 2);
        for _ in 0..50 {
            let mut config = BrushConfig {
                opacity: 0.333,
                flow: 0.8765,
                ..Default::default()
            };
            module.on_change_config(&mut config, 0.9);
            assert_eq!(config.opacity, 0.333);
            assert_eq!(config.flow, 0.8765);
        }
    }

    #[test]
    fn test_jitter_respects_floor() {
        let mut module = DynamicTransparency::with_seed(
            DynamicTransparencyConfig {
                opacity_jitter: 1.0,
                min_opacity_jitter: 0.5,
                flow_jitter: 1.0,
                ..Default::default()
            },
            11,
        );
        for _ in 0..200 {
            let mut config = BrushConfig::default();
            module.on_change_config(&mut config, 0.5);
            assert!((0.5 - 1e-6..=1.0).contains(&config.opacity));
            assert!((0.0..=1.0).contains(&config.flow));
        }
    }
}
