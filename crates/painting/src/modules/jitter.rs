//! Randomness shared by the jitter modules

use rand::Rng;
use serde::{Deserialize, Serialize};

/// What drives a jittered parameter besides randomness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterTrigger {
    #[default]
    None,
    /// Scale the parameter with pen pressure (pressure 0.5 is neutral)
    Pressure,
}

impl JitterTrigger {
    #[inline]
    pub fn is_pressure(&self) -> bool {
        matches!(self, JitterTrigger::Pressure)
    }
}

/// Random value in `[min, max]` quantized to `1 / accuracy`
///
/// An empty range returns `max` unquantized, so a zero jitter leaves the value alone.
pub fn random_round<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32, accuracy: f32) -> f32 {
    if max <= min {
        return max;
    }
    let lo = min * accuracy;
    let hi = max * accuracy;
    let r: f32 = rng.r#gen();
    ((r * (hi - lo + 1.0) + lo).floor() / accuracy).min(max)
}

/// Normally distributed value (Box-Muller)
pub fn random_normal<R: Rng + ?Sized>(rng: &mut R, mean: f32, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return mean;
    }
    // 1 - [0, 1) keeps u1 away from zero
    let u1: f32 = 1.0 - rng.r#gen::<f32>();
    let u2: f32 = rng.r#gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos();
    mean + z * std_dev
}
