//! Mouse pressure simulation
//!
//! Pointer devices without pressure still get some line variation: moving
//! slowly raises pressure, moving fast lowers it, and anything in between
//! relaxes back toward the neutral value.

use glam::Vec2;

use crate::constants::NEUTRAL_PRESSURE;

const MAX_PRESSURE: f32 = 0.8;
const MIN_PRESSURE: f32 = 0.2;
const STEP: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct MousePressure {
    /// How quickly the step grows with distance
    k: f32,
    /// Below this distance pressure rises
    min_range: f32,
    /// Above this distance pressure falls
    max_range: f32,
    open: bool,
    previous: Option<(Vec2, f32)>,
}

impl Default for MousePressure {
    fn default() -> Self {
        Self::new(3.0, 10.0, 100.0)
    }
}

impl MousePressure {
    pub fn new(k: f32, min_range: f32, max_range: f32) -> Self {
        Self {
            k,
            min_range,
            max_range,
            open: true,
            previous: None,
        }
    }

    /// Pressure for the next sample, in [0.2, 0.8]
    pub fn get_pressure(&mut self, x: f32, y: f32) -> f32 {
        if !self.open {
            return NEUTRAL_PRESSURE;
        }
        let position = Vec2::new(x, y);
        let Some((prev_position, prev_pressure)) = self.previous else {
            self.previous = Some((position, NEUTRAL_PRESSURE));
            return NEUTRAL_PRESSURE;
        };

        let distance = position.distance(prev_position);
        let t = 1.0 + (10.0 - 1.0) * (1.0 - (-self.k * distance).exp());
        let delta = STEP * t;

        let mut pressure = prev_pressure;
        if distance < self.min_range {
            pressure += delta;
        } else if distance > self.max_range {
            pressure -= delta;
        } else if pressure < NEUTRAL_PRESSURE {
            pressure += delta;
        } else if pressure > NEUTRAL_PRESSURE {
            pressure -= delta;
        }
        let pressure = pressure.clamp(MIN_PRESSURE, MAX_PRESSURE);

        self.previous = Some((position, pressure));
        pressure
    }

    /// Forget the previous sample; call at the end of every stroke
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Enable simulation
    pub fn open(&mut self) {
        self.open = true;
        self.reset();
    }

    /// Disable simulation; every sample reports the neutral pressure
    pub fn close(&mut self) {
        self.open = false;
        self.reset();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_neutral() {
        let mut pressure = MousePressure::default();
        assert_eq!(pressure.get_pressure(10.0, 10.0), NEUTRAL_PRESSURE);
    }

    #[test]
    fn test_slow_movement_raises_pressure() {
        let mut pressure = MousePressure::default();
        pressure.get_pressure(0.0, 0.0);
        let mut last = NEUTRAL_PRESSURE;
        for i in 1..5 {
            let p = pressure.get_pressure(i as f32, 0.0);
            assert!(p > last);
            last = p;
        }
    }

    #[test]
    fn test_fast_movement_lowers_and_bounds() {
        let mut pressure = MousePressure::default();
        pressure.get_pressure(0.0, 0.0);
        let mut p = NEUTRAL_PRESSURE;
        for i in 1..200 {
            p = pressure.get_pressure(i as f32 * 500.0, 0.0);
            assert!((MIN_PRESSURE..=MAX_PRESSURE).contains(&p));
        }
        assert_eq!(p, MIN_PRESSURE);
    }

    #[test]
    fn test_close_and_reset() {
        let mut pressure = MousePressure::default();
        pressure.close();
        assert!(!pressure.is_open());
        pressure.get_pressure(0.0, 0.0);
        assert_eq!(pressure.get_pressure(1000.0, 0.0), NEUTRAL_PRESSURE);

        pressure.open();
        pressure.get_pressure(0.0, 0.0);
        pressure.get_pressure(1.0, 0.0);
        pressure.reset();
        assert_eq!(pressure.get_pressure(2.0, 0.0), NEUTRAL_PRESSURE);
    }
}
